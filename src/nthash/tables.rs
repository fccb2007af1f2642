//! Per-symbol seed constants and the split-rotation primitives shared by
//! every ntHash roller.
//!
//! A 64-bit hash word is treated as two independent rings: the low 33 bits
//! and the high 31 bits. `srol`/`sror` rotate both rings by one position,
//! which keeps the period of repeated rotations at `33 * 31` instead of 64.

pub const SEED_A: u64 = 0x3c8b_fbb3_95c6_0474;
pub const SEED_C: u64 = 0x3193_c185_62a0_2b4c;
pub const SEED_G: u64 = 0x2032_3ed0_8257_2324;
pub const SEED_T: u64 = 0x2955_49f5_4be2_4456;
/// Contribution of an unknown symbol (and of don't-care seed positions).
pub const SEED_N: u64 = 0;

pub const MULTISEED: u64 = 0x90b4_5d39_fb6d_a1fa;
pub const MULTISHIFT: u32 = 27;

const LOW_BITS: u32 = 33;
const HIGH_BITS: u32 = 31;
const LOW_MASK: u64 = (1 << LOW_BITS) - 1;
const HIGH_MASK: u64 = (1 << HIGH_BITS) - 1;

/// Forward-strand seed per byte; non-ACGT bytes map to [`SEED_N`].
pub static SEED_TAB: [u64; 256] = build_seed_tab();

/// Seed of the complementary base, used for the reverse strand.
pub static RC_SEED_TAB: [u64; 256] = build_rc_seed_tab();

/// Standard amino-acid residues hashed by `AaHash`.
pub const AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

pub static AA_SEED_TAB: [u64; 256] = build_aa_seed_tab();

const fn build_seed_tab() -> [u64; 256] {
    let mut tab = [SEED_N; 256];
    tab[b'A' as usize] = SEED_A;
    tab[b'C' as usize] = SEED_C;
    tab[b'G' as usize] = SEED_G;
    tab[b'T' as usize] = SEED_T;
    tab[b'a' as usize] = SEED_A;
    tab[b'c' as usize] = SEED_C;
    tab[b'g' as usize] = SEED_G;
    tab[b't' as usize] = SEED_T;
    tab
}

const fn build_rc_seed_tab() -> [u64; 256] {
    let mut tab = [SEED_N; 256];
    tab[b'A' as usize] = SEED_T;
    tab[b'C' as usize] = SEED_G;
    tab[b'G' as usize] = SEED_C;
    tab[b'T' as usize] = SEED_A;
    tab[b'a' as usize] = SEED_T;
    tab[b'c' as usize] = SEED_G;
    tab[b'g' as usize] = SEED_C;
    tab[b't' as usize] = SEED_A;
    tab
}

const fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

const fn build_aa_seed_tab() -> [u64; 256] {
    let mut tab = [SEED_N; 256];
    let mut i = 0;
    while i < AMINO_ACIDS.len() {
        let residue = AMINO_ACIDS[i];
        let seed = splitmix64(MULTISEED ^ residue as u64);
        tab[residue as usize] = seed;
        tab[residue.to_ascii_lowercase() as usize] = seed;
        i += 1;
    }
    tab
}

/// True for A, C, G and T in either case.
#[inline(always)]
pub fn is_valid_base(symbol: u8) -> bool {
    SEED_TAB[symbol as usize] != SEED_N
}

#[inline(always)]
pub fn is_valid_residue(symbol: u8) -> bool {
    AA_SEED_TAB[symbol as usize] != SEED_N
}

/// Complement of a nucleotide, preserving case. Unknown symbols become `N`.
#[inline]
pub fn complement(symbol: u8) -> u8 {
    match symbol {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        _ => b'N',
    }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Split-rotate left by one.
#[inline(always)]
pub fn srol(x: u64) -> u64 {
    let m = ((x & 0x8000_0000_0000_0000) >> 30) | ((x & 0x1_0000_0000) >> 32);
    ((x << 1) & 0xFFFF_FFFD_FFFF_FFFF) | m
}

/// Split-rotate right by one.
#[inline(always)]
pub fn sror(x: u64) -> u64 {
    let m = ((x & 0x2_0000_0000) << 30) | ((x & 1) << 32);
    ((x >> 1) & 0xFFFF_FFFE_FFFF_FFFF) | m
}

/// Split-rotate left by `d`, for any `d`.
#[inline]
pub fn srol_n(x: u64, d: u32) -> u64 {
    let dl = d % LOW_BITS;
    let dh = d % HIGH_BITS;
    let low = x & LOW_MASK;
    let high = x >> LOW_BITS;
    let low = ((low << dl) | (low >> (LOW_BITS - dl))) & LOW_MASK;
    let high = ((high << dh) | (high >> (HIGH_BITS - dh))) & HIGH_MASK;
    (high << LOW_BITS) | low
}

#[inline(always)]
pub fn canonical(fwd: u64, rev: u64) -> u64 {
    fwd.min(rev)
}

/// Fill `out` with `out.len()` values derived from one base hash.
///
/// `out[0]` is the base value itself; the rest are multiplied by a per-index
/// constant and mixed, so no extra pass over the sequence is needed.
#[inline]
pub fn extend_hashes(base: u64, k: usize, out: &mut [u64]) {
    if let Some((first, rest)) = out.split_first_mut() {
        *first = base;
        let k_seed = (k as u64).wrapping_mul(MULTISEED);
        for (i, h) in rest.iter_mut().enumerate() {
            let mut t = base.wrapping_mul((i as u64 + 1) ^ k_seed);
            t ^= t >> MULTISHIFT;
            *h = t;
        }
    }
}

pub fn base_forward_hash(window: &[u8]) -> u64 {
    window
        .iter()
        .fold(0, |h, &b| srol(h) ^ SEED_TAB[b as usize])
}

pub fn base_reverse_hash(window: &[u8]) -> u64 {
    window
        .iter()
        .rev()
        .fold(0, |h, &b| srol(h) ^ RC_SEED_TAB[b as usize])
}

#[inline]
pub fn next_forward_hash(fh: u64, k: usize, char_out: u8, char_in: u8) -> u64 {
    srol(fh)
        ^ SEED_TAB[char_in as usize]
        ^ srol_n(SEED_TAB[char_out as usize], k as u32)
}

#[inline]
pub fn prev_forward_hash(fh: u64, k: usize, char_out: u8, char_in: u8) -> u64 {
    sror(
        fh ^ srol_n(SEED_TAB[char_in as usize], k as u32)
            ^ SEED_TAB[char_out as usize],
    )
}

#[inline]
pub fn next_reverse_hash(rh: u64, k: usize, char_out: u8, char_in: u8) -> u64 {
    sror(
        rh ^ srol_n(RC_SEED_TAB[char_in as usize], k as u32)
            ^ RC_SEED_TAB[char_out as usize],
    )
}

#[inline]
pub fn prev_reverse_hash(rh: u64, k: usize, char_out: u8, char_in: u8) -> u64 {
    srol(rh)
        ^ RC_SEED_TAB[char_in as usize]
        ^ srol_n(RC_SEED_TAB[char_out as usize], k as u32)
}

/// Replace the symbol at `pos` of a k-mer inside an existing hash pair.
#[inline]
pub fn substitute(
    fh: u64,
    rh: u64,
    k: usize,
    pos: usize,
    old: u8,
    new: u8,
) -> (u64, u64) {
    let fd = (k - 1 - pos) as u32;
    let rd = pos as u32;
    let fh = fh
        ^ srol_n(SEED_TAB[old as usize], fd)
        ^ srol_n(SEED_TAB[new as usize], fd);
    let rh = rh
        ^ srol_n(RC_SEED_TAB[old as usize], rd)
        ^ srol_n(RC_SEED_TAB[new as usize], rd);
    (fh, rh)
}

/// Offset of the last invalid base in `window`, if any.
#[inline]
pub fn last_invalid_base(window: &[u8]) -> Option<usize> {
    window.iter().rposition(|&b| !is_valid_base(b))
}
