//! Spaced-seed hashing: one canonical hash per seed pattern, computed only
//! over the seed's care positions.

use super::config::NtHashConfig;
use super::error::{NtHashError, NtHashResult};
use super::tables::{
    RC_SEED_TAB, SEED_TAB, canonical, extend_hashes, is_valid_base,
    last_invalid_base, srol, srol_n, sror,
};
use super::traits::{HashIter, RollingHash};
use std::sync::Arc;
use tracing::warn;

/// A parsed spaced-seed pattern.
///
/// `'1'` marks a care position; every other character is a don't-care whose
/// symbol never influences the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSeed {
    pattern: String,
    blocks: Vec<(usize, usize)>,
}

impl HashSeed {
    pub fn parse(pattern: &str) -> Self {
        let bytes = pattern.as_bytes();
        let mut blocks = Vec::new();
        let mut start = None;
        for (i, &c) in bytes.iter().enumerate() {
            match (c == b'1', start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    blocks.push((s, i));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            blocks.push((s, bytes.len()));
        }
        Self {
            pattern: pattern.to_string(),
            blocks,
        }
    }

    /// Parse a seed set for windows of size `k`.
    pub fn parse_all<S: AsRef<str>>(
        patterns: &[S],
        k: usize,
    ) -> NtHashResult<Vec<HashSeed>> {
        let seeds: Vec<HashSeed> =
            patterns.iter().map(|p| Self::parse(p.as_ref())).collect();
        check_seeds(&seeds, k)?;
        for seed in seeds.iter().filter(|s| !s.is_symmetric()) {
            warn!(
                seed = seed.pattern(),
                "spaced seed is not symmetric, reverse-complement hashing will be inconsistent"
            );
        }
        Ok(seeds)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Care positions as half-open `[start, end)` runs.
    pub fn blocks(&self) -> &[(usize, usize)] {
        &self.blocks
    }

    pub fn care_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().flat_map(|&(s, e)| s..e)
    }

    pub fn dont_care_positions(&self) -> Vec<usize> {
        self.pattern
            .bytes()
            .enumerate()
            .filter(|&(_, c)| c != b'1')
            .map(|(i, _)| i)
            .collect()
    }

    /// Symmetric seeds give the same canonical hash on both strands.
    pub fn is_symmetric(&self) -> bool {
        self.pattern.bytes().eq(self.pattern.bytes().rev())
    }
}

pub(crate) fn check_seeds(seeds: &[HashSeed], k: usize) -> NtHashResult<()> {
    if seeds.is_empty() {
        return Err(NtHashError::EmptySeedSet);
    }
    for seed in seeds {
        if seed.len() != k {
            return Err(NtHashError::SeedLengthMismatch {
                seed: seed.pattern.clone(),
                expected: k,
                found: seed.len(),
            });
        }
    }
    Ok(())
}

/// Forward and reverse hash of one seed over a full window.
pub(crate) fn seed_base_hash(window: &[u8], seed: &HashSeed) -> (u64, u64) {
    let k = window.len();
    seed.care_positions().fold((0, 0), |(fh, rh), i| {
        let b = window[i] as usize;
        (
            fh ^ srol_n(SEED_TAB[b], (k - 1 - i) as u32),
            rh ^ srol_n(RC_SEED_TAB[b], i as u32),
        )
    })
}

/// Shift one seed's hashes forward by one symbol.
///
/// `at(i)` returns the symbol at offset `i` of the outgoing window for
/// `i < k`, and the incoming symbol for `i == k`. Cost is proportional to
/// the number of care blocks, not to k.
#[inline]
pub(crate) fn seed_next_hash(
    fh: u64,
    rh: u64,
    k: usize,
    seed: &HashSeed,
    at: impl Fn(usize) -> u8,
) -> (u64, u64) {
    let mut fh = srol(fh);
    let mut rh = rh;
    for &(a, b) in &seed.blocks {
        let (ca, cb) = (at(a) as usize, at(b) as usize);
        fh ^= srol_n(SEED_TAB[ca], (k - a) as u32)
            ^ srol_n(SEED_TAB[cb], (k - b) as u32);
        rh ^= srol_n(RC_SEED_TAB[ca], a as u32)
            ^ srol_n(RC_SEED_TAB[cb], b as u32);
    }
    (fh, sror(rh))
}

/// Inverse of [`seed_next_hash`]. Here `at(0)` is the incoming symbol and
/// `at(1..=k)` the current window.
#[inline]
pub(crate) fn seed_prev_hash(
    fh: u64,
    rh: u64,
    k: usize,
    seed: &HashSeed,
    at: impl Fn(usize) -> u8,
) -> (u64, u64) {
    let mut fh = fh;
    let mut rh = srol(rh);
    for &(a, b) in &seed.blocks {
        let (ca, cb) = (at(a) as usize, at(b) as usize);
        fh ^= srol_n(SEED_TAB[ca], (k - a) as u32)
            ^ srol_n(SEED_TAB[cb], (k - b) as u32);
        rh ^= srol_n(RC_SEED_TAB[ca], a as u32)
            ^ srol_n(RC_SEED_TAB[cb], b as u32);
    }
    (sror(fh), rh)
}

/// Write `num_hashes_per_seed` values for every seed into `out`, seed-major.
pub(crate) fn extend_seed_hashes(
    fwd: &[u64],
    rev: &[u64],
    k: usize,
    out: &mut [u64],
) {
    let per_seed = out.len() / fwd.len();
    for (i, chunk) in out.chunks_exact_mut(per_seed).enumerate() {
        extend_hashes(canonical(fwd[i], rev[i]), k, chunk);
    }
}

/// Rolling spaced-seed hash over a resident nucleotide sequence.
#[derive(Debug, Clone)]
pub struct SeedNtHash<'a> {
    seq: &'a [u8],
    seeds: Arc<[HashSeed]>,
    k: usize,
    num_hashes_per_seed: usize,
    pos: usize,
    initialized: bool,
    fwd_hashes: Vec<u64>,
    rev_hashes: Vec<u64>,
    hashes: Vec<u64>,
}

impl<'a> SeedNtHash<'a> {
    pub fn new<S: AsRef<str>>(
        seq: &'a [u8],
        seeds: &[S],
        num_hashes_per_seed: usize,
        k: usize,
        pos: usize,
    ) -> NtHashResult<Self> {
        let parsed: Arc<[HashSeed]> = HashSeed::parse_all(seeds, k)?.into();
        let mut config = NtHashConfig::new(k, num_hashes_per_seed);
        config.start_pos = pos;
        Self::with_config(seq, parsed, &config)
    }

    /// Build from pre-parsed seeds; `config.num_hashes` is per seed.
    pub fn with_config(
        seq: &'a [u8],
        seeds: Arc<[HashSeed]>,
        config: &NtHashConfig,
    ) -> NtHashResult<Self> {
        check_seeds(&seeds, config.k)?;
        config.validate(seq.len())?;
        config.check_symbols(seq, is_valid_base)?;
        let num_seeds = seeds.len();
        Ok(Self {
            seq,
            seeds,
            k: config.k,
            num_hashes_per_seed: config.num_hashes,
            pos: config.start_pos,
            initialized: false,
            fwd_hashes: vec![0; num_seeds],
            rev_hashes: vec![0; num_seeds],
            hashes: vec![0; num_seeds * config.num_hashes],
        })
    }

    pub fn roll(&mut self) -> bool {
        if !self.initialized {
            return self.init_forward();
        }
        if self.pos + self.k >= self.seq.len() {
            return false;
        }
        if !is_valid_base(self.seq[self.pos + self.k]) {
            self.pos += self.k + 1;
            return self.init_forward();
        }
        let window = &self.seq[self.pos..=self.pos + self.k];
        for (i, seed) in self.seeds.iter().enumerate() {
            (self.fwd_hashes[i], self.rev_hashes[i]) = seed_next_hash(
                self.fwd_hashes[i],
                self.rev_hashes[i],
                self.k,
                seed,
                |j| window[j],
            );
        }
        self.pos += 1;
        self.update_hashes();
        true
    }

    pub fn roll_back(&mut self) -> bool {
        if !self.initialized {
            return self.init_forward();
        }
        if self.pos == 0 {
            return false;
        }
        if !is_valid_base(self.seq[self.pos - 1]) {
            return self.init_backward();
        }
        let window = &self.seq[self.pos - 1..self.pos + self.k];
        for (i, seed) in self.seeds.iter().enumerate() {
            (self.fwd_hashes[i], self.rev_hashes[i]) = seed_prev_hash(
                self.fwd_hashes[i],
                self.rev_hashes[i],
                self.k,
                seed,
                |j| window[j],
            );
        }
        self.pos -= 1;
        self.update_hashes();
        true
    }

    /// All hash values, `num_hashes_per_seed` per seed in seed order.
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// Hash values of seed `index` alone.
    pub fn seed_hashes(&self, index: usize) -> &[u64] {
        let start = index * self.num_hashes_per_seed;
        &self.hashes[start..start + self.num_hashes_per_seed]
    }

    pub fn forward_hashes(&self) -> &[u64] {
        &self.fwd_hashes
    }

    pub fn reverse_hashes(&self) -> &[u64] {
        &self.rev_hashes
    }

    pub fn seeds(&self) -> &[HashSeed] {
        &self.seeds
    }

    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    pub fn num_hashes_per_seed(&self) -> usize {
        self.num_hashes_per_seed
    }

    /// Total values per window (seeds * hashes per seed).
    pub fn num_hashes(&self) -> usize {
        self.hashes.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn iter(self) -> HashIter<Self> {
        HashIter::new(self)
    }

    fn init_forward(&mut self) -> bool {
        let last = self.seq.len() - self.k;
        while self.pos <= last {
            match last_invalid_base(&self.seq[self.pos..self.pos + self.k]) {
                Some(offset) => self.pos += offset + 1,
                None => {
                    self.load_window();
                    return true;
                }
            }
        }
        self.initialized = false;
        false
    }

    fn init_backward(&mut self) -> bool {
        let mut end = self.pos - 1;
        while end >= self.k {
            let start = end - self.k;
            match self.seq[start..end].iter().position(|&b| !is_valid_base(b)) {
                Some(offset) => end = start + offset,
                None => {
                    self.pos = start;
                    self.load_window();
                    return true;
                }
            }
        }
        false
    }

    fn load_window(&mut self) {
        let window = &self.seq[self.pos..self.pos + self.k];
        for (i, seed) in self.seeds.iter().enumerate() {
            (self.fwd_hashes[i], self.rev_hashes[i]) =
                seed_base_hash(window, seed);
        }
        self.initialized = true;
        self.update_hashes();
    }

    fn update_hashes(&mut self) {
        extend_seed_hashes(
            &self.fwd_hashes,
            &self.rev_hashes,
            self.k,
            &mut self.hashes,
        );
    }
}

impl RollingHash for SeedNtHash<'_> {
    fn roll(&mut self) -> bool {
        SeedNtHash::roll(self)
    }

    fn roll_back(&mut self) -> bool {
        SeedNtHash::roll_back(self)
    }

    fn hashes(&self) -> &[u64] {
        SeedNtHash::hashes(self)
    }

    fn pos(&self) -> usize {
        SeedNtHash::pos(self)
    }

    fn k(&self) -> usize {
        SeedNtHash::k(self)
    }

    fn num_hashes(&self) -> usize {
        SeedNtHash::num_hashes(self)
    }
}

impl<'a> IntoIterator for SeedNtHash<'a> {
    type Item = (usize, Vec<u64>);
    type IntoIter = HashIter<SeedNtHash<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        HashIter::new(self)
    }
}
