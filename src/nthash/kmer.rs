//! Canonical ntHash over a resident nucleotide sequence.

use super::config::NtHashConfig;
use super::error::NtHashResult;
use super::tables::{
    base_forward_hash, base_reverse_hash, canonical, extend_hashes,
    is_valid_base, last_invalid_base, next_forward_hash, next_reverse_hash,
    prev_forward_hash, prev_reverse_hash, substitute,
};
use super::traits::{HashIter, RollingHash};

/// Rolling canonical hash over the k-mers of `seq`.
///
/// Windows containing a non-ACGT symbol are never produced: the roller jumps
/// over them. Each valid window yields `num_hashes` values, the first being
/// `min(forward, reverse)`.
#[derive(Debug, Clone)]
pub struct NtHash<'a> {
    seq: &'a [u8],
    k: usize,
    pos: usize,
    initialized: bool,
    fwd_hash: u64,
    rev_hash: u64,
    hashes: Vec<u64>,
}

impl<'a> NtHash<'a> {
    pub fn new(
        seq: &'a [u8],
        k: usize,
        num_hashes: usize,
        pos: usize,
    ) -> NtHashResult<Self> {
        let mut config = NtHashConfig::new(k, num_hashes);
        config.start_pos = pos;
        Self::with_config(seq, &config)
    }

    pub fn with_config(
        seq: &'a [u8],
        config: &NtHashConfig,
    ) -> NtHashResult<Self> {
        config.validate(seq.len())?;
        config.check_symbols(seq, is_valid_base)?;
        Ok(Self {
            seq,
            k: config.k,
            pos: config.start_pos,
            initialized: false,
            fwd_hash: 0,
            rev_hash: 0,
            hashes: vec![0; config.num_hashes],
        })
    }

    pub fn roll(&mut self) -> bool {
        if !self.initialized {
            return self.init_forward();
        }
        if self.pos + self.k >= self.seq.len() {
            return false;
        }
        let char_in = self.seq[self.pos + self.k];
        if !is_valid_base(char_in) {
            self.pos += self.k + 1;
            return self.init_forward();
        }
        let char_out = self.seq[self.pos];
        self.fwd_hash = next_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        self.rev_hash = next_reverse_hash(self.rev_hash, self.k, char_out, char_in);
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
        let char_in = self.seq[self.pos - 1];
        if !is_valid_base(char_in) {
            return self.init_backward();
        }
        let char_out = self.seq[self.pos + self.k - 1];
        self.fwd_hash = prev_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        self.rev_hash = prev_reverse_hash(self.rev_hash, self.k, char_out, char_in);
        self.pos -= 1;
        self.update_hashes();
        true
    }

    /// Hashes the next window would have, written to `out`.
    pub fn peek(&self, out: &mut [u64]) -> bool {
        match self.seq.get(self.pos + self.k) {
            Some(&char_in) => self.peek_with(char_in, out),
            None => false,
        }
    }

    pub fn peek_back(&self, out: &mut [u64]) -> bool {
        match self.pos.checked_sub(1) {
            Some(prev) => self.peek_back_with(self.seq[prev], out),
            None => false,
        }
    }

    /// Hashes of the current window shifted forward with `char_in` appended.
    pub fn peek_with(&self, char_in: u8, out: &mut [u64]) -> bool {
        if !self.initialized || !is_valid_base(char_in) {
            return false;
        }
        let char_out = self.seq[self.pos];
        let fwd = next_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        let rev = next_reverse_hash(self.rev_hash, self.k, char_out, char_in);
        extend_hashes(canonical(fwd, rev), self.k, out);
        true
    }

    pub fn peek_back_with(&self, char_in: u8, out: &mut [u64]) -> bool {
        if !self.initialized || !is_valid_base(char_in) {
            return false;
        }
        let char_out = self.seq[self.pos + self.k - 1];
        let fwd = prev_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        let rev = prev_reverse_hash(self.rev_hash, self.k, char_out, char_in);
        extend_hashes(canonical(fwd, rev), self.k, out);
        true
    }

    /// Hashes of the current window with `(offset, base)` substitutions
    /// applied. Returns `false` for an offset outside the window.
    pub fn sub(&self, substitutions: &[(usize, u8)], out: &mut [u64]) -> bool {
        if !self.initialized {
            return false;
        }
        let (mut fwd, mut rev) = (self.fwd_hash, self.rev_hash);
        for &(offset, base) in substitutions {
            if offset >= self.k {
                return false;
            }
            let old = self.seq[self.pos + offset];
            (fwd, rev) = substitute(fwd, rev, self.k, offset, old, base);
        }
        extend_hashes(canonical(fwd, rev), self.k, out);
        true
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    pub fn forward_hash(&self) -> u64 {
        self.fwd_hash
    }

    pub fn reverse_hash(&self) -> u64 {
        self.rev_hash
    }

    pub fn canonical_hash(&self) -> u64 {
        canonical(self.fwd_hash, self.rev_hash)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_hashes(&self) -> usize {
        self.hashes.len()
    }

    /// The k-mer under the current window.
    pub fn kmer(&self) -> &'a [u8] {
        let end = (self.pos + self.k).min(self.seq.len());
        &self.seq[self.pos.min(end)..end]
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

    /// Find the closest valid window starting before `pos`. Leaves the state
    /// untouched when there is none.
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
        self.fwd_hash = base_forward_hash(window);
        self.rev_hash = base_reverse_hash(window);
        self.initialized = true;
        self.update_hashes();
    }

    #[inline]
    fn update_hashes(&mut self) {
        extend_hashes(
            canonical(self.fwd_hash, self.rev_hash),
            self.k,
            &mut self.hashes,
        );
    }
}

impl RollingHash for NtHash<'_> {
    fn roll(&mut self) -> bool {
        NtHash::roll(self)
    }

    fn roll_back(&mut self) -> bool {
        NtHash::roll_back(self)
    }

    fn hashes(&self) -> &[u64] {
        NtHash::hashes(self)
    }

    fn pos(&self) -> usize {
        NtHash::pos(self)
    }

    fn k(&self) -> usize {
        NtHash::k(self)
    }

    fn num_hashes(&self) -> usize {
        NtHash::num_hashes(self)
    }
}

impl<'a> IntoIterator for NtHash<'a> {
    type Item = (usize, Vec<u64>);
    type IntoIter = HashIter<NtHash<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        HashIter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nthash::config::{NtHashConfigBuilder, SymbolPolicy};
    use crate::nthash::error::NtHashError;

    fn positions(seq: &[u8], k: usize) -> Vec<usize> {
        NtHash::new(seq, k, 1, 0)
            .unwrap()
            .into_iter()
            .map(|(pos, _)| pos)
            .collect()
    }

    #[test]
    fn test_all_windows_of_clean_sequence() {
        assert_eq!(positions(b"ACGTACGT", 4), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_skips_windows_with_invalid_symbols() {
        // N at 4 kills windows 1..=4 for k = 4
        assert_eq!(positions(b"ACGTNACGTA", 4), vec![0, 5, 6]);
        assert_eq!(positions(b"NNNNACGT", 4), vec![4]);
        assert!(positions(b"ACGNACGN", 4).is_empty());
    }

    #[test]
    fn test_lowercase_hashes_like_uppercase() {
        let upper: Vec<_> = NtHash::new(b"ACGTTGCA", 5, 3, 0).unwrap().into_iter().collect();
        let lower: Vec<_> = NtHash::new(b"acgttgca", 5, 3, 0).unwrap().into_iter().collect();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_start_position() {
        let mut h = NtHash::new(b"ACGTACGTAA", 4, 1, 3).unwrap();
        assert!(h.roll());
        assert_eq!(h.pos(), 3);
        assert_eq!(h.kmer(), b"TACG");
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            NtHash::new(b"ACGT", 0, 1, 0),
            Err(NtHashError::InvalidK { k: 0, .. })
        ));
        assert!(matches!(
            NtHash::new(b"ACGT", 5, 1, 0),
            Err(NtHashError::InvalidK { k: 5, seq_len: 4 })
        ));
        assert!(matches!(
            NtHash::new(b"ACGT", 2, 0, 0),
            Err(NtHashError::InvalidNumHashes)
        ));
        assert!(matches!(
            NtHash::new(b"ACGT", 2, 1, 3),
            Err(NtHashError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_strict_policy() {
        let config = NtHashConfigBuilder::default()
            .k(3)
            .policy(SymbolPolicy::Strict)
            .build()
            .unwrap();
        assert!(NtHash::with_config(b"ACGTAC", &config).is_ok());
        assert_eq!(
            NtHash::with_config(b"ACGRAC", &config).unwrap_err(),
            NtHashError::InvalidSymbol {
                position: 3,
                symbol: b'R'
            }
        );
    }

    #[test]
    fn test_roll_back_restores_state() {
        let seq = b"GATTACAGATTACACCGT";
        let mut h = NtHash::new(seq, 6, 3, 0).unwrap();
        assert!(h.roll());
        while h.pos() < 7 {
            let (fwd, rev) = (h.forward_hash(), h.reverse_hash());
            let hashes = h.hashes().to_vec();
            assert!(h.roll());
            assert!(h.roll_back());
            assert_eq!((h.forward_hash(), h.reverse_hash()), (fwd, rev));
            assert_eq!(h.hashes(), hashes.as_slice());
            assert!(h.roll());
        }
    }

    #[test]
    fn test_roll_back_over_invalid_symbol() {
        let seq = b"ACGTTNGCATG";
        let mut h = NtHash::new(seq, 3, 1, 6).unwrap();
        assert!(h.roll());
        assert_eq!(h.pos(), 6);
        assert!(h.roll_back());
        assert_eq!(h.pos(), 2);
        assert_eq!(h.kmer(), b"GTT");
        assert_eq!(h.forward_hash(), base_forward_hash(b"GTT"));
        assert!(h.roll_back());
        assert!(h.roll_back());
        assert_eq!(h.pos(), 0);
        assert!(!h.roll_back());
        assert_eq!(h.pos(), 0);
    }

    #[test]
    fn test_peek_does_not_move() {
        let seq = b"ACGTTGCAAC";
        let mut h = NtHash::new(seq, 4, 2, 0).unwrap();
        assert!(h.roll());
        let mut peeked = [0u64; 2];
        assert!(h.peek(&mut peeked));
        assert_eq!(h.pos(), 0);
        assert!(h.roll());
        assert_eq!(h.hashes(), &peeked);

        let mut back = [0u64; 2];
        assert!(h.peek_back(&mut back));
        assert!(h.roll_back());
        assert_eq!(h.hashes(), &back);
        assert!(!h.peek_with(b'N', &mut back));
    }

    #[test]
    fn test_sub_matches_substituted_sequence() {
        let mut h = NtHash::new(b"ACGTTGCA", 8, 3, 0).unwrap();
        assert!(h.roll());
        let mut out = [0u64; 3];
        assert!(h.sub(&[(0, b'T'), (5, b'A')], &mut out));

        let mut expected = NtHash::new(b"TCGTTACA", 8, 3, 0).unwrap();
        assert!(expected.roll());
        assert_eq!(&out, expected.hashes());
        assert!(!h.sub(&[(8, b'A')], &mut out));
    }
}
