//! Rollers that are fed symbols by the caller instead of owning a sequence.
//!
//! Only the current k-symbol window is kept. Non-ACGT symbols hash to the
//! zero wildcard rather than being skipped, so every roll produces a window.

use super::error::{NtHashError, NtHashResult};
use super::seed::{
    HashSeed, check_seeds, extend_seed_hashes, seed_base_hash, seed_next_hash,
    seed_prev_hash,
};
use super::tables::{
    base_forward_hash, base_reverse_hash, canonical, extend_hashes,
    next_forward_hash, next_reverse_hash, prev_forward_hash, prev_reverse_hash,
};
use super::traits::BlindRollingHash;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BlindNtHash {
    window: VecDeque<u8>,
    k: usize,
    pos: isize,
    fwd_hash: u64,
    rev_hash: u64,
    hashes: Vec<u64>,
}

impl BlindNtHash {
    /// Hash `kmer` as the window starting at `pos`.
    pub fn new(kmer: &[u8], num_hashes: usize, pos: isize) -> NtHashResult<Self> {
        if kmer.is_empty() {
            return Err(NtHashError::InvalidK { k: 0, seq_len: 0 });
        }
        if num_hashes == 0 {
            return Err(NtHashError::InvalidNumHashes);
        }
        Ok(Self::from_state(
            kmer,
            base_forward_hash(kmer),
            base_reverse_hash(kmer),
            num_hashes,
            pos,
        ))
    }

    /// Resume from previously computed hash values. `forward` and `reverse`
    /// are trusted to belong to `window`.
    pub fn from_state(
        window: &[u8],
        forward: u64,
        reverse: u64,
        num_hashes: usize,
        pos: isize,
    ) -> Self {
        let mut hasher = Self {
            window: window.iter().copied().collect(),
            k: window.len(),
            pos,
            fwd_hash: forward,
            rev_hash: reverse,
            hashes: vec![0; num_hashes],
        };
        hasher.update_hashes();
        hasher
    }

    /// Append `char_in`, dropping the first symbol of the window.
    pub fn roll(&mut self, char_in: u8) {
        let Some(char_out) = self.window.pop_front() else {
            return;
        };
        self.fwd_hash = next_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        self.rev_hash = next_reverse_hash(self.rev_hash, self.k, char_out, char_in);
        self.window.push_back(char_in);
        self.pos += 1;
        self.update_hashes();
    }

    /// Prepend `char_in`, dropping the last symbol of the window.
    pub fn roll_back(&mut self, char_in: u8) {
        let Some(char_out) = self.window.pop_back() else {
            return;
        };
        self.fwd_hash = prev_forward_hash(self.fwd_hash, self.k, char_out, char_in);
        self.rev_hash = prev_reverse_hash(self.rev_hash, self.k, char_out, char_in);
        self.window.push_front(char_in);
        self.pos -= 1;
        self.update_hashes();
    }

    pub fn peek(&self, char_in: u8, out: &mut [u64]) {
        if let Some(&char_out) = self.window.front() {
            let fwd = next_forward_hash(self.fwd_hash, self.k, char_out, char_in);
            let rev = next_reverse_hash(self.rev_hash, self.k, char_out, char_in);
            extend_hashes(canonical(fwd, rev), self.k, out);
        }
    }

    pub fn peek_back(&self, char_in: u8, out: &mut [u64]) {
        if let Some(&char_out) = self.window.back() {
            let fwd = prev_forward_hash(self.fwd_hash, self.k, char_out, char_in);
            let rev = prev_reverse_hash(self.rev_hash, self.k, char_out, char_in);
            extend_hashes(canonical(fwd, rev), self.k, out);
        }
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

    pub fn window(&self) -> &VecDeque<u8> {
        &self.window
    }

    pub fn pos(&self) -> isize {
        self.pos
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_hashes(&self) -> usize {
        self.hashes.len()
    }

    fn update_hashes(&mut self) {
        extend_hashes(
            canonical(self.fwd_hash, self.rev_hash),
            self.k,
            &mut self.hashes,
        );
    }
}

impl BlindRollingHash for BlindNtHash {
    fn roll(&mut self, char_in: u8) {
        BlindNtHash::roll(self, char_in)
    }

    fn roll_back(&mut self, char_in: u8) {
        BlindNtHash::roll_back(self, char_in)
    }

    fn hashes(&self) -> &[u64] {
        BlindNtHash::hashes(self)
    }

    fn pos(&self) -> isize {
        BlindNtHash::pos(self)
    }

    fn k(&self) -> usize {
        BlindNtHash::k(self)
    }
}

/// Spaced-seed counterpart of [`BlindNtHash`].
#[derive(Debug, Clone)]
pub struct BlindSeedNtHash {
    window: VecDeque<u8>,
    seeds: Arc<[HashSeed]>,
    k: usize,
    pos: isize,
    fwd_hashes: Vec<u64>,
    rev_hashes: Vec<u64>,
    hashes: Vec<u64>,
}

impl BlindSeedNtHash {
    pub fn new<S: AsRef<str>>(
        kmer: &[u8],
        seeds: &[S],
        num_hashes_per_seed: usize,
        pos: isize,
    ) -> NtHashResult<Self> {
        let parsed: Arc<[HashSeed]> = HashSeed::parse_all(seeds, kmer.len())?.into();
        Self::with_seeds(kmer, parsed, num_hashes_per_seed, pos)
    }

    pub fn with_seeds(
        kmer: &[u8],
        seeds: Arc<[HashSeed]>,
        num_hashes_per_seed: usize,
        pos: isize,
    ) -> NtHashResult<Self> {
        if kmer.is_empty() {
            return Err(NtHashError::InvalidK { k: 0, seq_len: 0 });
        }
        if num_hashes_per_seed == 0 {
            return Err(NtHashError::InvalidNumHashes);
        }
        check_seeds(&seeds, kmer.len())?;
        let (fwd_hashes, rev_hashes) =
            seeds.iter().map(|seed| seed_base_hash(kmer, seed)).unzip();
        let mut hasher = Self {
            window: kmer.iter().copied().collect(),
            k: kmer.len(),
            pos,
            fwd_hashes,
            rev_hashes,
            hashes: vec![0; seeds.len() * num_hashes_per_seed],
            seeds,
        };
        hasher.update_hashes();
        Ok(hasher)
    }

    pub fn roll(&mut self, char_in: u8) {
        if self.window.is_empty() {
            return;
        }
        let window = &self.window;
        let k = self.k;
        for (i, seed) in self.seeds.iter().enumerate() {
            (self.fwd_hashes[i], self.rev_hashes[i]) = seed_next_hash(
                self.fwd_hashes[i],
                self.rev_hashes[i],
                k,
                seed,
                |j| if j < k { window[j] } else { char_in },
            );
        }
        self.window.pop_front();
        self.window.push_back(char_in);
        self.pos += 1;
        self.update_hashes();
    }

    pub fn roll_back(&mut self, char_in: u8) {
        if self.window.is_empty() {
            return;
        }
        let window = &self.window;
        for (i, seed) in self.seeds.iter().enumerate() {
            (self.fwd_hashes[i], self.rev_hashes[i]) = seed_prev_hash(
                self.fwd_hashes[i],
                self.rev_hashes[i],
                self.k,
                seed,
                |j| if j == 0 { char_in } else { window[j - 1] },
            );
        }
        self.window.pop_back();
        self.window.push_front(char_in);
        self.pos -= 1;
        self.update_hashes();
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    pub fn forward_hashes(&self) -> &[u64] {
        &self.fwd_hashes
    }

    pub fn reverse_hashes(&self) -> &[u64] {
        &self.rev_hashes
    }

    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    pub fn pos(&self) -> isize {
        self.pos
    }

    pub fn k(&self) -> usize {
        self.k
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

impl BlindRollingHash for BlindSeedNtHash {
    fn roll(&mut self, char_in: u8) {
        BlindSeedNtHash::roll(self, char_in)
    }

    fn roll_back(&mut self, char_in: u8) {
        BlindSeedNtHash::roll_back(self, char_in)
    }

    fn hashes(&self) -> &[u64] {
        BlindSeedNtHash::hashes(self)
    }

    fn pos(&self) -> isize {
        BlindSeedNtHash::pos(self)
    }

    fn k(&self) -> usize {
        BlindSeedNtHash::k(self)
    }
}
