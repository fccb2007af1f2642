//! Rolling hash over protein sequences.
//!
//! Proteins have no reverse complement, so only the forward hash exists and
//! it is used directly as the base of the derived values.

use super::config::NtHashConfig;
use super::error::NtHashResult;
use super::tables::{AA_SEED_TAB, extend_hashes, is_valid_residue, srol, srol_n, sror};
use super::traits::{HashIter, RollingHash};

#[derive(Debug, Clone)]
pub struct AaHash<'a> {
    seq: &'a [u8],
    k: usize,
    pos: usize,
    initialized: bool,
    fwd_hash: u64,
    hashes: Vec<u64>,
}

fn base_hash(window: &[u8]) -> u64 {
    window
        .iter()
        .fold(0, |h, &r| srol(h) ^ AA_SEED_TAB[r as usize])
}

impl<'a> AaHash<'a> {
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
        config.check_symbols(seq, is_valid_residue)?;
        Ok(Self {
            seq,
            k: config.k,
            pos: config.start_pos,
            initialized: false,
            fwd_hash: 0,
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
        if !is_valid_residue(char_in) {
            self.pos += self.k + 1;
            return self.init_forward();
        }
        let char_out = self.seq[self.pos];
        self.fwd_hash = srol(self.fwd_hash)
            ^ AA_SEED_TAB[char_in as usize]
            ^ srol_n(AA_SEED_TAB[char_out as usize], self.k as u32);
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
        if !is_valid_residue(char_in) {
            return self.init_backward();
        }
        let char_out = self.seq[self.pos + self.k - 1];
        self.fwd_hash = sror(
            self.fwd_hash
                ^ srol_n(AA_SEED_TAB[char_in as usize], self.k as u32)
                ^ AA_SEED_TAB[char_out as usize],
        );
        self.pos -= 1;
        self.update_hashes();
        true
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    pub fn forward_hash(&self) -> u64 {
        self.fwd_hash
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

    pub fn iter(self) -> HashIter<Self> {
        HashIter::new(self)
    }

    fn init_forward(&mut self) -> bool {
        let last = self.seq.len() - self.k;
        while self.pos <= last {
            let window = &self.seq[self.pos..self.pos + self.k];
            match window.iter().rposition(|&r| !is_valid_residue(r)) {
                Some(offset) => self.pos += offset + 1,
                None => {
                    self.fwd_hash = base_hash(window);
                    self.initialized = true;
                    self.update_hashes();
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
            let window = &self.seq[start..end];
            match window.iter().position(|&r| !is_valid_residue(r)) {
                Some(offset) => end = start + offset,
                None => {
                    self.pos = start;
                    self.fwd_hash = base_hash(window);
                    self.update_hashes();
                    return true;
                }
            }
        }
        false
    }

    fn update_hashes(&mut self) {
        extend_hashes(self.fwd_hash, self.k, &mut self.hashes);
    }
}

impl RollingHash for AaHash<'_> {
    fn roll(&mut self) -> bool {
        AaHash::roll(self)
    }

    fn roll_back(&mut self) -> bool {
        AaHash::roll_back(self)
    }

    fn hashes(&self) -> &[u64] {
        AaHash::hashes(self)
    }

    fn pos(&self) -> usize {
        AaHash::pos(self)
    }

    fn k(&self) -> usize {
        AaHash::k(self)
    }

    fn num_hashes(&self) -> usize {
        AaHash::num_hashes(self)
    }
}

impl<'a> IntoIterator for AaHash<'a> {
    type Item = (usize, Vec<u64>);
    type IntoIter = HashIter<AaHash<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        HashIter::new(self)
    }
}
