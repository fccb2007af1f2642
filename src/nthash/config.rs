use super::error::{NtHashError, NtHashResult};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// What a roller does with symbols outside its alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SymbolPolicy {
    /// Skip every window that contains an invalid symbol.
    #[default]
    Skip,
    /// Refuse to construct a roller over a sequence with invalid symbols.
    Strict,
}

/// Construction parameters shared by all sequence-backed rollers.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct NtHashConfig {
    /// Window (k-mer) size
    pub k: usize,

    /// Hash values per window (per seed, for spaced-seed rollers)
    #[builder(default = "1")]
    pub num_hashes: usize,

    /// First position the roller may start from
    #[builder(default = "0")]
    pub start_pos: usize,

    #[builder(default)]
    pub policy: SymbolPolicy,
}

impl NtHashConfig {
    pub fn new(k: usize, num_hashes: usize) -> Self {
        Self {
            k,
            num_hashes,
            start_pos: 0,
            policy: SymbolPolicy::default(),
        }
    }

    pub fn validate(&self, seq_len: usize) -> NtHashResult<()> {
        if self.k == 0 || self.k > seq_len {
            return Err(NtHashError::InvalidK { k: self.k, seq_len });
        }
        if self.num_hashes == 0 {
            return Err(NtHashError::InvalidNumHashes);
        }
        if self.start_pos > seq_len - self.k {
            return Err(NtHashError::InvalidPosition {
                pos: self.start_pos,
                k: self.k,
                seq_len,
            });
        }
        Ok(())
    }

    /// Under [`SymbolPolicy::Strict`], reject the first symbol at or after
    /// `start_pos` that `is_valid` does not accept.
    pub(crate) fn check_symbols(
        &self,
        seq: &[u8],
        is_valid: fn(u8) -> bool,
    ) -> NtHashResult<()> {
        if self.policy == SymbolPolicy::Skip {
            return Ok(());
        }
        match seq[self.start_pos..].iter().position(|&b| !is_valid(b)) {
            Some(offset) => Err(NtHashError::InvalidSymbol {
                position: self.start_pos + offset,
                symbol: seq[self.start_pos + offset],
            }),
            None => Ok(()),
        }
    }
}
