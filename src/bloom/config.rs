use super::{BloomError, BloomResult};
use crate::hash::{optimal_bit_vector_size, optimal_num_hashes};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct BloomFilterConfig {
    /// Expected number of distinct elements
    #[builder(default = "1_000_000")]
    pub capacity: usize,

    /// Target false positive rate (0.0 to 1.0)
    #[builder(default = "0.01")]
    pub false_positive_rate: f64,

    /// Explicit filter size in bits, overrides the capacity-derived size
    #[builder(default = "None")]
    pub num_bits: Option<usize>,

    /// Explicit number of hash functions, overrides the derived count
    #[builder(default = "None")]
    pub num_hashes: Option<usize>,
}

impl Default for BloomFilterConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            false_positive_rate: 0.01,
            num_bits: None,
            num_hashes: None,
        }
    }
}

impl BloomFilterConfig {
    pub fn validate(&self) -> BloomResult<()> {
        if self.num_bits == Some(0) {
            return Err(BloomError::InvalidConfig(
                "Number of bits must be > 0".into(),
            ));
        }
        if self.num_hashes == Some(0) {
            return Err(BloomError::InvalidConfig(
                "Number of hashes must be > 0".into(),
            ));
        }
        if self.num_bits.is_some() && self.num_hashes.is_some() {
            return Ok(());
        }
        if self.capacity == 0 {
            return Err(BloomError::InvalidConfig(
                "Capacity must be > 0".into(),
            ));
        }
        if self.false_positive_rate <= 0.0 || self.false_positive_rate >= 1.0 {
            return Err(BloomError::InvalidConfig(
                "FPR must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Filter shape derived from a [`BloomFilterConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomParams {
    pub num_bits: usize,
    pub num_hashes: usize,
}

impl From<&BloomFilterConfig> for BloomParams {
    fn from(config: &BloomFilterConfig) -> Self {
        let num_bits = config.num_bits.unwrap_or_else(|| {
            optimal_bit_vector_size(config.capacity, config.false_positive_rate)
        });
        let num_hashes = config
            .num_hashes
            .unwrap_or_else(|| optimal_num_hashes(config.capacity, num_bits));

        Self {
            num_bits: num_bits.max(1),
            num_hashes: num_hashes.max(1),
        }
    }
}
