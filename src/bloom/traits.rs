use super::BloomResult;
use crate::common::bytes2hr;
use std::path::Path;
use tracing::info;

/// Membership over precomputed hash values.
///
/// Callers pass at least `num_hashes()` values; each one is reduced modulo
/// the number of slots.
pub trait BloomFilterOps {
    fn insert(&mut self, hashes: &[u64]) -> BloomResult<()>;
    fn contains(&self, hashes: &[u64]) -> BloomResult<bool>;
}

pub trait BloomFilterStats {
    /// Number of bits (or counters)
    fn num_slots(&self) -> usize;

    fn num_hashes(&self) -> usize;

    /// Number of non-zero slots
    fn pop_count(&self) -> usize;

    fn occupancy(&self) -> f64 {
        self.pop_count() as f64 / self.num_slots() as f64
    }

    /// False positive rate estimated from the observed occupancy.
    fn fpr(&self) -> f64 {
        self.occupancy().powi(self.num_hashes() as i32)
    }
}

pub trait PersistentBloomFilter: Sized {
    fn to_bytes(&self) -> BloomResult<Vec<u8>>;
    fn from_bytes(bytes: &[u8]) -> BloomResult<Self>;

    fn save(&self, path: impl AsRef<Path>) -> BloomResult<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), size = %bytes2hr(bytes.len()), "Saved filter");
        Ok(())
    }

    fn load(path: impl AsRef<Path>) -> BloomResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filter = Self::from_bytes(&bytes)?;
        info!(path = %path.display(), size = %bytes2hr(bytes.len()), "Loaded filter");
        Ok(filter)
    }
}
