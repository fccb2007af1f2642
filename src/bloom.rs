//! Bloom filters over precomputed hash values
pub mod config;
pub mod counting;
pub mod error;
pub mod filter;
pub mod kmer;
pub mod storage;
pub mod traits;

pub use config::{BloomFilterConfig, BloomFilterConfigBuilder, BloomParams};
pub use counting::{Counter, CountingBloomFilter};
pub use error::{BloomError, BloomResult};
pub use filter::BloomFilter;
pub use kmer::{KmerBloomFilter, KmerCountingBloomFilter, SeedBloomFilter};
pub use storage::{FORMAT_VERSION, FilterHeader, FilterKind, MAGIC};
pub use traits::{BloomFilterOps, BloomFilterStats, PersistentBloomFilter};
