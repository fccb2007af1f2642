//! Rolling k-mer hashing and Bloom filters for sequence analysis.
//!
//! The [`nthash`] module turns nucleotide (or protein) sequences into a
//! stream of per-window hash values in O(1) per step:
//!    * [`NtHash`]: canonical hash, identical for a k-mer and its reverse
//!      complement.
//!    * [`SeedNtHash`]: one canonical hash per spaced seed, ignoring the
//!      seed's don't-care positions.
//!    * [`BlindNtHash`] / [`BlindSeedNtHash`]: fed one symbol at a time,
//!      for streams that are never fully resident.
//!    * [`AaHash`]: forward-only hashing of amino-acid sequences.
//!
//! The [`bloom`] module stores those values:
//!    * [`BloomFilter`]: bit array, no false negatives.
//!    * [`CountingBloomFilter`]: saturating 8/16/32-bit counters with removal.
//!    * [`KmerBloomFilter`], [`SeedBloomFilter`], [`KmerCountingBloomFilter`]:
//!      insert and query whole sequences.
//!
//! Filters are saved to a small versioned binary format (see
//! [`bloom::storage`]) and reloaded with full validation.
//!
//! ```
//! use ntbloom::{KmerBloomFilter, NtHash};
//!
//! let mut filter = KmerBloomFilter::new(1 << 16, 3, 5).unwrap();
//! filter.insert_seq(b"ACGTACGTTGCA").unwrap();
//! assert_eq!(filter.contains_seq(b"TGCAACGTA").unwrap(), 5);
//!
//! let positions: Vec<usize> = NtHash::new(b"ACGTNACGTA", 4, 2, 0)
//!     .unwrap()
//!     .into_iter()
//!     .map(|(pos, _)| pos)
//!     .collect();
//! assert_eq!(positions, vec![0, 5, 6]);
//! ```

pub mod bloom;
pub mod common;
mod hash;
pub mod nthash;

pub use bloom::{
    BloomError, BloomFilter, BloomFilterConfig, BloomFilterConfigBuilder,
    BloomFilterOps, BloomFilterStats, BloomResult, Counter,
    CountingBloomFilter, KmerBloomFilter, KmerCountingBloomFilter,
    PersistentBloomFilter, SeedBloomFilter,
};
pub use hash::{
    HashFunction, default_hash_function, optimal_bit_vector_size,
    optimal_num_hashes,
};
pub use nthash::{
    AaHash, BlindNtHash, BlindRollingHash, BlindSeedNtHash, HashSeed,
    NtHash, NtHashConfig, NtHashConfigBuilder, NtHashError, NtHashResult,
    RollingHash, SeedNtHash, SymbolPolicy,
};
