//! Rolling k-mer hashing.
//!
//! [`NtHash`] walks a nucleotide sequence and produces strand-independent
//! (canonical) hash values per k-mer; [`SeedNtHash`] does the same for
//! spaced seeds; the blind variants are fed one symbol at a time; [`AaHash`]
//! hashes protein sequences.

pub mod aahash;
pub mod blind;
pub mod config;
pub mod error;
pub mod kmer;
pub mod seed;
pub mod tables;
pub mod traits;

pub use aahash::AaHash;
pub use blind::{BlindNtHash, BlindSeedNtHash};
pub use config::{NtHashConfig, NtHashConfigBuilder, SymbolPolicy};
pub use error::{NtHashError, NtHashResult};
pub use kmer::NtHash;
pub use seed::{HashSeed, SeedNtHash};
pub use traits::{BlindRollingHash, HashIter, RollingHash};

/// Lazy `(position, hashes)` iterator over an [`NtHash`].
pub type NtHashIter<'a> = HashIter<NtHash<'a>>;
