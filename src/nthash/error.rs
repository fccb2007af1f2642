use thiserror::Error;

pub type NtHashResult<T> = std::result::Result<T, NtHashError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NtHashError {
    #[error("Invalid k-mer size {k} for a sequence of length {seq_len}")]
    InvalidK { k: usize, seq_len: usize },

    #[error("Number of hashes per window must be greater than 0")]
    InvalidNumHashes,

    #[error(
        "Start position {pos} leaves no room for a {k}-mer in a sequence of length {seq_len}"
    )]
    InvalidPosition { pos: usize, k: usize, seq_len: usize },

    #[error("Spaced seed '{seed}' has length {found}, expected {expected}")]
    SeedLengthMismatch {
        seed: String,
        expected: usize,
        found: usize,
    },

    #[error("At least one spaced seed is required")]
    EmptySeedSet,

    #[error("Invalid symbol {symbol:#04x} at position {position}")]
    InvalidSymbol { position: usize, symbol: u8 },
}
