use crate::nthash::NtHashError;
use thiserror::Error;

pub type BloomResult<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Expected at least {expected} hash values, got {found}")]
    HashCountMismatch { expected: usize, found: usize },

    #[error("Filter shapes differ: {0}")]
    ShapeMismatch(String),

    #[error("Corrupt filter file: {0}")]
    CorruptFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Hashing error: {0}")]
    Hash(#[from] NtHashError),
}

impl From<bincode::error::EncodeError> for BloomError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BloomError::SerializationError(err.to_string())
    }
}
