//! Error types for the Star Registry core.

use thiserror::Error;

/// Core errors that can occur while encoding, decoding, or parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("encoding error: {0}")]
    Encoding(String),

    /// The stored body does not hex-decode to UTF-8 JSON of the expected shape.
    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("malformed ownership challenge: {0}")]
    MalformedChallenge(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
