//! Error types for the registry.

use star_registry_core::CoreError;
use thiserror::Error;

/// Reasons a registry operation is rejected.
///
/// Submission rejections happen before the chain is touched; the caller can
/// correct them by requesting a fresh challenge and signing again.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The signature does not prove ownership of the address.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signed challenge is older than the submission window.
    #[error("submission message is expired: {age_secs}s old, window is {window_secs}s")]
    MessageExpired { age_secs: u64, window_secs: u64 },

    /// The signed message is not an ownership challenge.
    #[error("malformed submission message: {0}")]
    MalformedMessage(String),

    /// Encoding or decoding failure from the core.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
