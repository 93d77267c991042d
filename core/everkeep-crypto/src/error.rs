//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Master secret missing or unusable. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed.
    ///
    /// Malformed envelopes, unknown versions, wrong keys and tampered data
    /// all collapse into this one variant.
    #[error("decryption failed")]
    Decryption,

    /// Provisioning can only be finalized under a real resource identity.
    #[error("cannot finalize provisioning under the placeholder context")]
    PlaceholderContext,
}
