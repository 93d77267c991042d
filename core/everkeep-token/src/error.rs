//! Error types for share tokens.

use thiserror::Error;

/// Share token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be decoded.
    #[error("malformed share token: {0}")]
    Malformed(String),

    /// MAC verification failed.
    #[error("share token signature invalid")]
    InvalidSignature,

    /// Token is past its expiry (seconds since epoch).
    #[error("share token expired at {0}")]
    Expired(i64),

    /// Claims cannot be issued (zero TTL, overflow, unassigned resource).
    #[error("invalid share token claims: {0}")]
    InvalidClaims(String),

    /// Signing key could not be derived.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for share token operations.
pub type TokenResult<T> = Result<T, TokenError>;
