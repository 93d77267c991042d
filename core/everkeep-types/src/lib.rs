//! Core type definitions for the Everkeep sealing core.
//!
//! This crate defines the identifiers every sealing operation is bound to:
//! - Owner identifiers (the account a record belongs to)
//! - Context identifiers (the resource a ciphertext is bound to)
//!
//! Identifiers are opaque strings assigned by the storage layer. The only
//! constraint enforced here is non-emptiness.

mod ids;

pub use ids::{ContextId, OwnerId, ResourceId, PLACEHOLDER_CONTEXT};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0} identifier must not be empty")]
    EmptyId(&'static str),
}
