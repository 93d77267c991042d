//! Identifier types used throughout the sealing core.
//!
//! Owner and context identifiers are opaque, storage-assigned strings.
//! They are validated once at construction so that every key derivation
//! receives a non-empty pair.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved context identifier meaning "identity not yet assigned".
///
/// Records sealed before storage assigned their identity are bound to this
/// context until they are resealed.
pub const PLACEHOLDER_CONTEXT: &str = "new";

/// Identifier of the account that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner ID, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyId("owner"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

/// Identifier of the resource a ciphertext is cryptographically bound to.
///
/// The literal [`PLACEHOLDER_CONTEXT`] is a valid value and marks a resource
/// whose identity has not been assigned yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextId(String);

/// Resources are addressed by the same identifier their fields are bound to.
pub type ResourceId = ContextId;

impl ContextId {
    /// Creates a context ID, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyId("context"));
        }
        Ok(Self(id))
    }

    /// Returns the placeholder context used before identity assignment.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_CONTEXT.to_string())
    }

    /// Returns true if this is the placeholder context.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_CONTEXT
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContextId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContextId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ContextId> for String {
    fn from(id: ContextId) -> Self {
        id.0
    }
}
