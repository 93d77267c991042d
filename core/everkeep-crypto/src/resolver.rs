//! Best-effort decryption for read paths.
//!
//! Records created before their resource had an identity were sealed under
//! the placeholder context. Reads try the real context first, then the
//! placeholder, and never fail: a field that cannot be opened is returned as
//! stored so that one bad field does not abort a list.

use crate::cipher::FieldCipher;
use crate::classify::is_encrypted;
use everkeep_types::{ContextId, OwnerId};
use tracing::{debug, warn};

/// Outcome of a single contained decryption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrypted {
    /// The envelope opened under the requested context.
    Plaintext(String),
    /// Not an envelope, or an envelope this key cannot open.
    Unreadable,
}

impl Decrypted {
    /// Returns the plaintext, discarding the unreadable case.
    #[must_use]
    pub fn ok(self) -> Option<String> {
        match self {
            Self::Plaintext(p) => Some(p),
            Self::Unreadable => None,
        }
    }

    /// Returns true if the envelope opened.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Plaintext(_))
    }
}

/// A field value after fallback resolution, tagged with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Opened under the requested context.
    Current(String),
    /// Opened under the placeholder context. The stored value should be
    /// resealed under the real context.
    Placeholder(String),
    /// Empty or legacy plaintext, returned as stored.
    Passthrough(String),
    /// An envelope neither context could open, returned as stored.
    Unreadable(String),
}

impl Resolved {
    /// Returns the resolved text, whatever its provenance.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Current(s) | Self::Placeholder(s) | Self::Passthrough(s) | Self::Unreadable(s) => s,
        }
    }

    /// Consumes the value, returning the resolved text.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Current(s) | Self::Placeholder(s) | Self::Passthrough(s) | Self::Unreadable(s) => s,
        }
    }

    /// True when the value was recovered from the placeholder context.
    #[must_use]
    pub fn needs_reseal(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// True when no context could open the value.
    #[must_use]
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable(_))
    }
}

impl FieldCipher {
    /// Decrypts `value` under `(owner, context)`, containing any failure.
    pub fn safe_decrypt(&self, value: &str, owner: &OwnerId, context: &ContextId) -> Decrypted {
        match self.decrypt_text(value, owner, context) {
            Ok(plaintext) => Decrypted::Plaintext(plaintext),
            Err(_) => Decrypted::Unreadable,
        }
    }

    /// Resolves a stored field value, falling back to the placeholder context.
    ///
    /// 1. Empty values pass through.
    /// 2. The real context is tried first.
    /// 3. Values that are not envelopes pass through as legacy plaintext.
    /// 4. Envelopes are retried once under the placeholder context.
    pub fn resolve(&self, value: &str, owner: &OwnerId, context: &ContextId) -> Resolved {
        if value.is_empty() {
            return Resolved::Passthrough(String::new());
        }

        if let Decrypted::Plaintext(plaintext) = self.safe_decrypt(value, owner, context) {
            return Resolved::Current(plaintext);
        }

        if !is_encrypted(value) {
            return Resolved::Passthrough(value.to_string());
        }

        if !context.is_placeholder() {
            let placeholder = ContextId::placeholder();
            if let Decrypted::Plaintext(plaintext) = self.safe_decrypt(value, owner, &placeholder) {
                debug!(owner = %owner, context = %context, "field opened under placeholder context");
                return Resolved::Placeholder(plaintext);
            }
        }

        warn!(owner = %owner, context = %context, "sealed field could not be opened");
        Resolved::Unreadable(value.to_string())
    }

    /// Returns the best available plaintext for `value`, or `value` itself.
    pub fn decrypt_with_fallback(&self, value: &str, owner: &OwnerId, context: &ContextId) -> String {
        self.resolve(value, owner, context).into_string()
    }

    /// [`resolve`](Self::resolve) for nullable fields. `None` stays `None`.
    pub fn resolve_optional(
        &self,
        value: Option<&str>,
        owner: &OwnerId,
        context: &ContextId,
    ) -> Option<Resolved> {
        value.map(|v| self.resolve(v, owner, context))
    }
}
