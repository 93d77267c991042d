//! Distinguishing sealed envelopes from legacy plaintext.
//!
//! Classification is a parse of the envelope structure. It never derives a
//! key or checks the tag, so it needs no owner or context.

use crate::cipher::{ENVELOPE_VERSION, Envelope, split_marker};

/// What a stored field value looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Empty string.
    Empty,
    /// Structurally valid envelope at the current version.
    Envelope,
    /// Carries an envelope marker for a version this build cannot open.
    UnsupportedVersion(u32),
    /// Anything else, including legacy plaintext and truncated envelopes.
    Plaintext,
}

/// Classifies a stored value.
pub fn classify(value: &str) -> ValueKind {
    if value.is_empty() {
        return ValueKind::Empty;
    }
    match split_marker(value) {
        Some((version, _)) if version != ENVELOPE_VERSION => ValueKind::UnsupportedVersion(version),
        Some(_) if Envelope::parse(value).is_ok() => ValueKind::Envelope,
        _ => ValueKind::Plaintext,
    }
}

/// Returns true iff `value` is a structurally valid envelope.
///
/// Never a false negative for values produced by the cipher. A plaintext
/// that happens to carry a valid `ek1:` body would be a false positive.
pub fn is_encrypted(value: &str) -> bool {
    classify(value) == ValueKind::Envelope
}
