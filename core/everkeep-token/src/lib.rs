//! Share tokens for Everkeep.
//!
//! A share token grants time-limited access to one resource of one owner
//! without a session. Tokens are stateless: verification needs only the
//! token and the master secret, so a token cannot be revoked before it
//! expires.
//!
//! # Token Format
//!
//! Tokens are formatted as: `base64url(payload).base64url(mac)`
//! The payload is a JSON object containing:
//! - Owner ID, resource ID, issued-at and expiry timestamps, token ID
//!
//! The MAC is HMAC-SHA256 under a key derived from the master secret and
//! kept separate from every field-encryption key.

mod error;
mod token;

pub use error::{TokenError, TokenResult};
pub use token::{ShareClaims, ShareGrant, ShareTokens};
