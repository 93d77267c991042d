//! Context-bound field encryption for Everkeep.
//!
//! Sensitive text fields (vault names, descriptions, entry content) are
//! sealed so that each ciphertext only opens for the owner and resource it
//! was written for:
//! - HKDF-SHA256 derives a key per (owner, context) from one master secret
//! - ChaCha20-Poly1305 seals each value with a fresh random nonce
//! - Sealed values are versioned text envelopes stored in place of plaintext
//!
//! # Reading
//!
//! Stored values may be envelopes, legacy plaintext, or envelopes sealed
//! under the placeholder context `"new"` before the resource had an
//! identity. [`FieldCipher::resolve`] handles all three without failing.
//!
//! # Writing new resources
//!
//! Resources whose identity comes from storage are sealed in two phases,
//! see [`FieldCipher::provision`].

mod cipher;
mod classify;
mod config;
mod error;
mod fields;
mod key;
mod provision;
mod resolver;

pub use cipher::{
    ENVELOPE_VERSION, Envelope, FieldCipher, NONCE_SIZE, TAG_SIZE, VERSION_MARKER, open, seal,
};
pub use classify::{ValueKind, classify, is_encrypted};
pub use config::{DEFAULT_MASTER_SECRET_ENV, SealConfig};
pub use error::{CryptoError, CryptoResult};
pub use fields::{OpenedFields, SealedFields};
pub use key::{DerivedKey, KEY_SIZE, KeyDeriver, MASTER_SECRET_SIZE, MasterSecret};
pub use provision::Provisioning;
pub use resolver::{Decrypted, Resolved};
