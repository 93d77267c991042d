//! Master secret handling and per-record key derivation.
//!
//! Field keys are derived with HKDF-SHA256 from the process-wide master
//! secret. The info string binds each key to one (owner, context) pair:
//!
//! ```text
//! info = FIELD_KEY_LABEL || u64be(len(owner)) || owner || u64be(len(context)) || context
//! ```
//!
//! The share-token MAC key is expanded from the same PRK under a different
//! label, so signing and field keys never coincide.

use crate::error::{CryptoError, CryptoResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use everkeep_types::{ContextId, OwnerId};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of derived keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Size of the master secret in bytes.
pub const MASTER_SECRET_SIZE: usize = 32;

const HKDF_SALT: &[u8] = b"everkeep.master.v1";
const FIELD_KEY_LABEL: &[u8] = b"everkeep.field-key.v1";
const SHARE_TOKEN_LABEL: &[u8] = b"everkeep.share-token.v1";

/// The process-wide master secret.
///
/// Loaded once at startup and never logged or persisted by this crate.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret {
    bytes: [u8; MASTER_SECRET_SIZE],
}

impl MasterSecret {
    /// Creates a master secret from raw bytes.
    pub fn from_bytes(bytes: [u8; MASTER_SECRET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a master secret from a slice of exactly `MASTER_SECRET_SIZE` bytes.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        if slice.is_empty() {
            return Err(CryptoError::Configuration("master secret is empty".to_string()));
        }
        if slice.len() != MASTER_SECRET_SIZE {
            return Err(CryptoError::Configuration(format!(
                "master secret must be {MASTER_SECRET_SIZE} bytes, got {}",
                slice.len()
            )));
        }
        let mut bytes = [0u8; MASTER_SECRET_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self { bytes })
    }

    /// Decodes a standard base64 master secret.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CryptoError::Configuration("master secret is empty".to_string()));
        }
        let bytes = Zeroizing::new(STANDARD.decode(encoded).map_err(|_| {
            CryptoError::Configuration("master secret is not valid base64".to_string())
        })?);
        Self::try_from_slice(&bytes)
    }

    /// Reads a base64 master secret from the environment variable `name`.
    pub fn from_env(name: &str) -> CryptoResult<Self> {
        let value = Zeroizing::new(std::env::var(name).map_err(|e| match e {
            std::env::VarError::NotPresent => {
                CryptoError::Configuration(format!("{name} is not set"))
            }
            std::env::VarError::NotUnicode(_) => {
                CryptoError::Configuration(format!("{name} is not valid unicode"))
            }
        })?);
        Self::from_base64(&value)
    }

    /// Generates a fresh random master secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MASTER_SECRET_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Encodes the secret as standard base64 for provisioning a secrets store.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    fn as_bytes(&self) -> &[u8; MASTER_SECRET_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A derived encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a new derived key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derives per-record keys from the master secret.
///
/// Cheap to clone; clones share the same immutable secret.
#[derive(Clone)]
pub struct KeyDeriver {
    secret: Arc<MasterSecret>,
}

impl KeyDeriver {
    /// Creates a deriver that owns `secret` for the rest of the process.
    pub fn new(secret: MasterSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// Derives the field key for `(owner, context)`.
    ///
    /// Deterministic: the same pair under the same master secret always
    /// yields the same key.
    pub fn derive(&self, owner: &OwnerId, context: &ContextId) -> CryptoResult<DerivedKey> {
        let owner = owner.as_str().as_bytes();
        let context = context.as_str().as_bytes();

        let mut info = Vec::with_capacity(FIELD_KEY_LABEL.len() + 16 + owner.len() + context.len());
        info.extend_from_slice(FIELD_KEY_LABEL);
        info.extend_from_slice(&(owner.len() as u64).to_be_bytes());
        info.extend_from_slice(owner);
        info.extend_from_slice(&(context.len() as u64).to_be_bytes());
        info.extend_from_slice(context);

        self.expand(&info)
    }

    /// Derives the MAC key used to sign share tokens.
    pub fn signing_key(&self) -> CryptoResult<DerivedKey> {
        self.expand(SHARE_TOKEN_LABEL)
    }

    fn expand(&self, info: &[u8]) -> CryptoResult<DerivedKey> {
        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), self.secret.as_bytes());
        let mut okm = [0u8; KEY_SIZE];
        hkdf.expand(info, &mut okm)
            .map_err(|_| CryptoError::KeyDerivation("HKDF expand failed".to_string()))?;
        let key = DerivedKey::from_bytes(okm);
        okm.zeroize();
        Ok(key)
    }
}

impl std::fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDeriver").finish_non_exhaustive()
    }
}
