//! Field encryption using ChaCha20-Poly1305.
//!
//! Every sealed value is stored as a text envelope:
//!
//! ```text
//! ek1:base64(nonce || ciphertext || tag)
//! ```
//!
//! The `ek1:` marker names the envelope version and is also fed to the AEAD
//! as associated data.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, KeyDeriver, MasterSecret};
use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use everkeep_types::{ContextId, OwnerId};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Marker prefix of every envelope produced at `ENVELOPE_VERSION`.
pub const VERSION_MARKER: &str = "ek1:";

const MARKER_FAMILY: &str = "ek";
const MARKER_SEPARATOR: char = ':';

/// Splits `value` into its version number and body, if it carries an
/// `ek<digits>:` marker in canonical form (no leading zeros).
pub(crate) fn split_marker(value: &str) -> Option<(u32, &str)> {
    let rest = value.strip_prefix(MARKER_FAMILY)?;
    let (digits, body) = rest.split_once(MARKER_SEPARATOR)?;
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.starts_with('0') {
        return None;
    }
    let version = digits.parse().ok()?;
    Some((version, body))
}

/// A parsed envelope: the nonce and the tag-bearing ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parses a text envelope.
    ///
    /// Fails with the opaque `Decryption` error on an unknown version,
    /// invalid base64 or a body shorter than nonce plus tag.
    pub fn parse(value: &str) -> CryptoResult<Self> {
        let (version, body) = split_marker(value).ok_or(CryptoError::Decryption)?;
        if version != ENVELOPE_VERSION {
            return Err(CryptoError::Decryption);
        }

        let bytes = STANDARD.decode(body).map_err(|_| CryptoError::Decryption)?;
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption);
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }

    /// Encodes to the text form stored in place of plaintext.
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        format!("{VERSION_MARKER}{}", STANDARD.encode(&bytes))
    }

    /// The nonce used for encryption (unique per envelope).
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// The encrypted ciphertext, including the auth tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Returns the binary size of nonce plus ciphertext.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> CryptoResult<Envelope> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let payload = Payload {
        msg: plaintext,
        aad: VERSION_MARKER.as_bytes(),
    };
    let ciphertext = cipher
        .encrypt(nonce, payload)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(Envelope {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts and authenticates an envelope under `key`.
pub fn open(key: &DerivedKey, envelope: &Envelope) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&envelope.nonce);

    let payload = Payload {
        msg: envelope.ciphertext.as_ref(),
        aad: VERSION_MARKER.as_bytes(),
    };
    cipher
        .decrypt(nonce, payload)
        .map_err(|_| CryptoError::Decryption)
}

/// Encrypts and decrypts text fields bound to an (owner, context) pair.
///
/// Keys are derived per call and dropped (zeroized) when the call returns.
#[derive(Clone, Debug)]
pub struct FieldCipher {
    deriver: KeyDeriver,
}

impl FieldCipher {
    /// Creates a cipher over an existing key deriver.
    pub fn new(deriver: KeyDeriver) -> Self {
        Self { deriver }
    }

    /// Creates a cipher that owns `secret`.
    pub fn from_secret(secret: MasterSecret) -> Self {
        Self::new(KeyDeriver::new(secret))
    }

    /// Returns the underlying key deriver.
    pub fn deriver(&self) -> &KeyDeriver {
        &self.deriver
    }

    /// Seals `plaintext` for `(owner, context)` and returns the text envelope.
    pub fn encrypt_text(
        &self,
        plaintext: &str,
        owner: &OwnerId,
        context: &ContextId,
    ) -> CryptoResult<String> {
        let key = self.deriver.derive(owner, context)?;
        Ok(seal(&key, plaintext.as_bytes())?.encode())
    }

    /// Opens a text envelope sealed for `(owner, context)`.
    ///
    /// Every failure is reported as `CryptoError::Decryption`.
    pub fn decrypt_text(
        &self,
        value: &str,
        owner: &OwnerId,
        context: &ContextId,
    ) -> CryptoResult<String> {
        let envelope = Envelope::parse(value)?;
        let key = self.deriver.derive(owner, context)?;
        let plaintext = open(&key, &envelope)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
    }
}
