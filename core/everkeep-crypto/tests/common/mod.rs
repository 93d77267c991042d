//! Shared test helpers for crypto tests.

#![allow(dead_code)]

use everkeep_crypto::{FieldCipher, KeyDeriver, MasterSecret};
use everkeep_types::{ContextId, OwnerId};

/// Returns a deterministic master secret filled with `seed`.
pub fn secret(seed: u8) -> MasterSecret {
    MasterSecret::from_bytes([seed; 32])
}

pub fn deriver(seed: u8) -> KeyDeriver {
    KeyDeriver::new(secret(seed))
}

pub fn cipher(seed: u8) -> FieldCipher {
    FieldCipher::from_secret(secret(seed))
}

pub fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

pub fn ctx(id: &str) -> ContextId {
    ContextId::new(id).unwrap()
}
