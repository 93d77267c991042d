//! Shared test helpers for share token tests.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use everkeep_crypto::{KeyDeriver, MasterSecret};
use everkeep_token::ShareTokens;
use everkeep_types::{OwnerId, ResourceId};

/// Fixed issue time used by most tests (2026-01-01T00:00:00Z).
pub const T0: i64 = 1_767_225_600;

/// Returns share tokens over a deterministic master secret filled with `seed`.
pub fn tokens(seed: u8) -> ShareTokens {
    ShareTokens::new(KeyDeriver::new(MasterSecret::from_bytes([seed; 32])))
}

pub fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

pub fn resource(id: &str) -> ResourceId {
    ResourceId::new(id).unwrap()
}

/// Splits a token into its decoded payload JSON and its signature part.
pub fn split(token: &str) -> (String, String) {
    let (payload_b64, sig_b64) = token.split_once('.').unwrap();
    let json = URL_SAFE_NO_PAD.decode(payload_b64).unwrap();
    (String::from_utf8(json).unwrap(), sig_b64.to_string())
}

/// Reassembles a token from payload JSON and a (possibly stale) signature.
pub fn join(payload_json: &str, sig_b64: &str) -> String {
    format!("{}.{sig_b64}", URL_SAFE_NO_PAD.encode(payload_json.as_bytes()))
}
