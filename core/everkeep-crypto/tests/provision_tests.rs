//! Two-phase sealing: placeholder first, real identity after the insert.

mod common;

use common::{cipher, ctx, owner};
use everkeep_crypto::{CryptoError, Resolved, SealedFields};
use everkeep_types::ContextId;

#[test]
fn staged_fields_are_sealed_under_placeholder() {
    let c = cipher(1);
    let p = c
        .provision(&owner("u1"), [("name", Some("My Vault")), ("description", None::<&str>)])
        .unwrap();

    let staged = p.staged().get("name").unwrap();
    assert_eq!(
        c.decrypt_text(staged, &owner("u1"), &ContextId::placeholder()).unwrap(),
        "My Vault"
    );
    assert!(p.staged().contains("description"));
    assert_eq!(p.staged().get("description"), None);
}

#[test]
fn finalize_reseals_under_real_identity() {
    let c = cipher(1);
    let p = c.provision(&owner("u1"), [("name", Some("My Vault"))]).unwrap();
    let finalized = p.finalize(&ctx("v42")).unwrap();

    let name = finalized.get("name").unwrap();
    assert_ne!(Some(name), p.staged().get("name"));
    assert_eq!(c.decrypt_text(name, &owner("u1"), &ctx("v42")).unwrap(), "My Vault");
    assert!(c.decrypt_text(name, &owner("u1"), &ContextId::placeholder()).is_err());
}

#[test]
fn finalize_rejects_placeholder() {
    let c = cipher(1);
    let p = c.provision(&owner("u1"), [("name", Some("x"))]).unwrap();
    assert_eq!(
        p.finalize(&ContextId::placeholder()).unwrap_err(),
        CryptoError::PlaceholderContext
    );
}

#[test]
fn finalize_can_be_retried() {
    let c = cipher(1);
    let p = c.provision(&owner("u1"), [("name", Some("x"))]).unwrap();
    let first = p.finalize(&ctx("v1")).unwrap();
    let second = p.finalize(&ctx("v1")).unwrap();
    assert_ne!(first, second);
    assert_eq!(c.open_fields(&second, &owner("u1"), &ctx("v1")).get("name"), Some("x"));
}

#[test]
fn provisioning_debug_hides_plaintext() {
    let c = cipher(1);
    let p = c.provision(&owner("u1"), [("name", Some("top secret"))]).unwrap();
    let debug = format!("{p:?}");
    assert!(debug.contains("name"));
    assert!(!debug.contains("top secret"));
}

// ── reseal ───────────────────────────────────────────────────────

#[test]
fn reseal_heals_placeholder_values() {
    let c = cipher(1);
    let legacy = c.encrypt_text("My Vault", &owner("u1"), &ContextId::placeholder()).unwrap();
    let healed = c.reseal(&legacy, &owner("u1"), &ctx("v42")).unwrap().unwrap();
    assert_eq!(
        c.resolve(&healed, &owner("u1"), &ctx("v42")),
        Resolved::Current("My Vault".to_string())
    );
}

#[test]
fn reseal_skips_values_that_need_nothing() {
    let c = cipher(1);
    let current = c.encrypt_text("x", &owner("u1"), &ctx("v42")).unwrap();
    assert_eq!(c.reseal(&current, &owner("u1"), &ctx("v42")).unwrap(), None);
    assert_eq!(c.reseal("plain", &owner("u1"), &ctx("v42")).unwrap(), None);
    assert_eq!(c.reseal("", &owner("u1"), &ctx("v42")).unwrap(), None);
}

// ── End to end ───────────────────────────────────────────────────

#[test]
fn vault_name_reads_back_whichever_phase_is_stored() {
    let c = cipher(1);
    let u1 = owner("u1");

    // Phase 1: seal before the insert, persist `staged`.
    let p = c.provision(&u1, [("name", Some("My Vault"))]).unwrap();
    let mut stored: SealedFields = p.staged().clone();

    // Storage assigns the identity; a read before the write-back still works.
    let v42 = ctx("v42");
    assert_eq!(
        c.decrypt_with_fallback(stored.get("name").unwrap(), &u1, &v42),
        "My Vault"
    );

    // Phase 2: reseal and write back in place.
    stored = p.finalize(&v42).unwrap();
    assert_eq!(
        c.decrypt_with_fallback(stored.get("name").unwrap(), &u1, &v42),
        "My Vault"
    );
    assert!(!c.open_fields(&stored, &u1, &v42).needs_reseal());
}
