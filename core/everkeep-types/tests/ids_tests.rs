use everkeep_types::{ContextId, Error, OwnerId, PLACEHOLDER_CONTEXT};
use proptest::prelude::*;
use std::str::FromStr;

// ── OwnerId ───────────────────────────────────────────────────────

#[test]
fn owner_id_rejects_empty() {
    assert_eq!(OwnerId::new(""), Err(Error::EmptyId("owner")));
}

#[test]
fn owner_id_display_matches_input() {
    let id = OwnerId::new("u1").unwrap();
    assert_eq!(id.to_string(), "u1");
    assert_eq!(id.as_str(), "u1");
}

#[test]
fn owner_id_from_str() {
    let id = OwnerId::from_str("64f1c0ffee").unwrap();
    assert_eq!(id.as_str(), "64f1c0ffee");
    assert!(OwnerId::from_str("").is_err());
}

#[test]
fn owner_id_serde_is_transparent() {
    let id = OwnerId::new("u1").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"u1\"");
    let parsed: OwnerId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn owner_id_serde_rejects_empty() {
    assert!(serde_json::from_str::<OwnerId>("\"\"").is_err());
}

// ── ContextId ─────────────────────────────────────────────────────

#[test]
fn context_id_rejects_empty() {
    assert_eq!(ContextId::new(""), Err(Error::EmptyId("context")));
}

#[test]
fn placeholder_context() {
    let ctx = ContextId::placeholder();
    assert!(ctx.is_placeholder());
    assert_eq!(ctx.as_str(), PLACEHOLDER_CONTEXT);
    assert_eq!(ctx, ContextId::new("new").unwrap());
}

#[test]
fn real_context_is_not_placeholder() {
    let ctx = ContextId::new("v42").unwrap();
    assert!(!ctx.is_placeholder());
    assert!(!ContextId::new("New").unwrap().is_placeholder());
}

#[test]
fn context_id_serde_rejects_empty() {
    assert!(serde_json::from_str::<ContextId>("\"\"").is_err());
    let parsed: ContextId = serde_json::from_str("\"v42\"").unwrap();
    assert_eq!(parsed.as_str(), "v42");
}

// ── Properties ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn non_empty_ids_roundtrip_through_string(s in "[a-zA-Z0-9_-]{1,40}") {
        let owner = OwnerId::new(s.clone()).unwrap();
        prop_assert_eq!(String::from(owner), s.clone());
        let ctx = ContextId::new(s.clone()).unwrap();
        prop_assert_eq!(String::from(ctx), s);
    }
}
