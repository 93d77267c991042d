//! Share token issuance and verification.
//!
//! Tokens use the format: `base64url(payload).base64url(mac)`
//!
//! The payload is a JSON object containing:
//! - `sub`: owner ID
//! - `rid`: resource ID
//! - `iat`: issued-at timestamp (seconds since epoch)
//! - `exp`: expiry timestamp (seconds since epoch)
//! - `jti`: random token ID
//!
//! The MAC covers `payload_b64.as_bytes()` (the encoded payload string, not
//! the decoded JSON), so verification never re-serializes claims.

use crate::error::{TokenError, TokenResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use everkeep_crypto::KeyDeriver;
use everkeep_types::{OwnerId, ResourceId};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Size of the HMAC-SHA256 tag in bytes.
const MAC_SIZE: usize = 32;

/// The signed claims of a share token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareClaims {
    /// Owner of the shared resource.
    pub sub: OwnerId,
    /// Shared resource.
    pub rid: ResourceId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID.
    pub jti: Uuid,
}

/// A verified share token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareGrant {
    claims: ShareClaims,
}

impl ShareGrant {
    /// Owner of the shared resource.
    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.claims.sub
    }

    /// The shared resource.
    #[must_use]
    pub fn resource(&self) -> &ResourceId {
        &self.claims.rid
    }

    /// Returns the issued-at timestamp (seconds since epoch).
    #[must_use]
    pub fn issued_at_secs(&self) -> i64 {
        self.claims.iat
    }

    /// Returns the expiry timestamp (seconds since epoch).
    #[must_use]
    pub fn expires_at_secs(&self) -> i64 {
        self.claims.exp
    }

    /// Random ID of the token.
    #[must_use]
    pub fn token_id(&self) -> Uuid {
        self.claims.jti
    }

    /// The full verified claims.
    #[must_use]
    pub fn claims(&self) -> &ShareClaims {
        &self.claims
    }

    /// Returns true if this grant covers `resource` as currently owned by
    /// `owner`. A resource that changed hands is no longer covered.
    #[must_use]
    pub fn authorizes(&self, owner: &OwnerId, resource: &ResourceId) -> bool {
        &self.claims.sub == owner && &self.claims.rid == resource
    }
}

/// Issues and verifies share tokens under the master secret.
#[derive(Clone, Debug)]
pub struct ShareTokens {
    deriver: KeyDeriver,
}

impl ShareTokens {
    /// Creates an issuer keyed by `deriver`'s signing key.
    pub fn new(deriver: KeyDeriver) -> Self {
        Self { deriver }
    }

    /// Issues a token for `resource` of `owner`, valid for `ttl` from now.
    pub fn issue(&self, owner: &OwnerId, resource: &ResourceId, ttl: Duration) -> TokenResult<String> {
        self.issue_at(owner, resource, ttl, chrono::Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (seconds since epoch).
    pub fn issue_at(
        &self,
        owner: &OwnerId,
        resource: &ResourceId,
        ttl: Duration,
        now: i64,
    ) -> TokenResult<String> {
        if resource.is_placeholder() {
            return Err(TokenError::InvalidClaims(
                "resource has no assigned identity".to_string(),
            ));
        }
        if ttl.as_secs() == 0 {
            return Err(TokenError::InvalidClaims("ttl must be at least one second".to_string()));
        }
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| TokenError::InvalidClaims("ttl overflows expiry".to_string()))?;

        let claims = ShareClaims {
            sub: owner.clone(),
            rid: resource.clone(),
            iat: now,
            exp,
            jti: Uuid::new_v4(),
        };

        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let mac = self.mac(payload_b64.as_bytes())?;
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac);

        debug!(owner = %owner, resource = %resource, exp, "share token issued");
        Ok(format!("{payload_b64}.{sig_b64}"))
    }

    /// Verifies a token against the system clock.
    pub fn verify(&self, token: &str) -> TokenResult<ShareGrant> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verifies a token as if the current time were `now` (seconds since epoch).
    ///
    /// Decodes both parts, then checks the MAC, then the claims, then expiry.
    pub fn verify_at(&self, token: &str, now: i64) -> TokenResult<ShareGrant> {
        let token = token.trim();

        let (payload_b64, signature_b64) = token.split_once('.').ok_or_else(|| {
            TokenError::Malformed("token must have two parts separated by a dot".to_string())
        })?;
        if signature_b64.contains('.') {
            return Err(TokenError::Malformed(
                "token must have exactly two parts".to_string(),
            ));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| TokenError::Malformed(format!("invalid signature base64: {e}")))?;
        if signature.len() != MAC_SIZE {
            return Err(TokenError::Malformed("invalid signature length".to_string()));
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| TokenError::Malformed(format!("invalid payload base64: {e}")))?;

        let expected = self.mac(payload_b64.as_bytes())?;
        if !bool::from(expected.as_slice().ct_eq(signature.as_slice())) {
            warn!("share token signature mismatch");
            return Err(TokenError::InvalidSignature);
        }

        let claims: ShareClaims = serde_json::from_slice(&payload_json)
            .map_err(|e| TokenError::Malformed(format!("invalid payload JSON: {e}")))?;

        if now > claims.exp {
            debug!(owner = %claims.sub, resource = %claims.rid, exp = claims.exp, "share token expired");
            return Err(TokenError::Expired(claims.exp));
        }

        Ok(ShareGrant { claims })
    }

    /// Verifies a token, collapsing every failure to `None`.
    pub fn verify_share_token(&self, token: &str) -> Option<ShareGrant> {
        self.verify(token).ok()
    }

    fn mac(&self, message: &[u8]) -> TokenResult<[u8; MAC_SIZE]> {
        let key = self
            .deriver
            .signing_key()
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        mac.update(message);
        let mut out = [0u8; MAC_SIZE];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }
}
