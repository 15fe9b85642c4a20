//!
//! fruitstand session manager
//! --------------------------
//! Stateless, tamper-evident sessions. A token encodes `{user_id, issued_at}`
//! as base64url JSON followed by a hex HMAC-SHA256 signature:
//!
//! ```text
//! base64url(claims) "." hex(hmac_sha256(key, base64url(claims)))
//! ```
//!
//! Nothing is stored server-side: the token is the session, verified on every
//! request. The signing key set may hold several keys so keys can rotate
//! without invalidating live sessions; new tokens are signed with the first
//! key and verification accepts any key in the set. Malformed, forged and
//! expired tokens all resolve to `None` so a probing client cannot tell the
//! failure causes apart.

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sessions expire 10 minutes after issuance.
pub const SESSION_TTL_SECS: i64 = 10 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    issued_at: i64,
}

/// Signing key set for session tokens. At least one key; the first is the
/// active signing key, the rest are accepted for verification only.
#[derive(Debug, Clone)]
pub struct SessionKeys {
    keys: Vec<String>,
}

impl SessionKeys {
    pub fn new(keys: Vec<String>) -> Self {
        let keys: Vec<String> = keys.into_iter().filter(|k| !k.is_empty()).collect();
        assert!(!keys.is_empty(), "session key set must contain at least one key");
        Self { keys }
    }

    fn sign(key: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issue a token for the given user id, stamped with the current time.
    pub fn issue(&self, user_id: &str) -> String {
        self.issue_at(user_id, chrono::Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: &str, now: i64) -> String {
        let claims = Claims { user_id: user_id.to_string(), issued_at: now };
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).expect("claims serialize"));
        let sig = Self::sign(&self.keys[0], &payload);
        format!("{payload}.{sig}")
    }

    /// Resolve a token to its user id, or `None` if the token is missing
    /// structure, fails signature verification against every key in the set,
    /// or has expired. Never errors on malformed input.
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.resolve_at(token, chrono::Utc::now().timestamp())
    }

    /// Resolution against an explicit clock, so expiry is testable.
    pub fn resolve_at(&self, token: &str, now: i64) -> Option<String> {
        let (payload, sig_hex) = token.split_once('.')?;
        let sig = hex::decode(sig_hex).ok()?;
        // Constant-time check against each key in the set.
        let verified = self.keys.iter().any(|key| {
            let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
                return false;
            };
            mac.update(payload.as_bytes());
            mac.verify_slice(&sig).is_ok()
        });
        if !verified {
            return None;
        }
        let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: Claims = serde_json::from_slice(&raw).ok()?;
        if now < claims.issued_at + SESSION_TTL_SECS {
            Some(claims.user_id)
        } else {
            None
        }
    }
}
