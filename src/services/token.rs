//! Signed, time-bounded session tokens (HS256 JWT).
//!
//! A token is valid for every instant strictly before its `exp` claim. Any
//! verification failure (malformed, bad signature, wrong algorithm, expired)
//! collapses to `None` so callers cannot tell the cases apart.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    id: i32,
    username: String,
    /// Issued at (Unix seconds)
    iat: i64,
    /// Expiry (Unix seconds)
    exp: i64,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub id: i32,
    pub username: String,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    pub fn issue_at(&self, admin_id: i32, username: &str, now: i64) -> Result<String> {
        let claims = Claims {
            id: admin_id,
            username: username.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {e}"))
    }

    #[must_use]
    pub fn verify_at(&self, token: &str, now: i64) -> Option<TokenIdentity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).ok()?;

        if now >= data.claims.exp {
            return None;
        }

        Some(TokenIdentity {
            id: data.claims.id,
            username: data.claims.username,
        })
    }
}
