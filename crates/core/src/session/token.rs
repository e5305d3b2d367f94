//! Access-token decoding.
//!
//! Access tokens are HS256-signed JWTs minted by the backend. The dashboard
//! never holds the signing secret, so the signature is not checked here;
//! the backend re-verifies it on every request. What the client does check
//! is structure: three base64url segments, a JSON payload with a numeric
//! `exp` claim, and a `data` object describing the signed-in user.
//!
//! Expiry is deliberately *not* validated during decoding. The
//! [`SessionManager`](super::SessionManager) compares `exp` against its own
//! clock so that "expired" and "malformed" stay distinguishable.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// The user embedded in the token's `data` claim.
///
/// The well-known identity fields are typed; anything else the backend
/// puts in the payload is preserved in [`extra`](Self::extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Claims carried by a dashboard access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration time (UTC Unix timestamp, seconds).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp, seconds), when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// The signed-in user.
    pub data: SessionUser,
}

impl TokenClaims {
    /// Whether the token is expired at `now`. A token expiring exactly at
    /// `now` counts as expired.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Reasons a raw token could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token is empty")]
    Empty,

    #[error("Malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Decode a raw token into its [`TokenClaims`] without verifying the
/// signature or the expiry.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(token_data.claims)
}
