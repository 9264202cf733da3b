use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::TokenDecodeError;

/// Short-lived bearer credential. Self-describing: the JWT payload carries `exp`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

/// Longer-lived credential used only to mint a new [`AccessToken`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenDecodeError> {
        decode_expiry(&self.0)
    }

    /// Expired as of `now`. A token whose expiry cannot be decoded counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired_at(&self.0, now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl RefreshToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Credentials issued together at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<serde_json::Value>,
}

/// Decode the `exp` claim of a JWT without verifying its signature.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, TokenDecodeError> {
    let mut parts = token.split('.');
    let _header = parts.next();
    let payload = parts
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or(TokenDecodeError::MissingPayload)?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenDecodeError::Encoding)?;
    let claims: Claims = serde_json::from_slice(&decoded).map_err(|_| TokenDecodeError::Json)?;
    let secs = claims
        .exp
        .as_ref()
        .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
        .ok_or(TokenDecodeError::MissingExpiry)?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(TokenDecodeError::MissingExpiry)
}

/// Whether `token` is expired as of `now`; undecodable tokens are treated as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_expiry(token) {
        Ok(expires_at) => expires_at <= now,
        Err(err) => {
            tracing::debug!(error = %err, "treating undecodable access token as expired");
            true
        }
    }
}
