//! Bearer-token inspection.
//!
//! The backend issues JWTs. The client never verifies signatures (the server
//! does), but it decodes the payload's `exp` claim so a stored token can be
//! refreshed with a fresh login before it stops being accepted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// A bearer token together with its decoded expiry claim, when present.
#[derive(Clone)]
pub struct BearerToken {
    raw: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let expires_at = expiry_claim(&raw);
        Self {
            raw: SecretString::from(raw),
            expires_at,
        }
    }

    /// When the token expires, if the payload carries a readable `exp`
    /// claim. Opaque tokens report `None` and are sent as-is; the server
    /// remains the authority on rejecting them.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// The raw token, for an `Authorization: Bearer` header.
    pub fn reveal(&self) -> &str {
        self.raw.expose_secret()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Decode the `exp` claim from a JWT payload without verification.
fn expiry_claim(raw: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let payload = raw.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

/// Unsigned JWT with the given claims object; good enough for decoding.
#[cfg(test)]
pub(crate) fn fake_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_expiry_claim() {
        let expiry = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let token = BearerToken::parse(fake_jwt(serde_json::json!({
            "sub": "user@example.net",
            "exp": expiry.timestamp(),
        })));

        assert_eq!(token.expires_at(), Some(expiry));
        assert!(!token.is_expired(expiry - chrono::Duration::minutes(1)));
        assert!(token.is_expired(expiry));
        assert!(token.is_expired(expiry + chrono::Duration::minutes(1)));
    }

    #[test]
    fn opaque_tokens_never_expire_client_side() {
        let token = BearerToken::parse("not-a-jwt");
        assert_eq!(token.expires_at(), None);
        assert!(!token.is_expired(Utc::now()));
    }

    #[test]
    fn garbled_payload_is_treated_as_opaque() {
        let token = BearerToken::parse("abc.!!!not-base64!!!.def");
        assert_eq!(token.expires_at(), None);
    }

    #[test]
    fn debug_does_not_leak_the_token() {
        let token = BearerToken::parse("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
