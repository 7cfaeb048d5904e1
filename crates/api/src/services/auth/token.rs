//! Bearer token issue and parse.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tienda_core::UserId;

/// Claims carried by a bearer token.
///
/// The signature covers all three fields; changing any of them invalidates
/// the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id the token was issued for.
    pub sub: String,
    /// Issue time, seconds since the epoch.
    pub iat: i64,
    /// Expiry time, seconds since the epoch.
    pub exp: i64,
}

/// Why a token failed to parse.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not a decodable token at all.
    #[error("token is malformed")]
    Malformed,
    /// Structure is fine but the signature does not verify.
    #[error("token signature does not verify")]
    BadSignature,
    /// Signature is fine but the expiry has passed.
    #[error("token has expired")]
    Expired,
    /// Signing a fresh token failed.
    #[error("token creation failed")]
    Creation(#[source] jsonwebtoken::errors::Error),
}

/// Issues and parses HMAC-SHA256 signed bearer tokens.
///
/// Stateless by design: the codec holds only the derived keys and the TTL,
/// so one instance is shared read-only across every request and nothing is
/// ever persisted per token.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the signing secret and a TTL in hours.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60s leeway would let dead tokens linger
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a signed token for a subject.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Creation` if signing fails.
    pub fn issue(&self, subject: &UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Creation)
    }

    /// Parse and verify a token string.
    ///
    /// A successful parse proves signature and freshness only. Whether the
    /// subject still exists or is enabled is the caller's lookup.
    ///
    /// # Errors
    ///
    /// Returns `Malformed`, `BadSignature`, or `Expired` depending on which
    /// check failed.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }
}
