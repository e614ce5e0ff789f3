//! HS256 signing and verification
//!
//! Validation runs with zero leeway so a token is rejected the moment its
//! `exp` passes — the configured lifetime is the only grace period. The
//! subject and email claims are required: a token missing either is
//! rejected before the caller ever sees it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims carried by a gateway bearer token.
///
/// `sub` is the identity provider's opaque user id; `email` is forwarded
/// from the provider's user record. `iat`/`exp` are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Stateless token issuer/verifier bound to one secret and one lifetime.
///
/// Cheap to clone-by-Arc and share across handlers; holds no mutable state.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    /// Build a signer from the configured secret and token lifetime.
    ///
    /// Config validation guarantees a non-empty secret and non-zero
    /// lifetime before this is called.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock-skew grace: expiry is exact per the token contract
        validation.leeway = 0;
        validation.required_spec_claims = ["exp", "sub"].iter().map(|s| s.to_string()).collect();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Sign a token for the given subject and email, expiring after the
    /// configured lifetime.
    pub fn issue(&self, subject_id: &str, email: &str) -> Result<String> {
        self.issue_at(subject_id, email, unix_now())
    }

    /// Sign with an explicit issue time (unix seconds). `issue` uses the
    /// system clock; this variant exists for deterministic timestamps.
    pub fn issue_at(&self, subject_id: &str, email: &str, now: u64) -> Result<String> {
        let claims = Claims {
            sub: subject_id.to_owned(),
            email: email.to_owned(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Sign(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// A structurally valid token with an empty subject or email claim is
    /// rejected here — the gateway never forwards such a payload upstream.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::Expired,
                _ => Error::Invalid(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() || claims.email.is_empty() {
            return Err(Error::Invalid("missing subject or email claim".into()));
        }

        Ok(claims)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
