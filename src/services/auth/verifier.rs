use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::Claims;
use crate::services::auth::claims::TokenPayload;

/// Shared HMAC secret used for every token this process accepts.
///
/// Loaded once from configuration; never printable via Debug.
#[derive(Clone)]
pub struct Secret(Arc<[u8]>);

impl Secret {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        Ok(Self(Arc::from(raw.into_bytes())))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Single, opaque verification failure.
///
/// Display never says which check failed. [`VerificationError::cause`] is for
/// server-side logs only.
#[derive(Debug, Error)]
#[error("credential verification failed")]
pub struct VerificationError {
    cause: Cause,
}

#[derive(Debug)]
enum Cause {
    EmptyCredential,
    Jwt(jsonwebtoken::errors::Error),
    Expired { exp: i64, now: i64 },
    NotYetValid { nbf: i64, now: i64 },
    MissingSubject,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::EmptyCredential => f.write_str("empty credential"),
            Cause::Jwt(e) => write!(f, "decode: {e}"),
            Cause::Expired { exp, now } => write!(f, "expired at {exp} (now {now})"),
            Cause::NotYetValid { nbf, now } => write!(f, "not valid before {nbf} (now {now})"),
            Cause::MissingSubject => f.write_str("no subject in sub or id"),
        }
    }
}

impl VerificationError {
    fn new(cause: Cause) -> Self {
        Self { cause }
    }

    /// Which check failed. Never sent to clients.
    pub fn cause(&self) -> impl fmt::Display + '_ {
        &self.cause
    }
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::new(Cause::Jwt(e))
    }
}

/// HMAC (HS256/384/512) bearer-token verifier.
///
/// `jsonwebtoken` checks the signature and decodes the payload. `exp` and
/// `nbf` are checked here against the caller-supplied `now` so the result
/// depends only on (token, secret, now).
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: i64,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &Secret, leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Time bounds are enforced against the explicit `now` in `verify`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key,
            validation,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    pub fn verify(&self, raw: &str, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
        if raw.is_empty() {
            return Err(VerificationError::new(Cause::EmptyCredential));
        }

        let payload =
            jsonwebtoken::decode::<TokenPayload>(raw, &self.decoding_key, &self.validation)?
                .claims;

        let now = now.timestamp();
        if let Some(exp) = payload.expires_at()
            && now >= exp.saturating_add(self.leeway_seconds)
        {
            return Err(VerificationError::new(Cause::Expired { exp, now }));
        }
        if let Some(nbf) = payload.not_before()
            && nbf > now.saturating_add(self.leeway_seconds)
        {
            return Err(VerificationError::new(Cause::NotYetValid { nbf, now }));
        }

        payload
            .into_claims()
            .ok_or_else(|| VerificationError::new(Cause::MissingSubject))
    }
}

/// One-shot verification with no leeway.
pub fn verify(raw: &str, secret: &Secret, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
    TokenVerifier::new(secret, 0).verify(raw, now)
}
