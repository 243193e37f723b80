//! Authorization decisions, independent of HTTP.
//!
//! Per request: extract credential → verify → (role check) → proceed or deny.
//! Every failure resolves to one of two denials here; nothing else escapes.

use chrono::{DateTime, Utc};

use crate::services::auth::{
    Claims, RoleSet, SchemePolicy, TokenVerifier, extract_credential,
};

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No credential, or a credential that failed verification. Callers
    /// cannot tell which.
    Unauthenticated,
    /// Authenticated, but the role is not in the tier's allow-list.
    Forbidden(RoleSet),
}

/// Terminal outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed(Claims),
    Deny(Denial),
}

/// Process-wide authentication service: one verifier, one extraction policy.
#[derive(Debug, Clone)]
pub struct AuthService {
    verifier: TokenVerifier,
    scheme_policy: SchemePolicy,
}

impl AuthService {
    pub fn new(verifier: TokenVerifier, scheme_policy: SchemePolicy) -> Self {
        Self {
            verifier,
            scheme_policy,
        }
    }

    pub fn scheme_policy(&self) -> SchemePolicy {
        self.scheme_policy
    }

    /// Extraction + verification. The only place a token is verified.
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, Denial> {
        let Some(credential) = extract_credential(authorization, self.scheme_policy) else {
            tracing::debug!("no bearer credential supplied");
            return Err(Denial::Unauthenticated);
        };

        match self.verifier.verify(credential, now) {
            Ok(claims) => Ok(claims),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    cause = %err.cause(),
                    "access token verification failed"
                );
                Err(Denial::Unauthenticated)
            }
        }
    }
}

/// Role membership check on already-verified claims.
pub fn check_role(allowed: &RoleSet, claims: &Claims) -> Result<(), Denial> {
    if allowed.allows(claims.role()) {
        Ok(())
    } else {
        tracing::info!(
            subject = %claims.subject(),
            role = %claims.role(),
            tier = allowed.name(),
            "role not permitted for tier"
        );
        Err(Denial::Forbidden(*allowed))
    }
}

/// Guard attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Authenticated,
    Role(RoleSet),
}

impl Guard {
    pub const DOCTOR: Guard = Guard::Role(RoleSet::DOCTOR_TIER);
    pub const ADMIN: Guard = Guard::Role(RoleSet::ADMIN_TIER);

    /// `Role(s)` is `Authenticated` followed by `check_role(s)`.
    pub fn evaluate(
        &self,
        auth: &AuthService,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Decision {
        let claims = match auth.authenticate(authorization, now) {
            Ok(claims) => claims,
            Err(denial) => return Decision::Deny(denial),
        };

        match self {
            Guard::Authenticated => Decision::Proceed(claims),
            Guard::Role(allowed) => match check_role(allowed, &claims) {
                Ok(()) => Decision::Proceed(claims),
                Err(denial) => Decision::Deny(denial),
            },
        }
    }
}
