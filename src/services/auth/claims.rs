use std::fmt;

use serde::Deserialize;

/// Caller category carried in the `role` claim.
///
/// Any role string this service does not know decodes as `Unrecognized`: the
/// caller is still authenticated, but no built-in tier lists it. Access
/// decisions never compare roles by rank; each guard lists the roles it
/// accepts in a [`RoleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
    #[serde(other)]
    Unrecognized,
}

impl Role {
    /// Roles with a name of their own.
    pub const ALL: [Role; 3] = [Role::Patient, Role::Doctor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named allow-list for a role-gated tier.
///
/// Adding a tier means adding a value here, not changing the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    name: &'static str,
    roles: &'static [Role],
    denial_message: &'static str,
}

impl RoleSet {
    pub const DOCTOR_TIER: RoleSet = RoleSet::new(
        "doctor",
        &[Role::Doctor, Role::Admin],
        "Access denied. Doctors only.",
    );

    pub const ADMIN_TIER: RoleSet =
        RoleSet::new("admin", &[Role::Admin], "Access denied. Admin only.");

    pub const fn new(
        name: &'static str,
        roles: &'static [Role],
        denial_message: &'static str,
    ) -> Self {
        Self {
            name,
            roles,
            denial_message,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Message returned to the client with a 403.
    pub fn denial_message(&self) -> &'static str {
        self.denial_message
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Token payload as signed. The subject may be in `sub`, in `id`, or in both.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    id: Option<String>,
    role: Role,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

impl TokenPayload {
    pub(crate) fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    pub(crate) fn not_before(&self) -> Option<i64> {
        self.nbf
    }

    /// `sub` wins over `id`. `None` when the chosen subject is blank.
    pub(crate) fn into_claims(self) -> Option<Claims> {
        let subject = self.sub.or(self.id)?;
        if subject.trim().is_empty() {
            return None;
        }
        Some(Claims {
            subject,
            role: self.role,
            iat: self.iat,
            exp: self.exp,
            nbf: self.nbf,
        })
    }
}

/// Verified token payload.
///
/// Only [`TokenVerifier`](super::TokenVerifier) produces values of this type
/// (there is no public constructor), so holding a `Claims` means the token
/// it came from passed signature and time checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    subject: String,
    role: Role,
    iat: Option<i64>,
    exp: Option<i64>,
    nbf: Option<i64>,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.iat
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    pub fn not_before(&self) -> Option<i64> {
        self.nbf
    }
}
