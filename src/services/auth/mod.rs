pub mod claims;
pub mod credential;
pub mod factory;
pub mod guard;
pub mod verifier;

pub use claims::{Claims, Role, RoleSet};
pub use credential::{SchemePolicy, extract_credential};
pub use factory::build_auth_service;
pub use guard::{AuthService, Decision, Denial, Guard, check_role};
pub use verifier::{Secret, TokenVerifier, VerificationError, verify};
