/// Factory: build `AuthService` from application `Config`.
///
/// Called once at startup; the result is shared through `AppState`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthService, TokenVerifier};

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let verifier = TokenVerifier::new(&config.jwt_secret, config.access_token_leeway_seconds);

    let auth = AuthService::new(verifier, config.scheme_policy);

    tracing::info!(
        scheme_policy = ?auth.scheme_policy(),
        leeway_seconds = config.access_token_leeway_seconds,
        "access token verifier ready"
    );

    Arc::new(auth)
}
