//! Route guards as tower layers.
//!
//! Each layer turns a handler service into a guarded handler service of the
//! same shape:
//! - `RequireAuthenticatedLayer`: extract + verify, attach `AuthCtx`, call inner.
//! - `RoleCheckLayer`: read the attached `AuthCtx`, check the tier's allow-list.
//! - `RequireRoleLayer`: exactly `RequireAuthenticated(RoleCheck(inner))`.
//!
//! Denials become responses here and never reach the inner service.
//!
//! These are `Layer`/`Service` pairs rather than `middleware::from_fn_with_state`
//! closures so that `RequireRoleLayer` is literally the two other layers nested,
//! and each layer can be tested against a bare `service_fn`.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    Router,
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tower::{Layer, Service};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthService, Denial, Guard, RoleSet, check_role};
use crate::state::AppState;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

fn deny<E: Send + 'static>(denial: Denial) -> BoxFuture<Result<Response, E>> {
    let res = AppError::from(denial).into_response();
    Box::pin(async move { Ok(res) })
}

/// Apply `guard` to every route registered on `router` so far.
///
/// ```ignore
/// let admin = Router::new().route("/admin/me", get(current_session));
/// let admin = middleware::auth::access::apply(admin, Guard::ADMIN, &state);
/// ```
pub fn apply(router: Router<AppState>, guard: Guard, state: &AppState) -> Router<AppState> {
    match guard {
        Guard::Authenticated => {
            router.route_layer(RequireAuthenticatedLayer::new(state.auth.clone()))
        }
        Guard::Role(allowed) => {
            router.route_layer(RequireRoleLayer::new(state.auth.clone(), allowed))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequireAuthenticatedLayer {
    auth: Arc<AuthService>,
}

impl RequireAuthenticatedLayer {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S> Layer<S> for RequireAuthenticatedLayer {
    type Service = RequireAuthenticated<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAuthenticated {
            inner,
            auth: self.auth.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequireAuthenticated<S> {
    inner: S,
    auth: Arc<AuthService>,
}

impl<S> Service<Request> for RequireAuthenticated<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match self.auth.authenticate(authorization, Utc::now()) {
            Ok(claims) => {
                // guard → extractor への受け渡し
                req.extensions_mut().insert(AuthCtx::new(claims));
                Box::pin(self.inner.call(req))
            }
            Err(denial) => deny(denial),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoleCheckLayer {
    allowed: RoleSet,
}

impl RoleCheckLayer {
    pub fn new(allowed: RoleSet) -> Self {
        Self { allowed }
    }
}

impl<S> Layer<S> for RoleCheckLayer {
    type Service = RoleCheck<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleCheck {
            inner,
            allowed: self.allowed,
        }
    }
}

/// Only meaningful inside `RequireAuthenticated`; on its own every request
/// is denied as unauthenticated because no `AuthCtx` is attached.
#[derive(Debug, Clone)]
pub struct RoleCheck<S> {
    inner: S,
    allowed: RoleSet,
}

impl<S> Service<Request> for RoleCheck<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let verdict = match req.extensions().get::<AuthCtx>() {
            Some(ctx) => check_role(&self.allowed, ctx.claims()),
            None => Err(Denial::Unauthenticated),
        };

        match verdict {
            Ok(()) => Box::pin(self.inner.call(req)),
            Err(denial) => deny(denial),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequireRoleLayer {
    authenticated: RequireAuthenticatedLayer,
    role_check: RoleCheckLayer,
}

impl RequireRoleLayer {
    pub fn new(auth: Arc<AuthService>, allowed: RoleSet) -> Self {
        Self {
            authenticated: RequireAuthenticatedLayer::new(auth),
            role_check: RoleCheckLayer::new(allowed),
        }
    }
}

impl<S> Layer<S> for RequireRoleLayer {
    type Service = RequireAuthenticated<RoleCheck<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        self.authenticated.layer(self.role_check.layer(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::verifier::test_support::{SECRET, expired_token, token};
    use crate::services::auth::{Decision, Role, SchemePolicy, Secret, TokenVerifier};
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderValue, StatusCode};
    use std::convert::Infallible;
    use tower::{ServiceExt, service_fn};

    fn auth() -> Arc<AuthService> {
        let secret = Secret::new(SECRET).unwrap();
        Arc::new(AuthService::new(
            TokenVerifier::new(&secret, 0),
            SchemePolicy::Any,
        ))
    }

    /// Echoes the attached subject so tests can see what reached the handler.
    async fn echo(req: Request) -> Result<Response, Infallible> {
        let subject = req
            .extensions()
            .get::<AuthCtx>()
            .map(|c| c.subject().to_string())
            .unwrap_or_default();
        Ok((StatusCode::OK, subject).into_response())
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(v) = authorization {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn outcome<S>(svc: S, authorization: Option<&str>) -> (StatusCode, String)
    where
        S: Service<Request, Response = Response, Error = Infallible>,
    {
        let res = svc.oneshot(request(authorization)).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn headers() -> Vec<Option<String>> {
        let mut headers = vec![
            None,
            Some("Bearer".to_string()),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {}", expired_token("u1", "admin"))),
        ];
        for role in Role::ALL {
            headers.push(Some(format!("Bearer {}", token("u1", role.as_str()))));
        }
        headers.push(Some(format!("Bearer {}", token("u1", "nurse"))));
        headers
    }

    #[tokio::test]
    async fn authenticated_layer_attaches_context() {
        let svc = RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo));
        let header = format!("Bearer {}", token("u1", "patient"));
        assert_eq!(
            outcome(svc, Some(&header)).await,
            (StatusCode::OK, "u1".to_string())
        );
    }

    #[tokio::test]
    async fn missing_and_invalid_tokens_get_identical_responses() {
        let missing = outcome(
            RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo)),
            None,
        )
        .await;
        let invalid = outcome(
            RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo)),
            Some("Bearer not.a.jwt"),
        )
        .await;
        assert_eq!(missing.0, StatusCode::UNAUTHORIZED);
        assert_eq!(missing, invalid);
    }

    #[tokio::test]
    async fn non_utf8_header_is_treated_as_missing() {
        let mut req = request(None);
        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );

        let svc = RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo));
        let res = svc.oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let non_utf8 = (status, String::from_utf8(body.to_vec()).unwrap());

        let missing = outcome(
            RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo)),
            None,
        )
        .await;
        assert_eq!(non_utf8.0, StatusCode::UNAUTHORIZED);
        assert_eq!(non_utf8, missing);
    }

    #[tokio::test]
    async fn unrecognized_role_passes_authentication_only() {
        let header = format!("Bearer {}", token("u1", "nurse"));

        let svc = RequireAuthenticatedLayer::new(auth()).layer(service_fn(echo));
        assert_eq!(
            outcome(svc, Some(&header)).await,
            (StatusCode::OK, "u1".to_string())
        );
        for allowed in [RoleSet::DOCTOR_TIER, RoleSet::ADMIN_TIER] {
            let svc = RequireRoleLayer::new(auth(), allowed).layer(service_fn(echo));
            let (status, _) = outcome(svc, Some(&header)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{allowed:?}");
        }
    }

    #[tokio::test]
    async fn role_layer_matches_manual_composition() {
        for allowed in [RoleSet::DOCTOR_TIER, RoleSet::ADMIN_TIER] {
            for header in headers() {
                let composed = RequireRoleLayer::new(auth(), allowed).layer(service_fn(echo));
                let manual = RequireAuthenticatedLayer::new(auth())
                    .layer(RoleCheckLayer::new(allowed).layer(service_fn(echo)));
                assert_eq!(
                    outcome(composed, header.as_deref()).await,
                    outcome(manual, header.as_deref()).await,
                    "{allowed:?} {header:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn role_layer_agrees_with_pure_guard() {
        let auth = auth();
        for allowed in [RoleSet::DOCTOR_TIER, RoleSet::ADMIN_TIER] {
            for header in headers() {
                let svc = RequireRoleLayer::new(auth.clone(), allowed).layer(service_fn(echo));
                let (status, _) = outcome(svc, header.as_deref()).await;
                let decision = Guard::Role(allowed).evaluate(&auth, header.as_deref(), Utc::now());
                let expected = match decision {
                    Decision::Proceed(_) => StatusCode::OK,
                    Decision::Deny(Denial::Unauthenticated) => StatusCode::UNAUTHORIZED,
                    Decision::Deny(Denial::Forbidden(_)) => StatusCode::FORBIDDEN,
                };
                assert_eq!(status, expected, "{allowed:?} {header:?}");
            }
        }
    }

    #[tokio::test]
    async fn role_check_without_authentication_denies() {
        let svc = RoleCheckLayer::new(RoleSet::DOCTOR_TIER).layer(service_fn(echo));
        let header = format!("Bearer {}", token("u1", "doctor"));
        let (status, _) = outcome(svc, Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forbidden_body_names_the_tier() {
        let svc = RequireRoleLayer::new(auth(), RoleSet::ADMIN_TIER).layer(service_fn(echo));
        let header = format!("Bearer {}", token("u1", "doctor"));
        let (status, body) = outcome(svc, Some(&header)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Access denied. Admin only."), "{body}");
    }
}
