//! Guard composition through the public API, as a route author would use it.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::get,
};
use chrono::Utc;
use clinic_gate::{
    api::v1::handlers::session::current_session,
    middleware::auth::access,
    services::auth::{AuthService, Guard, Role, RoleSet, SchemePolicy, Secret, TokenVerifier},
    state::AppState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn state() -> AppState {
    let secret = Secret::new(SECRET).unwrap();
    let auth = AuthService::new(TokenVerifier::new(&secret, 0), SchemePolicy::Any);
    AppState::new(Arc::new(auth), None)
}

fn mint(subject: &str, role: &str) -> String {
    let now = Utc::now().timestamp();
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": subject, "role": role, "iat": now, "exp": now + 600 }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn guarded(guard: Guard) -> Router {
    let state = state();
    let router = access::apply(Router::new().route("/op", get(current_session)), guard, &state);
    router.with_state(state)
}

async fn call(guard: Guard, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri("/op");
    if let Some(v) = authorization {
        req = req.header(header::AUTHORIZATION, v);
    }
    let res = guarded(guard)
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn new_tier_is_just_a_new_role_set() {
    const PATIENT_ONLY: RoleSet =
        RoleSet::new("patient", &[Role::Patient], "Access denied. Patients only.");
    let guard = Guard::Role(PATIENT_ONLY);

    let patient = format!("Bearer {}", mint("p1", "patient"));
    let admin = format!("Bearer {}", mint("a1", "admin"));

    let (status, body) = call(guard, Some(&patient)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "p1");

    let (status, body) = call(guard, Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Access denied. Patients only.");
}

#[tokio::test]
async fn scheme_word_is_not_checked_by_default() {
    let token = mint("u1", "doctor");
    let (status, body) = call(Guard::DOCTOR, Some(&format!("Token {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "doctor");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthenticated() {
    let now = Utc::now().timestamp();
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "u1", "role": "admin", "exp": now + 600 }),
        &EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();

    let (forged_status, forged_body) =
        call(Guard::ADMIN, Some(&format!("Bearer {forged}"))).await;
    let (missing_status, missing_body) = call(Guard::ADMIN, None).await;

    assert_eq!(forged_status, StatusCode::UNAUTHORIZED);
    assert_eq!((forged_status, forged_body), (missing_status, missing_body));
}

#[tokio::test]
async fn unknown_role_is_forbidden_not_unauthenticated() {
    let nurse = format!("Bearer {}", mint("n1", "nurse"));

    let (status, body) = call(Guard::Authenticated, Some(&nurse)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "n1");

    let (status, body) = call(Guard::DOCTOR, Some(&nurse)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Access denied. Doctors only.");
}

#[tokio::test]
async fn token_carrying_sub_and_id_is_accepted() {
    let now = Utc::now().timestamp();
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "u1", "id": "u1", "role": "doctor", "exp": now + 600 }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = call(Guard::DOCTOR, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "u1");
}
