/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - guard はここで route_layer として付与する (handler 側では判定しない)
 *   - guard なし: /health, /chatbot
 *   - RequireAuthenticated: /me
 *   - RequireRole(doctor tier): /doctor/me
 *   - RequireRole(admin tier): /admin/me
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{chatbot::chatbot, health::health, session::current_session};
use crate::middleware::auth::access;
use crate::services::auth::Guard;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/chatbot", post(chatbot));

    let authenticated = access::apply(
        Router::new().route("/me", get(current_session)),
        Guard::Authenticated,
        state,
    );

    let doctor = access::apply(
        Router::new().route("/doctor/me", get(current_session)),
        Guard::DOCTOR,
        state,
    );

    let admin = access::apply(
        Router::new().route("/admin/me", get(current_session)),
        Guard::ADMIN,
        state,
    );

    public.merge(authenticated).merge(doctor).merge(admin)
}
