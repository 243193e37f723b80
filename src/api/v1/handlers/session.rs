/*
 * Responsibility
 * - GET /me, /doctor/me, /admin/me
 * - guard が付与した AuthCtx をそのまま返す (どの tier を通過したかの確認用)
 */
use axum::Json;

use crate::api::v1::{dto::session::SessionResponse, extractors::AuthCtxExtractor};

pub async fn current_session(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<SessionResponse> {
    Json(SessionResponse::from(&ctx))
}
