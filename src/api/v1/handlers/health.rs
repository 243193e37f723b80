/*
 * Responsibility
 * - GET /health (疎通用, guard なし)
 * - 未定義パスの fallback
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::error::AppError;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Fallback for unknown paths, in the common JSON error shape.
pub async fn not_found() -> AppError {
    AppError::not_found("route")
}
