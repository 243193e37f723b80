/*
 * Responsibility
 * - POST /chatbot (guard なし)
 * - DTO validation → prompt 組み立て → completion service へ転送
 * - key 未設定 / upstream の失敗は 500 + 利用者向けの reply で返す (再試行はしない)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::chatbot::{ChatbotRequest, ChatbotResponse},
    error::AppError,
    services::chat::prompt,
    state::AppState,
};

pub const FALLBACK_REPLY: &str = "I couldn't generate a response. Please try again.";

pub async fn chatbot(
    State(state): State<AppState>,
    Json(req): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, AppError> {
    let message = req
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_MESSAGE", msg))?;

    let Some(client) = state.chat.as_ref() else {
        tracing::warn!("chatbot called but no completion API key is configured");
        return Err(AppError::Internal {
            message: "AI service not configured",
            reply: Some(
                "I'm sorry, the AI service is not configured yet. Please contact the administrator.",
            ),
        });
    };

    let request = prompt::build_request(&req.conversation_history, message);

    let completion = client.complete(request).await.map_err(|err| {
        tracing::error!(
            error = %err,
            backend = client.backend_name(),
            "completion request failed"
        );
        AppError::Internal {
            message: "Error communicating with AI service",
            reply: Some("I'm having trouble connecting right now. Please try again in a moment."),
        }
    })?;

    Ok(Json(ChatbotResponse {
        reply: completion
            .reply
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
        usage: completion.usage,
    }))
}
