//! Chat completion client interface used by the chatbot endpoint.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Upstream answer. `reply` is `None` when the service returned no choice.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub reply: Option<String>,
    pub usage: Option<serde_json::Value>,
}

/// Completion-layer errors (transport/status/decoding).
///
/// Kept separate from `AppError`; the handler decides how these surface.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion transport error: {0}")]
    Transport(String),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response error: {0}")]
    InvalidResponse(String),
}

/// A minimal completion interface.
///
/// Implementations are shared behind `Arc` in `AppState`.
#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;
}
