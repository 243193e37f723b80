/*
 * Responsibility
 * - chatbot の request/response DTO
 * - validate() で形式チェック
 */
use serde::{Deserialize, Serialize};

use crate::services::chat::ChatMessage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

impl ChatbotRequest {
    /// Only a missing or empty message is rejected; whitespace is forwarded as-is.
    pub fn validate(&self) -> Result<&str, &'static str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or("Message is required")
    }
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> ChatbotRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn message_is_required() {
        assert!(parse(json!({})).validate().is_err());
        assert!(parse(json!({ "message": "" })).validate().is_err());
        assert_eq!(parse(json!({ "message": "hi" })).validate(), Ok("hi"));
    }

    #[test]
    fn whitespace_message_is_forwarded() {
        assert_eq!(parse(json!({ "message": "  " })).validate(), Ok("  "));
    }

    #[test]
    fn long_history_is_accepted() {
        assert!(parse(json!({ "message": "hi" })).conversation_history.is_empty());

        let turns: Vec<_> = (0..200)
            .map(|i| json!({ "role": "user", "content": i.to_string() }))
            .collect();
        let req = parse(json!({ "message": "hi", "conversationHistory": turns }));
        assert_eq!(req.conversation_history.len(), 200);
        assert_eq!(req.validate(), Ok("hi"));
    }
}
