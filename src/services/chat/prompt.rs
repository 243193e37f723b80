use crate::services::chat::{ChatMessage, CompletionRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful medical appointment assistant for a healthcare platform.
You can help users with:
- Information about booking doctor appointments
- Information about lab tests and lab techniques
- General health-related questions
- Navigation help for the website
- Appointment scheduling guidance

Be friendly, professional, and concise. If users have urgent medical concerns,
always advise them to contact emergency services or visit a hospital.
Do not provide specific medical diagnoses or treatment recommendations.";

pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.7;

/// System prompt, then prior turns in order, then the new user message.
pub fn build_request(history: &[ChatMessage], message: &str) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::new("user", message));

    CompletionRequest {
        messages,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}
