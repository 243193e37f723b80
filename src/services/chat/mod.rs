pub mod client;
pub mod openai;
pub mod prompt;

pub use client::{ChatMessage, Completion, CompletionClient, CompletionError, CompletionRequest};
pub use openai::OpenAiClient;
