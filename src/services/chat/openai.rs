use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::CompletionConfig;
use crate::services::chat::client::{
    ChatMessage, Completion, CompletionClient, CompletionError, CompletionRequest,
};

/// OpenAI-compatible `/chat/completions` client.
///
/// Stateless: every call is an independent POST. No retries.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the API key
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>, CompletionError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let endpoint = config
            .base_url
            .join("chat/completions")
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        Ok(Some(Self {
            http,
            endpoint,
            api_key,
            model: config.model.clone(),
        }))
    }
}

fn into_completion(resp: ChatCompletionResponse) -> Completion {
    let reply = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|s| !s.is_empty());

    Completion {
        reply,
        usage: resp.usage,
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn backend_name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        Ok(into_completion(parsed))
    }
}
