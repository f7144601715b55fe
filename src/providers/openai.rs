//! OpenAI backend implementation using the `/v1/chat/completions` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{check_http_response, BackendError, ChatMessage, CompletionBackend};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/chat/completions";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAiMessage>,
}

/// A message in OpenAI chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`system`, `user`, `assistant`).
    pub role: &'static str,
    /// Plain text content.
    pub content: String,
}

/// OpenAI chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

/// A response choice from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
}

/// Assistant message from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an OpenAI API request from role-tagged messages.
#[doc(hidden)]
pub fn build_request(model: &str, messages: &[ChatMessage]) -> OpenAiRequest {
    OpenAiRequest {
        model: model.to_owned(),
        messages: messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str(),
                content: m.content.clone(),
            })
            .collect(),
    }
}

/// Parse an OpenAI API response body into optional reply text.
///
/// A response with no choices, or a first choice without non-blank content,
/// parses to `None` — the caller substitutes its fallback reply.
///
/// # Errors
///
/// Returns `BackendError::Parse` if the body is not valid response JSON.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<Option<String>, BackendError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;

    Ok(resp
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// OpenAI chat completions API backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend with a bounded request timeout.
    ///
    /// A hung upstream call fails the turn after `timeout` instead of
    /// stalling that chat indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(model: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build http client: {e}"))?;
        Ok(Self {
            model,
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, BackendError> {
        let api_request = build_request(&self.model, &messages);

        let response = self
            .client
            .post(OPENAI_API_BASE)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
