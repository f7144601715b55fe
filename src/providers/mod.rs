//! Completion backend abstraction layer.
//!
//! Defines the [`CompletionBackend`] trait and the shared chat message types
//! used by the dialog pipeline and the backend implementations.
//!
//! One backend is implemented: [`openai::OpenAiBackend`] — OpenAI
//! `/v1/chat/completions` API.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod openai;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System/conditioning message.
    System,
    /// Human user message.
    User,
    /// Assistant (LLM) message.
    Assistant,
}

impl Role {
    /// Wire name of the role, matching the chat completions API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of dialogue. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by completion backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP transport failure (unreachable host, timeout).
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("backend response parse error: {0}")]
    Parse(String),
    /// Upstream responded with an error status.
    #[error("backend returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

impl BackendError {
    /// Whether the turn can complete with a fallback reply in place of
    /// generated text.
    ///
    /// An error status from the upstream still pairs the turn with the
    /// fixed fallback; a transport or parse failure propagates so the
    /// adapter can apologise to the user instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `BackendError::Request` on transport failure,
/// `BackendError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(BackendError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"sk-[A-Za-z0-9_\-]{20,}", r"Bearer [A-Za-z0-9_\-.]{16,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core completion backend interface.
///
/// Implementations must be `Send + Sync` so the dialog pipeline can share
/// them across per-chat tasks.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request a completion for an ordered list of role-tagged messages
    /// (one conditioning entry followed by the bounded history).
    ///
    /// Returns `Ok(None)` when the upstream answered successfully but
    /// produced no usable text; callers substitute a fixed fallback.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on API, network, or parse failure.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, BackendError>;

    /// The model identifier this backend is instantiated for.
    fn model_id(&self) -> &str;
}
