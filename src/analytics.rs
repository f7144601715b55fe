//! Fire-and-forget analytics event sink.
//!
//! Records one row per turn (chat identity, display name, inbound text,
//! stage, timestamp) to a spreadsheet-style webhook. The sink is optional
//! and its failure never affects the turn's outcome: every emission runs in
//! its own task and errors are only logged.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Placeholder used when the transport supplies no display name.
pub const NO_DISPLAY_NAME: &str = "unknown";

/// One recorded turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnEvent {
    /// Chat identity the turn belongs to.
    pub chat_id: i64,
    /// Counterparty display name, or [`NO_DISPLAY_NAME`].
    pub display_name: String,
    /// Inbound message text.
    pub text: String,
    /// Stage the session was in when the turn started.
    pub stage: &'static str,
    /// When the turn was processed.
    pub timestamp: DateTime<Utc>,
}

/// Destination for turn events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Record one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered; callers treat
    /// this as diagnostic only.
    async fn record(&self, event: &TurnEvent) -> anyhow::Result<()>;
}

/// Sink posting JSON rows to a spreadsheet webhook.
#[derive(Debug, Clone)]
pub struct SheetSink {
    url: String,
    client: reqwest::Client,
}

impl SheetSink {
    /// Create a sink for the given webhook URL.
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EventSink for SheetSink {
    async fn record(&self, event: &TurnEvent) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Dispatch an event without awaiting it.
///
/// No-op when no sink is configured. Delivery failures are logged and
/// swallowed.
pub fn emit(sink: Option<&Arc<dyn EventSink>>, event: TurnEvent) {
    let Some(sink) = sink else {
        return;
    };
    let sink = Arc::clone(sink);
    tokio::spawn(async move {
        if let Err(e) = sink.record(&event).await {
            warn!(chat_id = event.chat_id, error = %e, "failed to record analytics event");
        }
    });
}
