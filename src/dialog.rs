//! Conversation orchestrator.
//!
//! One call per turn: records the inbound message, assembles the
//! conditioning instruction and history payload, invokes the completion
//! backend, records the reply, advances the stage, and sanitizes the text
//! for delivery. Analytics events are dispatched fire-and-forget.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::analytics::{self, EventSink, TurnEvent, NO_DISPLAY_NAME};
use crate::prompt::assemble_system_prompt;
use crate::providers::{BackendError, ChatMessage, CompletionBackend, Role};
use crate::sanitize::Sanitizer;
use crate::session::{ChatKey, Session, SessionStore};

/// Fixed reply substituted when the backend produces no usable text.
pub const FALLBACK_REPLY: &str = "Что-то пошло не так...";

/// Errors that escape a turn.
///
/// Only hard backend failures (transport, parse) surface here; the adapter
/// converts them into the user-visible apology. Everything else is recovered
/// inside the turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The completion backend call failed.
    #[error("completion backend failed: {0}")]
    Backend(#[from] BackendError),
}

/// Per-turn pipeline over the session store, backend, and sanitizer.
pub struct Dialog {
    store: Arc<SessionStore>,
    backend: Arc<dyn CompletionBackend>,
    sanitizer: Sanitizer,
    sink: Option<Arc<dyn EventSink>>,
}

impl Dialog {
    /// Wire the pipeline together. The store is shared, not owned: callers
    /// keep their own handle for status queries.
    pub fn new(
        store: Arc<SessionStore>,
        backend: Arc<dyn CompletionBackend>,
        sanitizer: Sanitizer,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Self {
        Self {
            store,
            backend,
            sanitizer,
            sink,
        }
    }

    /// Process one inbound message and return the sanitized reply.
    ///
    /// The session stays locked for the whole turn, so turns within one chat
    /// are strictly ordered while other chats proceed independently.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError`] when the backend call fails at the transport or
    /// parse level. An upstream error status or an empty completion is
    /// recovered with [`FALLBACK_REPLY`] and still completes the turn.
    pub async fn handle_turn(
        &self,
        chat: ChatKey,
        display_name: Option<&str>,
        incoming: &str,
    ) -> Result<String, TurnError> {
        let session = self.store.resolve(chat).await;
        let mut session = session.lock().await;

        note_client_markers(&mut session, incoming);
        session.record(Role::User, incoming);

        // Stage is read before this turn's reply is produced.
        let stage = session.stage();
        let system = assemble_system_prompt(stage, session.paid(), session.booking_count());

        let mut messages = Vec::with_capacity(session.history_len().saturating_add(1));
        messages.push(ChatMessage::new(Role::System, system));
        messages.extend(session.snapshot());

        let generated = match self.backend.complete(messages).await {
            Ok(text) => text,
            Err(e) if e.is_recoverable() => {
                warn!(chat_id = %chat, error = %e, "backend unavailable, using fallback reply");
                None
            }
            Err(e) => return Err(TurnError::Backend(e)),
        };
        let reply = generated.unwrap_or_else(|| FALLBACK_REPLY.to_owned());

        // The raw reply goes to history; the model sees its own unfiltered turns.
        session.record(Role::Assistant, reply.clone());
        session.advance_stage();

        let sanitized = self.sanitizer.apply(&reply);
        debug!(chat_id = %chat, stage = stage.as_str(), "turn completed");

        analytics::emit(
            self.sink.as_ref(),
            TurnEvent {
                chat_id: chat.0,
                display_name: display_name.unwrap_or(NO_DISPLAY_NAME).to_owned(),
                text: incoming.to_owned(),
                stage: stage.as_str(),
                timestamp: Utc::now(),
            },
        );

        Ok(sanitized)
    }
}

// ---------------------------------------------------------------------------
// Client status bookkeeping
// ---------------------------------------------------------------------------

/// Update payment/booking flags from surface markers in the inbound text.
///
/// String matching only; nothing here verifies a payment. The flags are
/// surfaced to the model as instruction text and never gate any branch
/// programmatically.
fn note_client_markers(session: &mut Session, incoming: &str) {
    let lower = incoming.to_lowercase();
    if mentions_payment(&lower) {
        session.mark_paid();
    }
    if session.paid() && mentions_slot_choice(&lower) {
        session.record_booking();
    }
}

/// Markers of a reported payment ("оплатила"/"перевела" are covered by
/// their stems).
fn mentions_payment(lower: &str) -> bool {
    lower.contains("оплатил")
        || lower.contains("оплата прошла")
        || lower.contains("перевёл")
        || lower.contains("перевел")
}

/// Markers of the client picking one of the offered consultation slots.
fn mentions_slot_choice(lower: &str) -> bool {
    lower.contains("10:00") || lower.contains("12:00") || lower.contains("14:00")
}
