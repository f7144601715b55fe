//! Per-chat session state and the process-wide session store.
//!
//! Each chat identity owns one [`Session`]: a bounded conversation history,
//! the current [`Stage`], and payment/booking bookkeeping flags. The
//! [`SessionStore`] maps identities to sessions, creating them lazily on
//! first reference and never evicting.
//!
//! History is volatile: sessions live exactly as long as the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::providers::{ChatMessage, Role};

pub mod history;
pub mod stage;

pub use history::{History, HISTORY_CAPACITY};
pub use stage::Stage;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable key identifying one counterparty's chat thread.
///
/// Supplied by the transport (the Telegram chat id), never generated
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatKey(pub i64);

impl From<i64> for ChatKey {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Mutable per-chat state.
#[derive(Debug, Default)]
pub struct Session {
    history: History,
    stage: Stage,
    paid: bool,
    booking_count: u32,
}

impl Session {
    /// Create a fresh session: empty history, [`Stage::Initial`], no payment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message at the tail of the history window.
    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(role, content);
    }

    /// Ordered copy of the history for payload assembly.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.history.snapshot()
    }

    /// Number of retained history messages.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current conversational stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Advance the stage after a reply has been produced.
    pub fn advance_stage(&mut self) {
        self.stage.advance();
    }

    /// Whether the client has reported paying.
    pub fn paid(&self) -> bool {
        self.paid
    }

    /// Mark the client as having reported payment. Never unset.
    ///
    /// Bookkeeping only — payment is never verified here, the flag is merely
    /// surfaced to the model as instruction text.
    pub fn mark_paid(&mut self) {
        self.paid = true;
    }

    /// Number of booking confirmations observed in this conversation.
    pub fn booking_count(&self) -> u32 {
        self.booking_count
    }

    /// Count one more observed booking confirmation.
    pub fn record_booking(&mut self) {
        self.booking_count = self.booking_count.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Process-wide mapping from chat identity to session.
///
/// Created once at startup and injected into the turn handler, not a
/// global. The outer lock guards only the map lookup/insert; each returned
/// session carries its own mutex, so turns within one chat serialize while
/// different chats never contend.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ChatKey, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `chat`, creating it on first reference.
    ///
    /// Idempotent per identity: repeated calls return the same instance.
    /// Sessions are never removed.
    pub async fn resolve(&self, chat: ChatKey) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(
            sessions
                .entry(chat)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new()))),
        )
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
