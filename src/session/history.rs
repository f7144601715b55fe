//! Bounded conversation history.
//!
//! Sliding window of role-tagged messages, oldest first. Eviction happens
//! immediately after every append so the window never exceeds capacity.

use std::collections::VecDeque;

use crate::providers::{ChatMessage, Role};

/// Maximum number of retained messages per chat, covering both roles.
pub const HISTORY_CAPACITY: usize = 10;

/// Ordered, bounded sequence of messages owned by a session.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<ChatMessage>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Append a message to the tail. Evicts from the head while over capacity.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push_back(ChatMessage::new(role, content));
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Ordered copy of the current history for payload assembly.
    ///
    /// Callers never mutate history directly, only through [`push`](Self::push).
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no messages have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
