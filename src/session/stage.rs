//! Conversational stage policy.
//!
//! The stage conditions the greeting directive injected into the system
//! prompt for each turn. The transition is turn-driven: a session moves to
//! [`Stage::Active`] once its first reply has been produced, and never back.

use serde::{Deserialize, Serialize};

/// Coarse conversational phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// No reply has been produced yet; a single greeting is permitted.
    #[default]
    Initial,
    /// The conversation is underway; greetings are forbidden.
    Active,
}

impl Stage {
    /// Conditioning directive appended to the base instruction for this turn.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Initial => {
                "Это первое сообщение — если уместно, можешь поприветствовать клиента один раз."
            }
            Self::Active => "Не используй приветствие. Продолжай, как будто разговор уже идёт.",
        }
    }

    /// Move the stage forward after a reply has been produced.
    ///
    /// Idempotent once in [`Stage::Active`]; the transition is monotonic.
    pub fn advance(&mut self) {
        *self = Self::Active;
    }

    /// Stable lowercase name for logging and analytics rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Active => "active",
        }
    }
}
