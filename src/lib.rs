//! Frontdesk — a Telegram assistant for a private consultation practice.
//!
//! Single Rust binary. Receives chat messages, forwards them with accumulated
//! conversation context to an LLM completion backend, filters the generated
//! reply, and sends it back to the originating chat.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod config;
pub mod dialog;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod sanitize;
pub mod session;
pub mod telegram;
