//! Environment-based configuration.
//!
//! All settings come from named environment variables with documented
//! placeholder defaults, loaded after `dotenvy` has read any `.env` file.
//! Loading never fails: absent optional values fall back to defaults and
//! unparsable numerics are logged and replaced.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use url::Url;

/// Placeholder bot token used when `TELEGRAM_BOT_TOKEN` is not set.
pub const DEFAULT_BOT_TOKEN: &str = "YOUR_TELEGRAM_BOT_TOKEN";

/// Placeholder API key used when `OPENAI_API_KEY` is not set.
pub const DEFAULT_OPENAI_API_KEY: &str = "YOUR_OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`).
    pub bot_token: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// Model identifier (`OPENAI_MODEL`, default `gpt-4`).
    pub openai_model: String,
    /// Webhook listening port (`PORT`, default 3000).
    pub port: u16,
    /// Public webhook URL (`WEBHOOK_URL`); long polling when unset.
    pub webhook_url: Option<Url>,
    /// Analytics webhook URL (`ANALYTICS_URL`); sink disabled when unset.
    pub analytics_url: Option<String>,
    /// Comma-separated banned topic words (`BANNED_TERMS`).
    pub banned_terms: Vec<String>,
    /// Timeout for completion backend calls (`REQUEST_TIMEOUT_SECS`, default 30).
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN").unwrap_or_else(|| {
            warn!("TELEGRAM_BOT_TOKEN not set, using placeholder");
            DEFAULT_BOT_TOKEN.to_owned()
        });
        let openai_api_key = lookup("OPENAI_API_KEY").unwrap_or_else(|| {
            warn!("OPENAI_API_KEY not set, using placeholder");
            DEFAULT_OPENAI_API_KEY.to_owned()
        });
        let openai_model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let port = parse_or_default(lookup("PORT"), DEFAULT_PORT, "PORT");
        let timeout_secs = parse_or_default(
            lookup("REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
            "REQUEST_TIMEOUT_SECS",
        );

        let webhook_url = lookup("WEBHOOK_URL").and_then(|raw| match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(raw = %raw, error = %e, "ignoring unparsable WEBHOOK_URL, falling back to polling");
                None
            }
        });

        let banned_terms = lookup("BANNED_TERMS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bot_token,
            openai_api_key,
            openai_model,
            port,
            webhook_url,
            analytics_url: lookup("ANALYTICS_URL"),
            banned_terms,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn parse_or_default<T: FromStr + Display>(raw: Option<String>, default: T, name: &str) -> T {
    match raw {
        None => default,
        Some(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(name, value = %value, default = %default, "unparsable numeric setting, using default");
                default
            }
        },
    }
}
