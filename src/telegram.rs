//! Telegram adapter: inbound dispatcher and outbound delivery.
//!
//! Wraps the dialog pipeline in a teloxide [`Dispatcher`]. The listener is
//! chosen by configuration: a webhook bound to the configured port when a
//! public URL is set, long polling otherwise.
//!
//! Ack semantics are fire-and-forget: the handler spawns the reply pipeline
//! and returns immediately, so Telegram gets its acknowledgment regardless
//! of the downstream outcome. Updates without a text payload are
//! acknowledged and ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dialog::Dialog;
use crate::session::ChatKey;

/// Fixed apology sent when a turn fails outright.
pub const APOLOGY_REPLY: &str = "Произошла ошибка при обработке сообщения.";

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    dialog: Arc<Dialog>,
}

/// Run the Telegram adapter. Blocks until the bot is stopped (Ctrl+C).
///
/// # Errors
///
/// Returns an error if the webhook listener cannot be registered.
pub async fn run_bot(config: &Config, dialog: Arc<Dialog>) -> anyhow::Result<()> {
    let bot = Bot::new(config.bot_token.as_str());
    let shared = SharedState { dialog };

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build();

    match config.webhook_url.clone() {
        Some(url) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            info!(%addr, %url, "telegram dispatcher starting (webhook)");
            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url))
                .await
                .map_err(|e| anyhow::anyhow!("failed to register telegram webhook: {e}"))?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook update listener error"),
                )
                .await;
        }
        None => {
            info!("telegram dispatcher starting (long polling)");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

/// Handle one incoming Telegram message.
///
/// Spawns the turn pipeline and returns, acknowledging the update. Failures
/// inside the spawned task become the fixed apology; delivery failures are
/// logged and never retried.
async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let chat = ChatKey::from(chat_id.0);

    let Some(text) = msg.text() else {
        debug!(chat_id = %chat, "non-text message ignored");
        return Ok(());
    };
    let text = text.to_owned();
    let display_name = msg.from.as_ref().map(|user| user.full_name());

    debug!(chat_id = %chat, "telegram message received");

    tokio::spawn(async move {
        let reply = match state
            .dialog
            .handle_turn(chat, display_name.as_deref(), &text)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "turn failed, sending apology");
                APOLOGY_REPLY.to_owned()
            }
        };

        // Telegram rejects empty message text; a fully filtered-out reply
        // means there is nothing to deliver.
        if reply.is_empty() {
            debug!(chat_id = %chat, "sanitized reply is empty, nothing to send");
            return;
        }

        if let Err(e) = bot.send_message(chat_id, reply).await {
            warn!(chat_id = %chat, error = %e, "failed to send telegram message");
        }
    });

    Ok(())
}
