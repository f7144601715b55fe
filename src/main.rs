//! Frontdesk binary entry point.
//!
//! Loads configuration from the environment, initialises logging, wires the
//! session store, completion backend, sanitizer, and analytics sink into the
//! dialog pipeline, and runs the Telegram adapter.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use frontdesk::analytics::{EventSink, SheetSink};
use frontdesk::config::Config;
use frontdesk::dialog::Dialog;
use frontdesk::logging;
use frontdesk::providers::openai::OpenAiBackend;
use frontdesk::providers::CompletionBackend;
use frontdesk::sanitize::Sanitizer;
use frontdesk::session::SessionStore;
use frontdesk::telegram;

#[derive(Debug, Parser)]
#[command(name = "frontdesk", version, about = "Telegram assistant for a consultation practice")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bot (default when no subcommand is given).
    Serve {
        /// Override the webhook listening port from the environment.
        #[arg(long)]
        port: Option<u16>,

        /// Directory for rotated JSON log files.
        #[arg(long, default_value = "logs")]
        logs_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (port_override, logs_dir) = match cli.command {
        Some(Command::Serve { port, logs_dir }) => (port, logs_dir),
        None => (None, PathBuf::from("logs")),
    };

    let _guard = logging::init(&logs_dir)?;

    let mut config = Config::from_env();
    if let Some(port) = port_override {
        config.port = port;
    }

    info!(
        model = %config.openai_model,
        port = config.port,
        webhook = config.webhook_url.is_some(),
        "frontdesk starting"
    );

    let store = Arc::new(SessionStore::new());
    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiBackend::new(
        config.openai_model.clone(),
        config.openai_api_key.clone(),
        config.request_timeout,
    )?);
    let sanitizer = Sanitizer::new(&config.banned_terms);
    let sink: Option<Arc<dyn EventSink>> = config
        .analytics_url
        .clone()
        .map(|url| Arc::new(SheetSink::new(url)) as Arc<dyn EventSink>);

    let dialog = Arc::new(Dialog::new(store, backend, sanitizer, sink));

    telegram::run_bot(&config, dialog).await
}
