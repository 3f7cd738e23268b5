use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use petalbot_agents::{ChatEngine, GeminiProvider, LlmProvider};
use petalbot_channels::{BotApi, Channel, TelegramChannel};
use petalbot_config::ConfigLoader;
use petalbot_db::ConversationStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "petalbot", version, about = "Persona-driven Telegram companion bot")]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConfigLoader::load().context("failed to load configuration")?;

    let store = Arc::new(ConversationStore::new(config.chat.history_max_len));

    let provider: Option<Arc<dyn LlmProvider>> = match config.llm.api_key.clone() {
        Some(api_key) => Some(Arc::new(GeminiProvider::new(api_key))),
        None => {
            warn!("GEMINI_API_KEY not set, chat functionality will be disabled");
            None
        }
    };

    let engine = Arc::new(ChatEngine::new(
        provider,
        store,
        config.llm.model.clone(),
        config.llm.max_output_tokens,
    ));
    info!(
        model = %config.llm.model,
        history_len = config.chat.history_max_len,
        available = engine.is_available(),
        "chat engine ready"
    );

    let api = Arc::new(BotApi::new(&config.telegram.bot_token));
    let mut channel = TelegramChannel::new(
        config.telegram.bot_token.clone(),
        engine,
        api,
        config.telegram.effects_enabled,
    );

    channel.connect().await.context("telegram connect failed")?;
    info!("petalbot running, press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    channel.disconnect().await.ok();
    info!("petalbot stopped");
    Ok(())
}
