use std::env;

use petalbot_common::{Error, Result};
use tracing::warn;

use crate::model::{AppConfig, ChatConfig, LlmConfig, TelegramConfig};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment, applying any
    /// `.env` file first. Fails only when the bot token is missing; a
    /// missing Gemini key degrades the engine, it does not stop startup.
    pub fn load() -> Result<AppConfig> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
        let bot_token = get("BOT_TOKEN")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config("BOT_TOKEN is not set".to_string()))?;

        let api_key = get("GEMINI_API_KEY")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let model = get("AI_MODEL")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "gemini-2.0-flash".to_string());

        let max_output_tokens = parse_or_default(&get, "AI_MAX_OUTPUT_TOKENS", 1024);
        let history_max_len = parse_or_default(&get, "CHAT_LENGTH", 20);

        let effects_enabled = get("EFFECTS_ENABLED")
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(true);

        Ok(AppConfig {
            telegram: TelegramConfig {
                bot_token,
                effects_enabled,
            },
            llm: LlmConfig {
                api_key,
                model,
                max_output_tokens,
            },
            chat: ChatConfig { history_max_len },
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match get(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable config value, using default");
            default
        }),
        None => default,
    }
}
