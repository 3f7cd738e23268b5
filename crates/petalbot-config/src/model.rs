/// Full application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token (`BOT_TOKEN`). Required.
    pub bot_token: String,
    /// Whether replies may use Telegram message effects
    /// (`EFFECTS_ENABLED`). Default: on.
    pub effects_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gemini API key (`GEMINI_API_KEY`). Optional: when absent the chat
    /// engine runs permanently in fallback-only mode instead of failing
    /// startup.
    pub api_key: Option<String>,
    /// Model name (`AI_MODEL`). Default: `gemini-2.0-flash`.
    pub model: String,
    /// Max output tokens per reply (`AI_MAX_OUTPUT_TOKENS`). Default: 1024.
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Turns retained per user (`CHAT_LENGTH`). Default: 20.
    pub history_max_len: usize,
}
