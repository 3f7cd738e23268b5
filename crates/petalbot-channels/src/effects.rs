//! Raw Bot API helpers for the endpoints the client library path does not
//! cover well: animated reactions and message effects. Both are cosmetic,
//! so every failure is logged and swallowed.

use rand::seq::IndexedRandom;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

/// Reactions used when the bot is "thinking about" a poll. Must stay
/// within Telegram's allowed reaction emoji set.
pub const CONFUSED_REACTIONS: &[&str] = &["🤔", "🤨", "😐", "🥴", "🤷"];

/// Telegram message effect ids usable by bots in private chats.
const EFFECT_IDS: &[&str] = &["5104841245755180586", "5159385139981059251"];

/// Pick a random reaction from the confused set.
pub fn confused_reaction() -> &'static str {
    CONFUSED_REACTIONS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("🤔")
}

pub(crate) fn reaction_payload(chat_id: i64, message_id: i32, emoji: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "message_id": message_id,
        "reaction": [{ "type": "emoji", "emoji": emoji }],
        "is_big": true,
    })
}

pub(crate) fn effect_message_payload(
    chat_id: i64,
    reply_to: Option<i32>,
    text: &str,
    effect_id: &str,
) -> Value {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
        "message_effect_id": effect_id,
    });
    if let Some(message_id) = reply_to {
        payload["reply_parameters"] = json!({ "message_id": message_id });
    }
    payload
}

/// Thin client for direct Bot API calls.
pub struct BotApi {
    http: Client,
    base_url: String,
}

impl BotApi {
    pub fn new(bot_token: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Send an animated ("big") emoji reaction. Returns whether Telegram
    /// acknowledged it; never fails the caller.
    pub async fn animate_reaction(&self, chat_id: i64, message_id: i32, emoji: &str) -> bool {
        let payload = reaction_payload(chat_id, message_id, emoji);
        match self.call("setMessageReaction", &payload).await {
            Ok(ok) => ok,
            Err(detail) => {
                warn!(chat_id, message_id, %detail, "reaction failed");
                false
            }
        }
    }

    /// Send a text message with a random message effect, optionally as a
    /// reply. Returns `false` when the effect send did not go through so
    /// the caller can fall back to a plain send.
    pub async fn send_effect(&self, chat_id: i64, reply_to: Option<i32>, text: &str) -> bool {
        let Some(effect_id) = EFFECT_IDS.choose(&mut rand::rng()) else {
            return false;
        };
        let payload = effect_message_payload(chat_id, reply_to, text, effect_id);
        match self.call("sendMessage", &payload).await {
            Ok(ok) => ok,
            Err(detail) => {
                warn!(chat_id, %detail, "effect send failed");
                false
            }
        }
    }

    async fn call(&self, method: &str, payload: &Value) -> Result<bool, String> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        Ok(body["ok"].as_bool().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confused_reaction_comes_from_the_fixed_set() {
        for _ in 0..20 {
            assert!(CONFUSED_REACTIONS.contains(&confused_reaction()));
        }
    }

    #[test]
    fn reaction_payload_is_big_emoji_reaction() {
        let payload = reaction_payload(42, 7, "🤔");
        assert_eq!(payload["chat_id"], 42);
        assert_eq!(payload["message_id"], 7);
        assert_eq!(payload["reaction"][0]["type"], "emoji");
        assert_eq!(payload["reaction"][0]["emoji"], "🤔");
        assert_eq!(payload["is_big"], true);
    }

    #[test]
    fn effect_payload_includes_reply_only_when_present() {
        let payload = effect_message_payload(42, Some(7), "hi", "123");
        assert_eq!(payload["reply_parameters"]["message_id"], 7);
        assert_eq!(payload["message_effect_id"], "123");

        let payload = effect_message_payload(42, None, "hi", "123");
        assert!(payload.get("reply_parameters").is_none());
    }
}
