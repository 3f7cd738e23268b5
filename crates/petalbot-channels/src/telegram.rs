use std::sync::Arc;

use async_trait::async_trait;
use petalbot_agents::{ChatEngine, ChatRequest};
use petalbot_common::{RequestContext, Result};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, PhotoSize, ReplyParameters};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::effects::BotApi;
use crate::polls;
use crate::traits::{Channel, ChannelStatus};

/// Confirmation sent after `/reset` clears the requester's history.
const RESET_CONFIRMATION: &str = "Theek hai, sab bhool gayi 🙃";

pub struct TelegramChannel {
    bot_token: String,
    display: String,
    status: ChannelStatus,
    engine: Arc<ChatEngine>,
    api: Arc<BotApi>,
    effects_enabled: bool,
    bot: Option<Bot>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl TelegramChannel {
    pub fn new(
        bot_token: String,
        engine: Arc<ChatEngine>,
        api: Arc<BotApi>,
        effects_enabled: bool,
    ) -> Self {
        Self {
            bot_token,
            display: "Telegram".to_string(),
            status: ChannelStatus::Disconnected,
            engine,
            api,
            effects_enabled,
            bot: None,
            shutdown_tx: None,
        }
    }
}

/// Builds the per-request context from a message's sender.
/// Returns None if the message should be ignored (e.g. from a bot or
/// missing sender).
fn request_context(msg: &teloxide::types::Message) -> Option<RequestContext> {
    // Ignore messages without a sender (e.g. channel posts)
    let user = msg.from.as_ref()?;

    // Telegram "Group Anonymous Bot" ID used for anonymous admins.
    const ANONYMOUS_BOT_ID: u64 = 1087968824;

    // Ignore bots to prevent loops, but allow anonymous admins.
    if user.is_bot && user.id.0 != ANONYMOUS_BOT_ID {
        return None;
    }

    Some(RequestContext::new(
        user.id.0 as i64,
        msg.chat.id.0,
        user.first_name.clone(),
    ))
}

/// Fetch the largest photo rendition as raw bytes. Failures are logged and
/// treated as "no image" so the text portion can still be answered.
async fn download_photo(bot: &Bot, photo: &PhotoSize) -> Option<Vec<u8>> {
    let file = match bot.get_file(photo.file.id.clone()).await {
        Ok(file) => file,
        Err(e) => {
            warn!(error = %e, "failed to look up photo file");
            return None;
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = bot.download_file(&file.path, &mut buf).await {
        warn!(error = %e, "failed to download photo");
        return None;
    }
    Some(buf)
}

/// Deliver a reply, preferring a message effect when enabled and falling
/// back to a plain reply.
async fn deliver_reply(
    bot: &Bot,
    api: &BotApi,
    effects_enabled: bool,
    msg: &teloxide::types::Message,
    text: &str,
) {
    if effects_enabled && api.send_effect(msg.chat.id.0, Some(msg.id.0), text).await {
        return;
    }

    let send = bot
        .send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await;
    if let Err(e) = send {
        error!(chat_id = msg.chat.id.0, error = %e, "failed to send reply");
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn channel_type(&self) -> &str {
        "telegram"
    }

    fn display_name(&self) -> &str {
        &self.display
    }

    async fn connect(&mut self) -> Result<()> {
        let bot = Bot::new(&self.bot_token);
        self.bot = Some(bot.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);

        let engine = Arc::clone(&self.engine);
        let api = Arc::clone(&self.api);
        let effects_enabled = self.effects_enabled;

        tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(
                move |bot: Bot, msg: teloxide::types::Message| {
                    let engine = Arc::clone(&engine);
                    let api = Arc::clone(&api);
                    async move {
                        let Some(ctx) = request_context(&msg) else {
                            return respond(());
                        };

                        let text = msg
                            .text()
                            .or_else(|| msg.caption())
                            .unwrap_or_default()
                            .to_string();
                        let photo = msg.photo().and_then(|sizes| sizes.last()).cloned();
                        if text.is_empty() && photo.is_none() {
                            return respond(());
                        }

                        info!(
                            user_id = ctx.user_id,
                            user = %ctx.display_name,
                            chat_id = ctx.chat_id,
                            has_photo = photo.is_some(),
                            text_len = text.len(),
                            "telegram message received"
                        );

                        if text.trim() == "/reset" {
                            engine.clear_history(ctx.user_id);
                            deliver_reply(&bot, &api, effects_enabled, &msg, RESET_CONFIRMATION)
                                .await;
                            return respond(());
                        }

                        let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

                        // Poll analysis takes precedence over normal chat.
                        if let Some(reply) =
                            polls::try_analyze(&api, &engine, &ctx, &msg, &text).await
                        {
                            deliver_reply(&bot, &api, effects_enabled, &msg, &reply).await;
                            return respond(());
                        }

                        let image = match &photo {
                            Some(photo) => download_photo(&bot, photo).await,
                            None => None,
                        };

                        let reply = engine
                            .reply(
                                &ctx,
                                ChatRequest {
                                    user_id: ctx.user_id,
                                    text: &text,
                                    image: image.as_deref(),
                                },
                            )
                            .await;
                        deliver_reply(&bot, &api, effects_enabled, &msg, &reply).await;

                        respond(())
                    }
                },
            );

            let mut dispatcher = Dispatcher::builder(bot, handler)
                .default_handler(|upd| async move {
                    tracing::trace!("unhandled update: {:?}", upd.kind);
                })
                .build();

            let token = dispatcher.shutdown_token();
            tokio::spawn(async move {
                let mut rx = shutdown_rx;
                while rx.changed().await.is_ok() {
                    if *rx.borrow() {
                        if let Err(e) = token.shutdown() {
                            warn!("telegram shutdown token error: {e:?}");
                        }
                        break;
                    }
                }
            });

            info!("telegram bot polling started");
            dispatcher.dispatch().await;
            info!("telegram bot polling stopped");
        });

        self.status = ChannelStatus::Connected;
        info!("telegram channel connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        self.bot = None;
        self.status = ChannelStatus::Disconnected;
        info!("telegram channel disconnected");
        Ok(())
    }

    fn status(&self) -> ChannelStatus {
        self.status.clone()
    }
}
