use std::sync::Arc;

use petalbot_common::{RequestContext, TurnRole};
use petalbot_db::ConversationStore;
use tracing::{debug, error, info, warn};

use crate::media;
use crate::persona;
use crate::providers::{ChatMessage, ContentBlock, LlmProvider, LlmRequest};

/// Marker stored in history in place of raw image bytes.
const IMAGE_ANALYSIS_TAG: &str = "[Image Analysis]";

/// One inbound chat request. `text` may be empty only when `image` is set.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub user_id: i64,
    pub text: &'a str,
    pub image: Option<&'a [u8]>,
}

/// Explicit result taxonomy for a chat exchange. Internal failure detail
/// never reaches the user; `into_reply_text` maps each variant to its
/// fixed public string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The model produced a reply (or the fixed fallback when it returned
    /// no text) and history was updated.
    Reply(String),
    /// No provider configured, or nothing usable to send. No I/O happened.
    Unavailable,
    /// A model call was attempted and failed. Detail is for the log only.
    Failed(String),
}

impl ChatOutcome {
    pub fn into_reply_text(self) -> String {
        match self {
            ChatOutcome::Reply(text) => text,
            ChatOutcome::Unavailable => persona::FALLBACK_TEXT.to_string(),
            ChatOutcome::Failed(_) => persona::ERROR_TEXT.to_string(),
        }
    }
}

/// Orchestrates one exchange: stored history + persona -> model context,
/// model call, history update. The store is the only shared mutable state
/// and is touched exactly once per successful exchange (two appends).
pub struct ChatEngine {
    provider: Option<Arc<dyn LlmProvider>>,
    store: Arc<ConversationStore>,
    model: String,
    max_output_tokens: u32,
}

impl ChatEngine {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        store: Arc<ConversationStore>,
        model: String,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            provider,
            store,
            model,
            max_output_tokens,
        }
    }

    /// Whether a model provider is configured.
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Drop the stored history for one user.
    pub fn clear_history(&self, user_id: i64) {
        self.store.clear(user_id);
    }

    /// Run one exchange. History is mutated if and only if the model call
    /// succeeded; every failure path leaves the store untouched.
    pub async fn respond(&self, ctx: &RequestContext, request: ChatRequest<'_>) -> ChatOutcome {
        let Some(provider) = &self.provider else {
            warn!(
                user_id = ctx.user_id,
                "chat client not available, using fallback response"
            );
            return ChatOutcome::Unavailable;
        };

        let mut messages = conversation_context(&self.store.history(request.user_id));

        let mut parts = Vec::new();
        if !request.text.is_empty() {
            parts.push(ContentBlock::Text {
                text: request.text.to_string(),
            });
        }

        let mut history_entry = request.text.to_string();
        if let Some(bytes) = request.image {
            match media::decode_image(bytes) {
                Ok(decoded) => {
                    parts.push(ContentBlock::Image {
                        media_type: decoded.media_type,
                        data: decoded.data,
                    });
                    history_entry = if request.text.is_empty() {
                        IMAGE_ANALYSIS_TAG.to_string()
                    } else {
                        format!("{IMAGE_ANALYSIS_TAG}: {}", request.text)
                    };
                }
                Err(e) => {
                    warn!(
                        user_id = ctx.user_id,
                        error = %e,
                        "failed to process image, continuing without it"
                    );
                }
            }
        }

        if parts.is_empty() {
            warn!(user_id = ctx.user_id, "no message content to send to the model");
            return ChatOutcome::Unavailable;
        }
        messages.push(ChatMessage::user_parts(parts));

        debug!(
            user_id = ctx.user_id,
            user = %ctx.display_name,
            model = %self.model,
            context_len = messages.len(),
            "sending chat request to model"
        );

        let llm_request = LlmRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_output_tokens),
            temperature: None,
        };

        let response = match provider.complete(&llm_request).await {
            Ok(response) => response,
            Err(e) => {
                error!(user_id = ctx.user_id, error = %e, "model invocation failed");
                return ChatOutcome::Failed(e.to_string());
            }
        };

        let text = response.text();
        let reply = if text.trim().is_empty() {
            persona::FALLBACK_TEXT.to_string()
        } else {
            text.trim().to_string()
        };

        if !history_entry.is_empty() {
            self.store
                .append(request.user_id, TurnRole::User, history_entry);
        }
        self.store
            .append(request.user_id, TurnRole::Assistant, reply.clone());

        info!(
            user_id = ctx.user_id,
            reply_len = reply.len(),
            "chat reply generated"
        );
        ChatOutcome::Reply(reply)
    }

    /// Convenience wrapper mapping the outcome to its user-visible string.
    pub async fn reply(&self, ctx: &RequestContext, request: ChatRequest<'_>) -> String {
        self.respond(ctx, request).await.into_reply_text()
    }
}

/// Persona instructions plus stored history, in model message form.
///
/// Layout is fixed: instruction turn, acknowledgment turn, then each stored
/// turn in order (User -> user role, Assistant -> model role). Pure
/// function of the history slice.
pub fn conversation_context(history: &[petalbot_common::Turn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::user(persona::PERSONA_PROMPT));
    messages.push(ChatMessage::assistant(persona::PERSONA_ACK));

    for turn in history {
        messages.push(match turn.role {
            TurnRole::User => ChatMessage::user(turn.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
        });
    }
    messages
}
