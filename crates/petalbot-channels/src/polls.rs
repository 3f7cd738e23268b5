//! Poll analysis: when a user replies to a poll and asks about it, the
//! poll is reformatted into an analysis prompt and routed through the
//! normal chat engine under the requester's id, so the exchange lands in
//! their regular history.

use petalbot_agents::{ChatEngine, ChatOutcome, ChatRequest, persona};
use petalbot_common::RequestContext;
use teloxide::types::Message;
use tracing::{debug, info, warn};

use crate::effects::{BotApi, confused_reaction};

/// Phrases (English and Romanized Hindi) that mark a message as a poll
/// analysis request. Matched as lowercase substrings.
pub const POLL_ANALYSIS_TRIGGERS: &[&str] = &[
    "poll", "polls", "question", "questions", "query", "queries", "quiz", "quiz question",
    "answer", "answers", "reply", "replies", "solution", "solutions",
    "correct", "wrong", "galat", "sahi", "right", "incorrect", "true", "false",
    "option", "options", "choice", "choices", "selection", "selections",
    "batao", "jawab", "kya hai", "kya hai ye", "ye kya hai", "isme kya hai",
    "ismein kya hai", "sawal", "sawal ka jawab", "jawab do", "btao mujhe",
    "tell me", "what is", "which", "which one", "pick one", "choose one", "kaunsa sahi",
    "kaunsa galat", "kaunsa option", "kaunsa choice",
];

/// Whether the message text looks like a poll analysis request.
pub fn is_poll_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    POLL_ANALYSIS_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
}

/// Prompt handed to the chat engine. Persona and history are the engine's
/// concern; this only frames the poll itself.
pub fn analysis_prompt(question: &str, options: &[String]) -> String {
    let numbered = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}", i + 1, option))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Please analyze the following poll and tell me the most likely correct answer \
         and a brief reason why.\n\nPoll Question: \"{question}\"\n\nOptions:\n{numbered}\n"
    )
}

/// Try to handle `msg` as a poll analysis request. Returns `None` when the
/// message is not one (no trigger phrase, or not a reply to a poll), in
/// which case normal chat handling applies.
pub async fn try_analyze(
    api: &BotApi,
    engine: &ChatEngine,
    ctx: &RequestContext,
    msg: &Message,
    text: &str,
) -> Option<String> {
    if !is_poll_request(text) {
        return None;
    }

    let replied = msg.reply_to_message()?;
    let poll = replied.poll()?;

    debug!(user_id = ctx.user_id, "user asking about a replied-to poll");

    // Best-effort reactions on both the trigger message and the poll.
    let emoji = confused_reaction();
    let reacted = api.animate_reaction(ctx.chat_id, msg.id.0, emoji).await
        && api
            .animate_reaction(ctx.chat_id, replied.id.0, emoji)
            .await;
    if !reacted {
        warn!(user_id = ctx.user_id, "could not send analysis reactions");
    }

    let options: Vec<String> = poll
        .options
        .iter()
        .map(|option| option.text.clone())
        .collect();
    let prompt = analysis_prompt(&poll.question, &options);

    let outcome = engine
        .respond(
            ctx,
            ChatRequest {
                user_id: ctx.user_id,
                text: &prompt,
                image: None,
            },
        )
        .await;

    Some(match outcome {
        ChatOutcome::Reply(reply) => {
            info!(user_id = ctx.user_id, "poll analyzed");
            reply
        }
        _ => persona::POLL_APOLOGY.to_string(),
    })
}
