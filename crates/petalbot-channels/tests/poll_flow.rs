use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use petalbot_agents::providers::{ContentBlock, LlmProvider, LlmRequest, LlmResponse, MessagePart};
use petalbot_agents::{ChatEngine, persona};
use petalbot_channels::effects::BotApi;
use petalbot_channels::polls;
use petalbot_common::{RequestContext, Result, TurnRole};
use petalbot_db::ConversationStore;

/// Records every request and replies with a fixed answer.
struct RecordingProvider {
    requests: Mutex<Vec<LlmRequest>>,
    fail: bool,
}

impl RecordingProvider {
    fn new(fail: bool) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail,
        }
    }

    fn last_request(&self) -> Option<LlmRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for RecordingProvider {
    fn provider_id(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(petalbot_common::Error::Agent("boom".to_string()));
        }
        Ok(LlmResponse {
            content: vec![ContentBlock::Text {
                text: "Paris, it is the capital 🙃".to_string(),
            }],
            model: request.model.clone(),
            usage: None,
        })
    }
}

fn poll_reply_message() -> teloxide::types::Message {
    let json = r#"{
        "message_id": 10,
        "date": 1620000000,
        "chat": { "id": 12345, "type": "private", "first_name": "Alice" },
        "from": { "id": 111, "is_bot": false, "first_name": "Alice" },
        "text": "what is the answer",
        "reply_to_message": {
            "message_id": 9,
            "date": 1619990000,
            "chat": { "id": 12345, "type": "private", "first_name": "Alice" },
            "poll": {
                "id": "poll-1",
                "question": "Capital of France?",
                "options": [
                    { "text": "Paris", "voter_count": 0 },
                    { "text": "London", "voter_count": 0 }
                ],
                "total_voter_count": 0,
                "is_closed": false,
                "is_anonymous": true,
                "type": "regular",
                "allows_multiple_answers": false
            }
        }
    }"#;
    serde_json::from_str(json).expect("failed to parse poll message json")
}

fn plain_message(text: &str) -> teloxide::types::Message {
    let json = format!(
        r#"{{
            "message_id": 11,
            "date": 1620000000,
            "chat": {{ "id": 12345, "type": "private", "first_name": "Alice" }},
            "from": {{ "id": 111, "is_bot": false, "first_name": "Alice" }},
            "text": "{text}"
        }}"#
    );
    serde_json::from_str(&json).expect("failed to parse message json")
}

/// Reaction calls hit a closed port and are swallowed as best-effort.
fn offline_api() -> BotApi {
    BotApi::new("fake-token").with_base_url("http://127.0.0.1:9".to_string())
}

fn engine_with(provider: Arc<RecordingProvider>) -> (ChatEngine, Arc<ConversationStore>) {
    let store = Arc::new(ConversationStore::new(20));
    let engine = ChatEngine::new(
        Some(provider),
        Arc::clone(&store),
        "gemini-2.0-flash".to_string(),
        256,
    );
    (engine, store)
}

fn ctx() -> RequestContext {
    RequestContext::new(111, 12345, "Alice")
}

#[tokio::test]
async fn poll_reply_is_analyzed_through_the_engine() {
    let provider = Arc::new(RecordingProvider::new(false));
    let (engine, store) = engine_with(Arc::clone(&provider));
    let msg = poll_reply_message();

    let reply = polls::try_analyze(&offline_api(), &engine, &ctx(), &msg, "what is the answer")
        .await
        .expect("poll request should be handled");

    assert_eq!(reply, "Paris, it is the capital 🙃");

    // The delegated prompt embeds the poll question and numbered options.
    let request = provider.last_request().expect("provider was called");
    let last = request.messages.last().unwrap();
    let prompt = match &last.content {
        MessagePart::Parts(parts) => match &parts[0] {
            ContentBlock::Text { text } => text.clone(),
            other => panic!("expected text part, got {other:?}"),
        },
        MessagePart::Text(text) => text.clone(),
    };
    assert!(prompt.contains("Capital of France?"));
    assert!(prompt.contains("1. Paris\n2. London"));

    // The exchange lands in the requester's normal history.
    let history = store.history(111);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, TurnRole::User);
    assert!(history[0].content.contains("Capital of France?"));
    assert_eq!(history[1].role, TurnRole::Assistant);
}

#[tokio::test]
async fn engine_failure_yields_the_apology_string() {
    let provider = Arc::new(RecordingProvider::new(true));
    let (engine, store) = engine_with(provider);
    let msg = poll_reply_message();

    let reply = polls::try_analyze(&offline_api(), &engine, &ctx(), &msg, "what is the answer")
        .await
        .expect("poll request should be handled");

    assert_eq!(reply, persona::POLL_APOLOGY);
    assert!(store.history(111).is_empty());
}

#[tokio::test]
async fn trigger_without_poll_reply_is_not_handled() {
    let provider = Arc::new(RecordingProvider::new(false));
    let (engine, _store) = engine_with(Arc::clone(&provider));
    let msg = plain_message("what is the answer");

    let handled =
        polls::try_analyze(&offline_api(), &engine, &ctx(), &msg, "what is the answer").await;

    assert!(handled.is_none());
    assert!(provider.last_request().is_none());
}

#[tokio::test]
async fn non_trigger_text_is_not_handled() {
    let provider = Arc::new(RecordingProvider::new(false));
    let (engine, _store) = engine_with(Arc::clone(&provider));
    let msg = poll_reply_message();

    let handled = polls::try_analyze(&offline_api(), &engine, &ctx(), &msg, "good morning").await;

    assert!(handled.is_none());
    assert!(provider.last_request().is_none());
}
