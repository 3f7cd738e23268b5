use axum::{Router, extract::Json, response::IntoResponse, routing::post};
use petalbot_agents::providers::{ChatMessage, GeminiProvider, LlmProvider, LlmRequest};
use petalbot_common::{Error, Result};
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::oneshot;

// Mock server setup
async fn start_mock_server() -> (SocketAddr, oneshot::Sender<()>) {
    let (tx, rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/gemini-2.0-flash:generateContent", post(mock_generate))
        .route("/broken-model:generateContent", post(mock_bad_request))
        .route("/empty-model:generateContent", post(mock_empty));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, tx)
}

async fn mock_generate(Json(payload): Json<serde_json::Value>) -> impl IntoResponse {
    // Echo-check: the request must carry Gemini-shaped contents.
    assert!(payload["contents"].is_array());

    Json(json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Hello " },
                        { "text": "world" }
                    ]
                },
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 12,
            "candidatesTokenCount": 4
        }
    }))
}

async fn mock_bad_request() -> impl IntoResponse {
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(json!({
            "error": { "code": 400, "message": "invalid request" }
        })),
    )
}

async fn mock_empty() -> impl IntoResponse {
    Json(json!({ "candidates": [] }))
}

fn request_for(model: &str) -> LlmRequest {
    LlmRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user("Hello")],
        max_tokens: Some(64),
        temperature: None,
    }
}

#[tokio::test]
async fn complete_extracts_candidate_text_and_usage() -> Result<()> {
    let (addr, _shutdown_tx) = start_mock_server().await;
    let provider =
        GeminiProvider::new("test-key".to_string()).with_base_url(format!("http://{addr}"));

    let response = provider.complete(&request_for("gemini-2.0-flash")).await?;

    assert_eq!(response.text(), "Hello world");
    let usage = response.usage.expect("usage metadata");
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 4);
    Ok(())
}

#[tokio::test]
async fn non_retryable_error_status_maps_to_agent_error() {
    let (addr, _shutdown_tx) = start_mock_server().await;
    let provider =
        GeminiProvider::new("test-key".to_string()).with_base_url(format!("http://{addr}"));

    let result = provider.complete(&request_for("broken-model")).await;

    match result {
        Err(Error::Agent(detail)) => assert!(detail.contains("400")),
        other => panic!("expected Agent error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_candidates_yield_empty_text() -> Result<()> {
    let (addr, _shutdown_tx) = start_mock_server().await;
    let provider =
        GeminiProvider::new("test-key".to_string()).with_base_url(format!("http://{addr}"));

    let response = provider.complete(&request_for("empty-model")).await?;

    assert!(response.content.is_empty());
    assert_eq!(response.text(), "");
    Ok(())
}
