use std::time::Duration;

use async_trait::async_trait;
use petalbot_common::{Error, Result};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

use super::{ChatMessage, ChatRole, ContentBlock, LlmProvider, LlmRequest, LlmResponse, MessagePart, Usage};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const RETRY_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

pub struct GeminiProvider {
    api_key: String,
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn build_request_body(&self, request: &LlmRequest) -> Value {
        // Gemini only accepts "user" and "model" roles.
        let contents: Vec<Value> = request
            .messages
            .iter()
            .map(|msg| {
                json!({
                    "role": gemini_role(&msg.role),
                    "parts": gemini_parts(&msg.content),
                })
            })
            .collect();

        let mut generation_config = serde_json::Map::new();
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temp));
        }

        let mut body = json!({ "contents": contents });
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }
        body
    }
}

fn gemini_role(role: &ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

fn gemini_parts(content: &MessagePart) -> Vec<Value> {
    match content {
        MessagePart::Text(text) => vec![json!({ "text": text })],
        MessagePart::Parts(blocks) => blocks
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => json!({ "text": text }),
                ContentBlock::Image { media_type, data } => json!({
                    "inline_data": { "mime_type": media_type, "data": data }
                }),
            })
            .collect(),
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let body = self.build_request_body(request);
        // The key rides in the query string; never log this URL.
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        let mut delay = INITIAL_BACKOFF;
        let mut response = None;

        for attempt in 0..RETRY_ATTEMPTS {
            match self.client.post(&url).json(&body).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        response = Some(resp);
                        break;
                    }
                    let detail = resp.text().await.unwrap_or_default();
                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if retryable && attempt + 1 < RETRY_ATTEMPTS {
                        warn!(
                            attempt = attempt + 1,
                            %status,
                            retry_in = ?delay,
                            "Gemini API retryable error"
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        return Err(Error::Agent(format!("Gemini API {status}: {detail}")));
                    }
                }
                Err(e) => {
                    if attempt + 1 < RETRY_ATTEMPTS {
                        warn!(attempt = attempt + 1, error = %e, "Gemini request error, retrying");
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        return Err(Error::Agent(format!("Gemini request failed: {e}")));
                    }
                }
            }
        }

        let resp = response.ok_or_else(|| Error::Agent("Gemini retries exhausted".to_string()))?;

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| Error::Agent(format!("failed to parse Gemini response: {e}")))?;

        if let Some(message) = payload["error"]["message"].as_str() {
            return Err(Error::Agent(format!("Gemini error: {message}")));
        }

        let content = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .filter(|text| !text.is_empty())
                    .map(|text| ContentBlock::Text {
                        text: text.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let usage = payload["usageMetadata"].as_object().map(|meta| Usage {
            input_tokens: meta
                .get("promptTokenCount")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
            output_tokens: meta
                .get("candidatesTokenCount")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        });

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage,
        })
    }
}
