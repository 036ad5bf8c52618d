use base64::{Engine as _, engine::general_purpose};
use bon::bon;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model returned no content")]
    EmptyResponse,
}

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum MessagePart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize, Debug)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Deserialize)]
pub struct ChatFullResponse {
    pub choices: Vec<FullChoice>,
}

#[derive(Deserialize)]
pub struct FullChoice {
    pub message: FullMessage,
}

#[derive(Deserialize)]
pub struct FullMessage {
    pub content: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub temperature: f32,
    pub top_p: f32,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    config: LlmConfig,
}

#[bon]
impl LlmClient {
    #[builder(start_fn = with_base_url)]
    pub fn new(
        #[builder(start_fn)] base_url: &str,
        model: Option<String>,
        api_key: Option<String>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        timeout: Option<Duration>,
    ) -> LlmResult<Self> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            http = http.timeout(timeout);
        }
        Ok(Self {
            http: http.build()?,
            base_url: api_root(base_url).to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.unwrap_or_default(),
            config: LlmConfig {
                temperature: temperature.unwrap_or(0.2),
                top_p: top_p.unwrap_or(0.8),
            },
        })
    }

    /// Build a user message from a prompt and encoded images (sent as data urls).
    #[must_use]
    pub fn prepare_message(prompt: &str, images: &[&[u8]]) -> Message {
        let mut parts = vec![MessagePart::Text {
            text: prompt.to_string(),
        }];
        for bytes in images {
            let mime_type = infer::get(bytes).map_or("image/jpeg", |kind| kind.mime_type());
            let b64 = general_purpose::STANDARD.encode(bytes);
            parts.push(MessagePart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{mime_type};base64,{b64}"),
                },
            });
        }
        Message {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }

    /// Single-turn chat. With `schema`, the model is asked for JSON matching it.
    #[builder]
    pub async fn chat(
        &self,
        #[builder(start_fn)] prompt: &str,
        images: Option<&[&[u8]]>,
        schema: Option<Value>,
    ) -> LlmResult<String> {
        let msg = Self::prepare_message(prompt, images.unwrap_or_default());
        self.call(vec![msg], schema).await
    }

    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub async fn call(&self, messages: Vec<Message>, schema: Option<Value>) -> LlmResult<String> {
        let req_body = self.build_request(messages, schema);
        let mut request = self.http.post(self.chat_url()).json(&req_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let full: ChatFullResponse = response.json().await?;
        let content = full
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;
        debug!("LLM responded with {} chars", content.len());
        Ok(content)
    }

    fn build_request(&self, messages: Vec<Message>, schema: Option<Value>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            top_p: self.config.top_p,
            temperature: self.config.temperature,
            response_format: schema.map(|schema| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "response",
                    strict: true,
                    schema,
                },
            }),
        }
    }
}

/// Server root of an OpenAI-compatible endpoint. Accepts both `https://host`
/// and `https://host/v1`.
fn api_root(base_url: &str) -> &str {
    let base = base_url.trim_end_matches('/');
    base.strip_suffix("/v1").unwrap_or(base)
}

/// Pull the first JSON object out of a model answer, tolerating markdown fences
/// and leading prose.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
