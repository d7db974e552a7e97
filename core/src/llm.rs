use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{LlmSettings, Provider};
use crate::error::{RelayError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Something that turns a prompt into model text.
///
/// One call per level request. Implementations are built once at startup and
/// shared read-only across all requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

/// Builds the generator selected by `settings.provider`.
pub fn build_generator(settings: LlmSettings) -> Arc<dyn TextGenerator> {
    info!(provider = ?settings.provider, model = %settings.model, "configuring text generator");
    match settings.provider {
        Provider::Anthropic => Arc::new(AnthropicClient::new(settings)),
        Provider::OpenAi => Arc::new(OpenAiClient::new(settings)),
    }
}

// --- ANTHROPIC ---

/// Anthropic Messages API over plain `reqwest`.
pub struct AnthropicClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl AnthropicClient {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.settings.api_key)
            .map_err(|e| RelayError::upstream(format!("invalid API key header: {e}")))?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.settings.api_key.is_empty() {
            return Err(RelayError::upstream(format!(
                "{} is not set",
                Provider::Anthropic.key_var()
            )));
        }

        let url = format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'));
        let body = self.request_body(prompt);
        debug!(url = %url, model = %self.settings.model, "sending generation request");

        let resp = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::upstream(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RelayError::upstream(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(RelayError::upstream(format!("API returned {status}: {text}")));
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|e| RelayError::upstream(format!("invalid JSON response: {e}")))?;
        first_text_block(&v)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

/// The generated text lives in the first element of `content`.
fn first_text_block(v: &Value) -> Result<String> {
    let first = v["content"]
        .as_array()
        .and_then(|blocks| blocks.first())
        .ok_or_else(|| RelayError::upstream("response contained no content blocks"))?;

    first["text"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| RelayError::upstream("first content block carries no text"))
}

// --- OPENAI ---

/// OpenAI Chat Completions through `async-openai`.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    settings: LlmSettings,
}

impl OpenAiClient {
    pub fn new(settings: LlmSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.clone())
            .with_api_base(settings.base_url.trim_end_matches('/'));
        let client = Client::with_config(config);
        Self { client, settings }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.settings.api_key.is_empty() {
            return Err(RelayError::upstream(format!(
                "{} is not set",
                Provider::OpenAi.key_var()
            )));
        }

        let upstream = |e: async_openai::error::OpenAIError| RelayError::upstream(e.to_string());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .max_completion_tokens(self.settings.max_tokens)
            .messages([ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(upstream)?,
            )])
            .build()
            .map_err(upstream)?;

        debug!(model = %self.settings.model, "sending generation request");
        let response = self.client.chat().create(request).await.map_err(upstream)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RelayError::upstream("response contained no message content"))
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
