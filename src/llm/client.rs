//! Completion provider client.
//!
//! Speaks the OpenAI chat completions protocol. The same client serves both
//! pipeline calls: the vision extraction call (image embedded as a data URL
//! in a user message part) and the text-only suggestion call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::config::CompletionConfig;

/// A role-tagged message in a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    /// System-role message with plain text content.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User-role message with plain text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User-role message composed of typed content parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: a plain string or a list of typed parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multi-part user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Image part referencing a URL, typically a base64 data URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Outcome of one completion call.
///
/// Keeps the raw provider payload alongside the parsed message text so the
/// pipeline can echo provider metadata and fall back to the string-rendered
/// first choice when the message carries no usable content.
#[derive(Debug, Clone)]
pub struct Completion {
    content: Option<String>,
    first_choice: Value,
    /// Entire provider payload, untouched.
    pub raw: Value,
}

impl Completion {
    /// Build a completion from a raw provider payload.
    ///
    /// A payload without at least one choice violates the provider contract
    /// and yields [`CompletionError::NoChoices`].
    pub fn from_raw(raw: Value) -> Result<Self, CompletionError> {
        let first_choice = raw
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .cloned()
            .ok_or(CompletionError::NoChoices)?;

        let content = first_choice
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .filter(|text| !text.is_empty());

        Ok(Self {
            content,
            first_choice,
            raw,
        })
    }

    /// Message text of the first choice, or the string-rendered choice when
    /// the provider answered with a success status but no usable content.
    pub fn text_or_fallback(&self) -> String {
        match &self.content {
            Some(text) => text.clone(),
            None => self.first_choice.to_string(),
        }
    }
}

/// A provider that can execute chat completion calls.
///
/// The pipeline talks to this trait rather than to [`CompletionClient`]
/// directly so tests can substitute scripted providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier this provider completes with.
    fn model(&self) -> &str;

    /// Execute a single chat completion round trip.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError>;
}

/// HTTP client for an OpenAI-compatible completion endpoint.
pub struct CompletionClient {
    config: CompletionConfig,
    client: Client,
}

impl CompletionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CompletionConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.config.endpoint.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Check if the completion endpoint is reachable.
    pub async fn is_available(&self) -> bool {
        match self.authorize(self.client.get(self.models_url())).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// List model identifiers advertised by the provider.
    pub async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
        let resp = self
            .authorize(self.client.get(self.models_url()))
            .send()
            .await
            .map_err(|e| CompletionError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CompletionError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct ModelsResponse {
            data: Vec<ModelEntry>,
        }

        #[derive(Deserialize)]
        struct ModelEntry {
            id: String,
        }

        let models: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            "Completion request: model={} messages={}",
            self.config.model,
            messages.len()
        );

        let resp = self
            .authorize(self.client.post(self.chat_url()).json(&request))
            .send()
            .await
            .map_err(|e| CompletionError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("HTTP {}: {}", status, body)));
        }

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        Completion::from_raw(raw)
    }
}

/// Errors that can occur when calling the completion provider.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Failed to connect to the provider
    #[error("Connection error: {0}")]
    Connection(String),
    /// Provider returned a non-success status
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response carried an empty choice list
    #[error("Response contained no choices")]
    NoChoices,
}
