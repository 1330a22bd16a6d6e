//! OCR service client.
//!
//! Posts images to the OCR microservice as a named multipart file upload
//! and returns the service's JSON payload verbatim. Interpreting the
//! payload (which field holds the text) is the pipeline's concern.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Configuration for the OCR service client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Base URL of the OCR service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// JSON field of the service reply holding the recognized full text.
    #[serde(default = "default_text_field")]
    pub text_field: String,
}

fn default_base_url() -> String {
    "http://localhost:4004".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_text_field() -> String {
    "text".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            text_field: default_text_field(),
        }
    }
}

impl OcrConfig {
    /// Apply environment variable overrides to this config.
    ///
    /// Supported environment variables:
    /// - `OCR_SERVER_URL`: base URL of the OCR service
    /// - `OCR_TIMEOUT_SECS`: request timeout
    /// - `OCR_TEXT_FIELD`: reply field holding the recognized text
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("OCR_SERVER_URL") {
            if !base_url.is_empty() {
                self.base_url = base_url;
            }
        }
        if let Ok(val) = std::env::var("OCR_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }
        if let Ok(field) = std::env::var("OCR_TEXT_FIELD") {
            if !field.is_empty() {
                self.text_field = field;
            }
        }
        self
    }

    /// Set the service base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

/// A service that can recognize text in an image.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Run OCR over raw image bytes, returning the service's JSON payload.
    async fn recognize(&self, image: &[u8], mime: &str) -> Result<Value, OcrError>;
}

/// HTTP client for the OCR microservice.
pub struct OcrClient {
    config: OcrConfig,
    client: Client,
}

impl OcrClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OcrConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn ocr_url(&self) -> String {
        format!("{}/ocr", self.config.base_url.trim_end_matches('/'))
    }

    /// Check if the OCR service is reachable at the connection level.
    /// Any HTTP answer counts; a failing service degrades, it never blocks.
    pub async fn is_available(&self) -> bool {
        self.client.get(&self.config.base_url).send().await.is_ok()
    }
}

#[async_trait]
impl OcrProvider for OcrClient {
    async fn recognize(&self, image: &[u8], mime: &str) -> Result<Value, OcrError> {
        let part = match multipart::Part::bytes(image.to_vec())
            .file_name("image")
            .mime_str(mime)
        {
            Ok(part) => part,
            // Unparseable MIME type: send the bytes untyped instead.
            Err(_) => multipart::Part::bytes(image.to_vec()).file_name("image"),
        };
        let form = multipart::Form::new().part("file", part);

        debug!("OCR request: {} ({} bytes)", self.ocr_url(), image.len());

        let resp = self
            .client
            .post(self.ocr_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(OcrError::Api { status, body });
        }

        resp.json()
            .await
            .map_err(|e| OcrError::Parse(e.to_string()))
    }
}

/// Errors that can occur when calling the OCR service.
///
/// These never terminate an analysis request: the extraction stage converts
/// them into diagnostic placeholder text and the pipeline continues.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Failed to connect to the OCR service (includes timeouts)
    #[error("Connection error: {0}")]
    Connection(String),
    /// OCR service returned a non-success status
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },
    /// Failed to parse the service reply as JSON
    #[error("Parse error: {0}")]
    Parse(String),
}
