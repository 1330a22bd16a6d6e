//! Completion client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the completion provider client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key sent as a bearer token. None sends no Authorization header
    /// (local inference servers typically ignore it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for both the extraction and suggestion calls.
    #[serde(default = "default_model")]
    pub model: String,

    /// Cap on tokens generated per completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds. None leaves the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        }
    }
}

impl CompletionConfig {
    /// Apply environment variable overrides to this config.
    ///
    /// Supported environment variables:
    /// - `OPENAI_BASE_URL`: API base URL
    /// - `OPENAI_API_KEY`: bearer token
    /// - `OPENAI_MODEL`: model name
    /// - `COMPLETION_MAX_TOKENS`: generation cap
    /// - `COMPLETION_TEMPERATURE`: sampling temperature
    /// - `COMPLETION_TIMEOUT_SECS`: hard request timeout
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("OPENAI_BASE_URL") {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(val) = std::env::var("COMPLETION_MAX_TOKENS") {
            if let Ok(max_tokens) = val.parse() {
                self.max_tokens = Some(max_tokens);
            }
        }
        if let Ok(val) = std::env::var("COMPLETION_TEMPERATURE") {
            if let Ok(temperature) = val.parse() {
                self.temperature = Some(temperature);
            }
        }
        if let Ok(val) = std::env::var("COMPLETION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = Some(secs);
            }
        }
        self
    }

    /// Set the API endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }
}
