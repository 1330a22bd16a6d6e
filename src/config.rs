//! Configuration management.
//!
//! Every setting is environment-sourced (optionally through a `.env` file
//! loaded at startup) and read exactly once when the process boots.
//! Requests never consult the environment.

use serde::{Deserialize, Serialize};

use crate::llm::prompts::DEFAULT_SYSTEM_PROMPT;
use crate::llm::CompletionConfig;
use crate::ocr::OcrConfig;
use crate::pipeline::ExtractionStrategy;

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Completion provider configuration.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// OCR service configuration.
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Extraction strategy used by `analyze` requests.
    #[serde(default)]
    pub strategy: ExtractionStrategy,

    /// Persona system prompt override. None uses the built-in default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            completion: CompletionConfig::default(),
            ocr: OcrConfig::default(),
            strategy: ExtractionStrategy::default(),
            prompt: None,
        }
    }
}

impl Settings {
    /// Apply environment variable overrides.
    ///
    /// In addition to the nested configs' variables:
    /// - `EXTRACTION_STRATEGY`: "vision" (default) or "ocr"
    /// - `SYSTEM_PROMPT`: replaces the built-in persona prompt wholesale
    pub fn with_env_overrides(mut self) -> Self {
        self.completion = self.completion.with_env_overrides();
        self.ocr = self.ocr.with_env_overrides();

        if let Ok(val) = std::env::var("EXTRACTION_STRATEGY") {
            if let Some(strategy) = ExtractionStrategy::from_str(&val) {
                self.strategy = strategy;
            }
        }
        if let Ok(prompt) = std::env::var("SYSTEM_PROMPT") {
            if !prompt.trim().is_empty() {
                self.prompt = Some(prompt);
            }
        }
        self
    }

    /// The persona prompt: configured override or the built-in default.
    pub fn system_prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Validate endpoint URLs so misconfiguration fails at startup instead
    /// of at the first request.
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.completion.endpoint).map_err(|e| {
            anyhow::anyhow!(
                "Invalid completion endpoint '{}': {}",
                self.completion.endpoint,
                e
            )
        })?;
        url::Url::parse(&self.ocr.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid OCR base URL '{}': {}", self.ocr.base_url, e))?;
        Ok(())
    }
}

/// Load settings from the environment. `main` loads `.env` beforehand.
pub fn load_settings() -> Settings {
    Settings::default().with_env_overrides()
}
