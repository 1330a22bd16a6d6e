//! Text acquisition: deriving the textual content of the image.
//!
//! Two mutually exclusive strategies:
//!
//! - Vision: one completion call against a vision-capable model with the
//!   image embedded as a data URL. Provider failures abort the request.
//! - OCR: a delegated call to the external OCR service. Failures degrade
//!   into a diagnostic placeholder instead of aborting, so a dead OCR
//!   sidecar still yields a (less grounded) suggestion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::prompts::EXTRACTION_USER_PROMPT;
use crate::llm::{ChatMessage, CompletionProvider, ContentPart};
use crate::ocr::OcrProvider;

use super::error::{PipelineError, Stage};
use super::ingest::InlineImage;

/// Which acquisition strategy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Send the image to a vision-capable completion endpoint.
    #[default]
    Vision,
    /// Delegate text recognition to the external OCR service.
    Ocr,
}

impl ExtractionStrategy {
    /// Parse a strategy name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vision" => Some(ExtractionStrategy::Vision),
            "ocr" => Some(ExtractionStrategy::Ocr),
            _ => None,
        }
    }

    /// Strategy tag recorded in the response context.
    pub fn tag(&self) -> &'static str {
        match self {
            ExtractionStrategy::Vision => "vision",
            ExtractionStrategy::Ocr => "ocr",
        }
    }
}

/// Output of the acquisition stage.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Acquired text content. Never empty.
    pub text: String,
    /// Raw upstream payload: the completion response under the vision
    /// strategy, the OCR reply under the OCR strategy, or null when the
    /// OCR call failed and placeholder text substitutes.
    pub raw: Value,
    /// Strategy that produced the text.
    pub strategy: ExtractionStrategy,
    /// Messages of the extraction completion call, echoed into the
    /// response context. None under the OCR strategy (no call is made).
    pub messages: Option<Vec<ChatMessage>>,
}

/// Placeholder when acquisition produced no usable text at all.
const EMPTY_EXTRACTION_PLACEHOLDER: &str = "(no content could be extracted from the image)";

/// The suggestion stage always receives non-empty content; substitute the
/// fixed placeholder for blank acquisition output.
fn ensure_non_empty(text: String) -> String {
    if text.trim().is_empty() {
        EMPTY_EXTRACTION_PLACEHOLDER.to_string()
    } else {
        text
    }
}

/// Acquire text by sending the image inline to the completion provider.
///
/// Hard-fails on any provider error. A success response without usable
/// message content is not an error: the string-rendered first choice
/// becomes the extraction text.
pub async fn vision_extract(
    provider: &dyn CompletionProvider,
    system_prompt: &str,
    instruction: &str,
    image: &InlineImage,
) -> Result<ExtractionResult, PipelineError> {
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_parts(vec![
            ContentPart::text(EXTRACTION_USER_PROMPT.replace("{instruction}", instruction)),
            ContentPart::image_url(image.to_data_url()),
        ]),
    ];

    debug!("Vision extraction with model {}", provider.model());
    let completion = provider
        .complete(&messages)
        .await
        .map_err(|source| PipelineError::Upstream {
            stage: Stage::ContentExtraction,
            source,
        })?;

    Ok(ExtractionResult {
        text: ensure_non_empty(completion.text_or_fallback()),
        raw: completion.raw,
        strategy: ExtractionStrategy::Vision,
        messages: Some(messages),
    })
}

/// Acquire text by delegating to the OCR service.
///
/// Never fails. Service errors are captured as diagnostic placeholder text
/// so the pipeline can still produce a suggestion from degraded context.
/// When the configured text field is absent from the reply, the whole
/// payload is surfaced as the content rather than guessing at fields.
pub async fn ocr_extract(
    provider: &dyn OcrProvider,
    image: &InlineImage,
    text_field: &str,
) -> ExtractionResult {
    match provider.recognize(image.bytes(), image.mime()).await {
        Ok(raw) => {
            let text = match raw.get(text_field).and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => raw.to_string(),
            };
            ExtractionResult {
                text: ensure_non_empty(text),
                raw,
                strategy: ExtractionStrategy::Ocr,
                messages: None,
            }
        }
        Err(e) => {
            warn!("OCR extraction degraded: {}", e);
            ExtractionResult {
                text: format!("OCR service error: {}", e),
                raw: Value::Null,
                strategy: ExtractionStrategy::Ocr,
                messages: None,
            }
        }
    }
}
