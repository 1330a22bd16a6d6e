//! The two-stage analysis pipeline.
//!
//! Sequences ingestion, text acquisition, suggestion generation, and
//! response assembly for a single request. Every invocation is independent:
//! the pipeline holds only immutable settings and provider handles, keeps
//! no per-request state, and performs no retries. Whatever the completion
//! provider and OCR service answer is what the caller gets.

mod error;
mod extraction;
mod ingest;
mod response;
mod suggestion;

use std::sync::Arc;

use tracing::debug;

use crate::config::Settings;
use crate::llm::CompletionProvider;
use crate::ocr::OcrProvider;

pub use error::{PipelineError, Stage};
pub use extraction::{ocr_extract, vision_extract, ExtractionResult, ExtractionStrategy};
pub use ingest::InlineImage;
pub use response::AnalysisResponse;
pub use suggestion::{generate_suggestion, SuggestionResult};

/// One analysis request: the caller's instruction plus the uploaded image.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Free-text instruction describing the desired reply.
    pub instruction: String,
    /// Raw image bytes.
    pub image: Vec<u8>,
    /// MIME type declared by the caller, if any.
    pub mime: Option<String>,
}

/// The extraction/suggestion orchestrator.
#[derive(Clone)]
pub struct ReplyPipeline {
    completion: Arc<dyn CompletionProvider>,
    ocr: Arc<dyn OcrProvider>,
    settings: Arc<Settings>,
}

impl ReplyPipeline {
    /// Create a pipeline over the given providers and settings.
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        ocr: Arc<dyn OcrProvider>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            completion,
            ocr,
            settings,
        }
    }

    /// Run an analysis with the deployment-configured extraction strategy.
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisResponse, PipelineError> {
        self.analyze_with(request, self.settings.strategy).await
    }

    /// Run an analysis with an explicit extraction strategy.
    pub async fn analyze_with(
        &self,
        request: AnalysisRequest,
        strategy: ExtractionStrategy,
    ) -> Result<AnalysisResponse, PipelineError> {
        let image = InlineImage::from_upload(request.image, request.mime.as_deref())?;
        debug!(
            "Ingested {} byte {} image, strategy {}",
            image.bytes().len(),
            image.mime(),
            strategy.tag()
        );

        let prompt = self.settings.system_prompt();
        let extraction = match strategy {
            ExtractionStrategy::Vision => {
                vision_extract(
                    self.completion.as_ref(),
                    prompt,
                    &request.instruction,
                    &image,
                )
                .await?
            }
            ExtractionStrategy::Ocr => {
                ocr_extract(self.ocr.as_ref(), &image, &self.settings.ocr.text_field).await
            }
        };
        debug!(
            "Acquired {} chars via {}",
            extraction.text.len(),
            extraction.strategy.tag()
        );

        let suggestion = generate_suggestion(
            self.completion.as_ref(),
            prompt,
            &request.instruction,
            &extraction.text,
        )
        .await?;
        debug!("Generated {} char suggestion", suggestion.text.len());

        Ok(response::assemble(
            self.completion.model(),
            extraction,
            suggestion,
        ))
    }
}
