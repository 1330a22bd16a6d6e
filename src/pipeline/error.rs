//! Pipeline error taxonomy.

use thiserror::Error;

use crate::llm::CompletionError;

/// Pipeline stage names used to tag upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First completion call: deriving text content from the image.
    ContentExtraction,
    /// Second completion call: generating the suggested reply.
    SuggestionGeneration,
}

impl Stage {
    /// Human-readable stage name used in error details and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ContentExtraction => "content extraction",
            Stage::SuggestionGeneration => "suggestion generation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that terminate an analysis request.
///
/// Deliberately short: OCR failures degrade into placeholder extraction
/// text rather than erroring, and contentless completion choices fall back
/// to their string-rendered form. Only caller mistakes and completion
/// provider failures abort.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No image bytes were supplied
    #[error("Empty image uploaded")]
    EmptyImage,

    /// A completion call failed (connection, non-success status, or an
    /// undecodable payload), tagged with the stage that made the call
    #[error("{stage} failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: CompletionError,
    },
}
