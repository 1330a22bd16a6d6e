//! Suggestion generation: the second completion call.

use serde_json::Value;
use tracing::debug;

use crate::llm::prompts::{CONTENT_USER_PROMPT, SUGGESTION_USER_PROMPT};
use crate::llm::{ChatMessage, CompletionProvider, ContentPart};

use super::error::{PipelineError, Stage};

/// Output of the suggestion stage.
#[derive(Debug, Clone)]
pub struct SuggestionResult {
    /// Suggested reply text.
    pub text: String,
    /// Raw provider payload.
    pub raw: Value,
    /// Messages of the suggestion completion call.
    pub messages: Vec<ChatMessage>,
}

/// Generate the suggested reply from the instruction and the acquired
/// image content.
///
/// Failure policy mirrors vision extraction: any provider error aborts
/// tagged with the suggestion-generation stage, and a contentless success
/// response falls back to its string-rendered first choice.
pub async fn generate_suggestion(
    provider: &dyn CompletionProvider,
    system_prompt: &str,
    instruction: &str,
    content: &str,
) -> Result<SuggestionResult, PipelineError> {
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_parts(vec![
            ContentPart::text(SUGGESTION_USER_PROMPT.replace("{instruction}", instruction)),
            ContentPart::text(CONTENT_USER_PROMPT.replace("{content}", content)),
        ]),
    ];

    debug!("Generating suggestion with model {}", provider.model());
    let completion = provider
        .complete(&messages)
        .await
        .map_err(|source| PipelineError::Upstream {
            stage: Stage::SuggestionGeneration,
            source,
        })?;

    Ok(SuggestionResult {
        text: completion.text_or_fallback(),
        raw: completion.raw,
        messages,
    })
}
