//! Response assembly: the terminal pipeline stage.

use serde_json::{json, Map, Value};

use super::extraction::ExtractionResult;
use super::suggestion::SuggestionResult;

/// Terminal artifact of one analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    /// Textual content derived from the image.
    pub primary_text: String,
    /// Suggested reply.
    pub suggestion: String,
    /// Diagnostic context bundle. Always carries the same four keys:
    /// `model`, `strategy`, `messages`, `provider`.
    pub context: Map<String, Value>,
}

/// Select the provider metadata subset for the context. Absent fields
/// become null, never an error; under the OCR strategy the extraction
/// payload carries none of them.
fn provider_metadata(raw: &Value) -> Value {
    json!({
        "id": raw.get("id").cloned().unwrap_or(Value::Null),
        "created": raw.get("created").cloned().unwrap_or(Value::Null),
        "model": raw.get("model").cloned().unwrap_or(Value::Null),
    })
}

/// Merge the stage outputs into the response contract.
///
/// Pure assembly: cannot fail given valid stage outputs. The echoed
/// `messages` are the extraction call's when one was made, otherwise the
/// suggestion call's (the only completion call under the OCR strategy).
pub fn assemble(
    model: &str,
    extraction: ExtractionResult,
    suggestion: SuggestionResult,
) -> AnalysisResponse {
    let echoed = match &extraction.messages {
        Some(messages) => serde_json::to_value(messages).unwrap_or(Value::Null),
        None => serde_json::to_value(&suggestion.messages).unwrap_or(Value::Null),
    };

    let mut context = Map::new();
    context.insert("model".to_string(), Value::String(model.to_string()));
    context.insert(
        "strategy".to_string(),
        Value::String(extraction.strategy.tag().to_string()),
    );
    context.insert("messages".to_string(), echoed);
    context.insert("provider".to_string(), provider_metadata(&extraction.raw));

    AnalysisResponse {
        primary_text: extraction.text,
        suggestion: suggestion.text,
        context,
    }
}
