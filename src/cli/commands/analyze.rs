//! One-shot analysis of a local image file.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::llm::{CompletionClient, CompletionProvider};
use crate::ocr::{OcrClient, OcrProvider};
use crate::pipeline::{AnalysisRequest, ExtractionStrategy, ReplyPipeline};

/// Run the analysis pipeline on a local image and print the result.
pub async fn cmd_analyze(
    settings: &Settings,
    image_path: &Path,
    instruction: &str,
    force_ocr: bool,
    json: bool,
) -> anyhow::Result<()> {
    let image = std::fs::read(image_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", image_path.display(), e))?;
    let mime = mime_guess::from_path(image_path)
        .first()
        .map(|m| m.to_string());

    let completion: Arc<dyn CompletionProvider> =
        Arc::new(CompletionClient::new(settings.completion.clone()));
    let ocr: Arc<dyn OcrProvider> = Arc::new(OcrClient::new(settings.ocr.clone()));
    let pipeline = ReplyPipeline::new(completion, ocr, Arc::new(settings.clone()));

    let request = AnalysisRequest {
        instruction: instruction.to_string(),
        image,
        mime,
    };

    let outcome = if force_ocr {
        pipeline
            .analyze_with(request, ExtractionStrategy::Ocr)
            .await?
    } else {
        pipeline.analyze(request).await?
    };

    if json {
        let body = serde_json::json!({
            "image_content": outcome.primary_text,
            "suggestion": outcome.suggestion,
            "context": outcome.context,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{} Extracted content:", style("→").cyan());
    println!("{}", outcome.primary_text);
    println!();
    println!("{} Suggested reply:", style("✓").green());
    println!("{}", outcome.suggestion);

    Ok(())
}
