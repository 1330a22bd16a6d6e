//! Provider utility commands.

use console::style;

use crate::config::Settings;
use crate::llm::CompletionClient;
use crate::ocr::OcrClient;

/// List models advertised by the completion provider.
pub async fn cmd_models(settings: &Settings) -> anyhow::Result<()> {
    let client = CompletionClient::new(settings.completion.clone());
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No models advertised by {}", settings.completion.endpoint);
        return Ok(());
    }

    println!("Models at {}:", settings.completion.endpoint);
    for model in models {
        if model == settings.completion.model {
            println!("  {} {} (configured)", style("*").green(), model);
        } else {
            println!("    {}", model);
        }
    }

    Ok(())
}

/// Report reachability of both upstream services.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let completion = CompletionClient::new(settings.completion.clone());
    let ocr = OcrClient::new(settings.ocr.clone());

    println!("Completion provider: {}", settings.completion.endpoint);
    println!("  model: {}", settings.completion.model);
    if completion.is_available().await {
        println!("  {} reachable", style("✓").green());
    } else {
        println!("  {} unreachable", style("✗").red());
    }

    println!("OCR service: {}", settings.ocr.base_url);
    if ocr.is_available().await {
        println!("  {} reachable", style("✓").green());
    } else {
        println!(
            "  {} unreachable (the OCR strategy degrades instead of failing)",
            style("✗").red()
        );
    }

    println!("Extraction strategy: {}", settings.strategy.tag());

    Ok(())
}
