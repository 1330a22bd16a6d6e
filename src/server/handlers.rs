//! HTTP request handlers for the analysis endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::AppState;
use crate::pipeline::{AnalysisRequest, ExtractionStrategy, PipelineError};

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Response body of `POST /analyze`.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Textual content derived from the image.
    pub image_content: String,
    /// Suggested reply.
    pub suggestion: String,
    /// Diagnostic context bundle.
    pub context: Map<String, Value>,
}

/// Response body of `POST /analyze-ocr`.
#[derive(Debug, Serialize)]
pub struct AnalyzeOcrResponse {
    /// Text recognized by the OCR service (or its diagnostic placeholder).
    pub extracted_text: String,
    /// Suggested reply.
    pub analysis: String,
    /// Diagnostic context bundle.
    pub context: Map<String, Value>,
}

/// Analyze a screenshot with the deployment-configured extraction strategy.
pub async fn analyze(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request = match read_analysis_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.pipeline.analyze(request).await {
        Ok(outcome) => Json(AnalyzeResponse {
            image_content: outcome.primary_text,
            suggestion: outcome.suggestion,
            context: outcome.context,
        })
        .into_response(),
        Err(e) => pipeline_error_response(e),
    }
}

/// Analyze a screenshot with extraction forced through the OCR service.
pub async fn analyze_ocr(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request = match read_analysis_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state
        .pipeline
        .analyze_with(request, ExtractionStrategy::Ocr)
        .await
    {
        Ok(outcome) => Json(AnalyzeOcrResponse {
            extracted_text: outcome.primary_text,
            analysis: outcome.suggestion,
            context: outcome.context,
        })
        .into_response(),
        Err(e) => pipeline_error_response(e),
    }
}

/// All failure responses share the `{"detail": ...}` body shape.
fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

fn pipeline_error_response(err: PipelineError) -> Response {
    let status = match &err {
        PipelineError::EmptyImage => StatusCode::BAD_REQUEST,
        PipelineError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Analysis failed: {}", err);
    error_response(status, err.to_string())
}

/// Pull the `instruction` text field and `image` file field out of the
/// multipart form. Unknown fields are ignored.
async fn read_analysis_request(mut multipart: Multipart) -> Result<AnalysisRequest, Response> {
    let mut instruction: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;
    let mut mime: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart body: {}", e),
        )
    })? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("instruction") => {
                instruction = Some(field.text().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Unreadable instruction field: {}", e),
                    )
                })?);
            }
            Some("image") => {
                mime = field.content_type().map(|c| c.to_string());
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            error_response(
                                StatusCode::BAD_REQUEST,
                                format!("Unreadable image field: {}", e),
                            )
                        })?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let instruction = match instruction {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing required field: instruction",
            ))
        }
    };
    let image = image.ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "Missing required field: image")
    })?;

    Ok(AnalysisRequest {
        instruction,
        image,
        mime,
    })
}
