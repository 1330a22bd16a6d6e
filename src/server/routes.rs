//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

// The axum default body limit is 2 MB; phone screenshots routinely exceed it.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Analysis with the deployment-configured extraction strategy
        .route("/analyze", post(handlers::analyze))
        // Analysis with extraction forced through the OCR service
        .route("/analyze-ocr", post(handlers::analyze_ocr))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
