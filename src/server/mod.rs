//! Web server exposing the analysis pipeline.
//!
//! Two POST endpoints wrap the same pipeline with different extraction
//! strategies, plus a health probe for container orchestration. The server
//! is stateless across requests; concurrent uploads share nothing but the
//! provider clients.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::{CompletionClient, CompletionProvider};
use crate::ocr::{OcrClient, OcrProvider};
use crate::pipeline::ReplyPipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReplyPipeline>,
}

impl AppState {
    /// Build state with HTTP provider clients derived from settings.
    pub fn new(settings: &Settings) -> Self {
        let settings = Arc::new(settings.clone());
        let completion: Arc<dyn CompletionProvider> =
            Arc::new(CompletionClient::new(settings.completion.clone()));
        let ocr: Arc<dyn OcrProvider> = Arc::new(OcrClient::new(settings.ocr.clone()));
        Self::with_providers(completion, ocr, settings)
    }

    /// Build state with explicit providers. Tests inject scripted ones here.
    pub fn with_providers(
        completion: Arc<dyn CompletionProvider>,
        ocr: Arc<dyn OcrProvider>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            pipeline: Arc::new(ReplyPipeline::new(completion, ocr, settings)),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tower::ServiceExt;

    use crate::llm::{ChatMessage, Completion, CompletionError};
    use crate::ocr::OcrError;

    struct ScriptedCompletion {
        responses: Mutex<VecDeque<Result<Value, CompletionError>>>,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedCompletion {
        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
        ) -> Result<Completion, CompletionError> {
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected completion call");
            next.and_then(Completion::from_raw)
        }
    }

    struct ScriptedOcr {
        response: Mutex<Option<Result<Value, OcrError>>>,
    }

    #[async_trait]
    impl OcrProvider for ScriptedOcr {
        async fn recognize(&self, _image: &[u8], _mime: &str) -> Result<Value, OcrError> {
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected OCR call")
        }
    }

    fn chat_payload(content: &str) -> Value {
        json!({
            "id": "cmpl-test",
            "created": 1700000000,
            "model": "scripted-model",
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn setup_test_app(
        completions: Vec<Result<Value, CompletionError>>,
        ocr: Option<Result<Value, OcrError>>,
    ) -> axum::Router {
        let state = AppState::with_providers(
            Arc::new(ScriptedCompletion {
                responses: Mutex::new(completions.into()),
            }),
            Arc::new(ScriptedOcr {
                response: Mutex::new(ocr),
            }),
            Arc::new(Settings::default()),
        );
        create_router(state)
    }

    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    fn multipart_body(instruction: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(text) = instruction {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"instruction\"\r\n\r\n{text}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"shot.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(uri: &str, instruction: Option<&str>, image: Option<&[u8]>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(instruction, image)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let app = setup_test_app(
            vec![
                Ok(chat_payload("Alice: see you at 5")),
                Ok(chat_payload("See you then!")),
            ],
            None,
        );

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply casually"), Some(&[1, 2, 3])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["image_content"], "Alice: see you at 5");
        assert_eq!(json["suggestion"], "See you then!");
        assert_eq!(json["context"]["model"], "scripted-model");
        assert_eq!(json["context"]["strategy"], "vision");
        assert_eq!(json["context"]["provider"]["id"], "cmpl-test");
        assert!(json["context"]["messages"].is_array());
    }

    #[tokio::test]
    async fn test_analyze_empty_image_is_400() {
        // Empty completion script: any remote call would panic the test.
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply"), Some(&[])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["detail"], "Empty image uploaded");
    }

    #[tokio::test]
    async fn test_analyze_missing_image_is_400() {
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["detail"].as_str().unwrap().contains("image"));
    }

    #[tokio::test]
    async fn test_analyze_missing_instruction_is_400() {
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(analyze_request("/analyze", None, Some(&[1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["detail"].as_str().unwrap().contains("instruction"));
    }

    #[tokio::test]
    async fn test_analyze_blank_instruction_is_400() {
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(analyze_request("/analyze", Some("   "), Some(&[1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_upstream_failure_is_500_with_stage() {
        let app = setup_test_app(
            vec![Err(CompletionError::Api("HTTP 502: bad gateway".to_string()))],
            None,
        );

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply"), Some(&[1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        let detail = json["detail"].as_str().unwrap();
        assert!(detail.contains("content extraction"));
        assert!(detail.contains("502"));
    }

    #[tokio::test]
    async fn test_analyze_suggestion_failure_is_500_with_stage() {
        let app = setup_test_app(
            vec![
                Ok(chat_payload("extracted")),
                Err(CompletionError::Connection("reset by peer".to_string())),
            ],
            None,
        );

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply"), Some(&[1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .contains("suggestion generation"));
    }

    #[tokio::test]
    async fn test_analyze_contentless_choice_falls_back() {
        let app = setup_test_app(
            vec![
                Ok(json!({
                    "id": "cmpl-x",
                    "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
                })),
                Ok(chat_payload("a reply")),
            ],
            None,
        );

        let response = app
            .oneshot(analyze_request("/analyze", Some("reply"), Some(&[1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        // The extraction slot carries the string-rendered first choice.
        assert!(json["image_content"]
            .as_str()
            .unwrap()
            .contains("finish_reason"));
        assert_eq!(json["suggestion"], "a reply");
    }

    #[tokio::test]
    async fn test_analyze_ocr_success() {
        let app = setup_test_app(
            vec![Ok(chat_payload("Take the 6pm train instead."))],
            Some(Ok(json!({"text": "Bob: I missed the train"}))),
        );

        let response = app
            .oneshot(analyze_request("/analyze-ocr", Some("help me reply"), Some(&[1, 2])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["extracted_text"], "Bob: I missed the train");
        assert_eq!(json["analysis"], "Take the 6pm train instead.");
        assert_eq!(json["context"]["strategy"], "ocr");
    }

    #[tokio::test]
    async fn test_analyze_ocr_degrades_on_service_failure() {
        let app = setup_test_app(
            vec![Ok(chat_payload("Hard to read, could you resend?"))],
            Some(Err(OcrError::Api {
                status: 503,
                body: "unavailable".to_string(),
            })),
        );

        let response = app
            .oneshot(analyze_request("/analyze-ocr", Some("reply"), Some(&[1])))
            .await
            .unwrap();

        // OCR failure is not a request failure.
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let extracted = json["extracted_text"].as_str().unwrap();
        assert!(extracted.contains("OCR"));
        assert!(extracted.contains("503"));
        assert_eq!(json["analysis"], "Hard to read, could you resend?");
        assert_eq!(json["context"]["provider"]["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_analyze_ocr_empty_image_skips_ocr_call() {
        let app = setup_test_app(Vec::new(), None);

        let response = app
            .oneshot(analyze_request("/analyze-ocr", Some("reply"), Some(&[])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_multipart_fields_are_ignored() {
        let app = setup_test_app(
            vec![Ok(chat_payload("content")), Ok(chat_payload("reply"))],
            None,
        );

        let mut body = multipart_body(Some("reply please"), Some(&[9, 9]));
        let extra = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"debug\"\r\n\r\ntrue\r\n--{BOUNDARY}--\r\n"
        );
        let closing = format!("--{BOUNDARY}--\r\n");
        body.truncate(body.len() - closing.len());
        body.extend_from_slice(extra.as_bytes());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
