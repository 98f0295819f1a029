pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::coaching::artifact::{handle_download, DOWNLOAD_ROUTE};
use crate::coaching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes();

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/examples", get(handlers::handle_examples))
        .route(
            "/api/v1/coach",
            post(handlers::handle_coach).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(DOWNLOAD_ROUTE, get(handle_download))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::coaching::orchestrator::Coach;
    use crate::config::Config;
    use crate::llm_client::{CompletionModel, LlmError};

    struct FixedModel(&'static str);

    #[async_trait]
    impl CompletionModel for FixedModel {
        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn test_state(artifact_path: PathBuf, reply: &'static str, queue_max_size: usize) -> AppState {
        let config = Config {
            google_api_key: "test-key".to_string(),
            max_words: 1000,
            max_file_size_mb: 5.0,
            artifact_path,
            model_timeout_secs: 5,
            queue_max_size,
            port: 0,
            rust_log: "info".to_string(),
        };
        let coach = Coach::new(config.coach_settings(), Arc::new(FixedModel(reply)));
        AppState::new(config, coach)
    }

    fn artifact_in(dir: &Path) -> PathBuf {
        dir.join("career_buddy_feedback.md")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const BOUNDARY: &str = "XCOACHBOUNDARY";

    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, value) in fields {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn coach_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/coach")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const REPLY: &str = r#"{"match_score": {"score": 82, "bucket": "High"}, "strengths": "Great communicator: clear writing"}"#;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Career Buddy"));
        assert!(html.contains("/api/v1/coach"));
    }

    #[tokio::test]
    async fn test_examples_endpoint_lists_presets() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let response = app
            .oneshot(Request::get("/api/v1/examples").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let examples = body_json(response).await;
        assert_eq!(examples.as_array().unwrap().len(), 3);
        assert_eq!(examples[1]["domain"], "Software Engineering");
    }

    #[tokio::test]
    async fn test_download_before_any_run_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let response = app
            .oneshot(Request::get(DOWNLOAD_ROUTE).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_coach_then_download_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let body = multipart_body(&[
            (
                "jd_text",
                None,
                "Product Manager for FinTech role requiring A/B testing and Agile.",
            ),
            ("jd_file", Some(""), ""),
            (
                "resume_file",
                Some("resume.txt"),
                "Associate PM. Ran A/B tests. Led Agile ceremonies.",
            ),
            ("domain", None, "Product Management"),
            ("years_experience", None, "2"),
        ]);

        let response = app.clone().oneshot(coach_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["download_visible"], true);
        assert_eq!(json["download_url"], DOWNLOAD_ROUTE);
        let display = json["display"].as_str().unwrap();
        assert!(display.contains("8.2/10 (High)"));
        assert!(display.contains("Great communicator:"));

        let response = app
            .oneshot(Request::get(DOWNLOAD_ROUTE).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let markdown = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(markdown.contains("* Great communicator: clear writing"));
    }

    #[tokio::test]
    async fn test_coach_without_resume_returns_message_not_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(artifact_in(dir.path()), REPLY, 3));

        let body = multipart_body(&[("jd_text", None, "Marketing Analyst, SEO.")]);
        let response = app.oneshot(coach_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["display"], "⚠️ Please provide both JD and Resume.");
        assert_eq!(json["download_visible"], false);
        assert!(json["download_url"].is_null());
    }

    #[tokio::test]
    async fn test_coach_when_all_permits_held_reports_busy() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(artifact_in(dir.path()), REPLY, 1);
        let _held = state.permits.clone().try_acquire_owned().unwrap();
        let app = build_router(state);

        let body = multipart_body(&[
            ("jd_text", None, "Marketing Analyst, SEO."),
            ("resume_file", Some("resume.txt"), "SEO audits. GA dashboards."),
        ]);
        let response = app.oneshot(coach_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["display"], "⚠️ Server busy. Retry in a moment.");
        assert_eq!(json["download_visible"], false);
        assert!(!artifact_in(dir.path()).exists());
    }

    #[tokio::test]
    async fn test_coach_body_over_limit_reports_size_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(artifact_in(dir.path()), REPLY, 3);
        state.config.max_file_size_mb = 0.001;
        let limit = state.config.body_limit_bytes();
        let app = build_router(state);

        let oversized = "a".repeat(limit + 1024);
        let body = multipart_body(&[
            ("jd_text", None, "Marketing Analyst, SEO."),
            ("resume_file", Some("resume.txt"), oversized.as_str()),
        ]);
        let response = app.oneshot(coach_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["display"],
            "❌ Upload is too large (max 0.001 MB per file)."
        );
        assert_eq!(json["download_visible"], false);
    }
}
