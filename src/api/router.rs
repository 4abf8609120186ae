//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! All routes live under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::state::AppState;

/// Maximum accepted upload size (16 MB).
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Build the API router.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(endpoints::health::check))
        .route("/api/upload", post(endpoints::upload::upload))
        .route("/api/history", get(endpoints::history::list))
        .route("/api/settings", get(endpoints::settings::current))
        .route("/api/settings/theme", post(endpoints::settings::set_theme))
        .route(
            "/api/download/uploads/:filename",
            get(endpoints::download::original),
        )
        .route(
            "/api/download/annotated/:filename",
            get(endpoints::download::annotated),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use docx_rs::{Docx, Paragraph, Run};
    use tower::ServiceExt;

    use crate::catalog::ClauseCatalog;
    use crate::config::Config;
    use crate::history::InMemoryHistory;

    const BOUNDARY: &str = "clausecheck-test-boundary";

    /// State backed by temp directories, with SMTP and Sheets off.
    fn test_state(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.upload_dir = dir.join("contracts");
        config.annotated_dir = dir.join("modified");
        let state = Arc::new(AppState::with_store(
            config,
            ClauseCatalog::required_clauses(),
            Arc::new(InMemoryHistory::default()),
        ));
        state.ensure_dirs().unwrap();
        state
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/vnd.openxmlformats-officedocument.wordprocessingml.document\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_response_shape() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["clauses"], 4);
        assert_eq!(json["smtp_configured"], false);
        assert_eq!(json["sheets_enabled"], false);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app.oneshot(get("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_detects_missing_clauses_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = api_router(state.clone());

        let content = docx_bytes(&["This agreement is governed by the laws of Delaware"]);
        let response = app
            .oneshot(multipart_upload("delaware.docx", &content))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["saved_filename"], "delaware.docx");
        assert_eq!(json["annotated_filename"], "delaware_modified.docx");
        assert_eq!(json["compliant"], false);
        assert_eq!(json["present"], serde_json::json!(["governing law"]));
        assert_eq!(
            json["missing"],
            serde_json::json!(["data privacy", "payment terms", "termination"])
        );
        assert_eq!(json["email_status"]["status"], "no_recipients");
        assert_eq!(json["sheet_status"]["status"], "disabled");
        assert_eq!(
            json["download_annotated"],
            "/api/download/annotated/delaware_modified.docx"
        );

        // Both files exist on disk
        assert!(state.config.upload_dir.join("delaware.docx").is_file());
        assert!(state
            .config
            .annotated_dir
            .join("delaware_modified.docx")
            .is_file());
    }

    #[tokio::test]
    async fn upload_of_compliant_contract() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let content = docx_bytes(&[
            "Data privacy is handled per GDPR.",
            "Termination requires 30 days notice.",
            "Governing law: Delaware jurisdiction.",
            "Payment terms: net 30, fees due monthly.",
        ]);
        let response = app
            .oneshot(multipart_upload("good.docx", &content))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["compliant"], true);
        assert_eq!(json["missing"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn upload_without_file_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             hello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "No file selected");
    }

    #[tokio::test]
    async fn upload_with_empty_filename_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app.oneshot(multipart_upload("", b"data")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Empty filename");
    }

    #[tokio::test]
    async fn upload_with_empty_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_upload("contract.docx", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Empty file");
    }

    #[tokio::test]
    async fn reupload_same_filename_gets_timestamp_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let content = docx_bytes(&["Termination only."]);

        let app = api_router(state.clone());
        let first = app
            .oneshot(multipart_upload("contract.docx", &content))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let app = api_router(state.clone());
        let second = app
            .oneshot(multipart_upload("contract.docx", &content))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let json = response_json(second).await;
        let saved = json["saved_filename"].as_str().unwrap();
        assert_ne!(saved, "contract.docx");
        assert!(saved.starts_with("contract_"));
        assert!(saved.ends_with(".docx"));
    }

    #[tokio::test]
    async fn corrupt_upload_reports_all_clauses_missing() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_upload("broken.docx", b"this is not a docx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["compliant"], false);
        assert_eq!(json["missing"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn history_lists_runs_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let content = docx_bytes(&["Nothing relevant."]);

        for name in ["first.docx", "second.docx"] {
            let app = api_router(state.clone());
            let response = app
                .oneshot(multipart_upload(name, &content))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let app = api_router(state);
        let response = app.oneshot(get("/api/history")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let runs = json["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["original_filename"], "second.docx");
        assert_eq!(runs[1]["original_filename"], "first.docx");
        assert_eq!(runs[0]["missing"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn download_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let content = docx_bytes(&["Termination applies."]);

        let app = api_router(state.clone());
        let response = app
            .oneshot(multipart_upload("contract.docx", &content))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = api_router(state.clone());
        let response = app
            .oneshot(get("/api/download/uploads/contract.docx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("contract.docx"));

        let app = api_router(state);
        let response = app
            .oneshot(get("/api/download/annotated/contract_modified.docx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn download_unknown_file_returns_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app
            .oneshot(get("/api/download/uploads/nope.docx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn download_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let response = app
            .oneshot(get("/api/download/uploads/..%2F..%2Fetc%2Fpasswd"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let app = api_router(state.clone());
        let response = app.oneshot(get("/api/settings")).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["site_owner"], "You");

        let app = api_router(state.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/api/settings/theme")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"theme":"light"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = api_router(state);
        let response = app.oneshot(get("/api/settings")).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn invalid_theme_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = api_router(test_state(dir.path()));

        let request = Request::builder()
            .method("POST")
            .uri("/api/settings/theme")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"theme":"sepia"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
