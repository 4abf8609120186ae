//! Attachment downloads for original and annotated contracts.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::state::AppState;

/// `GET /api/download/uploads/:filename` — the contract as uploaded.
pub async fn original(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    send_attachment(&state.config.upload_dir, &filename).await
}

/// `GET /api/download/annotated/:filename` — the annotated copy.
pub async fn annotated(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    send_attachment(&state.config.annotated_dir, &filename).await
}

async fn send_attachment(dir: &FsPath, filename: &str) -> Result<Response, ApiError> {
    if !is_safe_filename(filename) {
        return Err(ApiError::BadRequest("Invalid filename".into()));
    }

    let path = dir.join(filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound(format!("No such document: {filename}")))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let headers = [
        (header::CONTENT_TYPE, mime.as_ref().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Reject anything that could escape the download directory.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}
