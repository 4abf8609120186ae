//! Contract upload endpoint — multipart form → compliance pipeline.
//!
//! `POST /api/upload` receives one `.docx` in the `file` field, saves it
//! under the upload directory (never overwriting an earlier upload),
//! runs the pipeline and records the run in the in-memory history.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::audit::SheetStatus;
use crate::history::HistoryEntry;
use crate::notify::EmailStatus;
use crate::pipeline::processor::process_document;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub original_filename: String,
    pub saved_filename: String,
    pub annotated_filename: String,
    pub compliant: bool,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub email_status: EmailStatus,
    pub sheet_status: SheetStatus,
    pub download_original: String,
    pub download_annotated: String,
}

/// `POST /api/upload` — check one contract.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    // Find the `file` field
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?;
            file = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((original_filename, data)) = file else {
        return Err(ApiError::BadRequest("No file selected".into()));
    };
    if original_filename.is_empty() {
        return Err(ApiError::BadRequest("Empty filename".into()));
    }
    if data.is_empty() {
        return Err(ApiError::BadRequest("Empty file".into()));
    }

    let saved_filename = unique_filename(
        &state.config.upload_dir,
        &sanitize_filename(&original_filename),
    );
    let saved_path = state.config.upload_dir.join(&saved_filename);
    tokio::fs::write(&saved_path, &data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save upload: {e}")))?;

    tracing::info!(
        original = %original_filename,
        saved = %saved_filename,
        bytes = data.len(),
        "contract uploaded"
    );

    let outcome = process_document(&state, &saved_filename).await?;

    let entry = HistoryEntry {
        id: Uuid::new_v4(),
        original_filename: original_filename.clone(),
        saved_filename: saved_filename.clone(),
        annotated_filename: outcome.annotated_filename.clone(),
        missing: outcome.result.missing.iter().cloned().collect(),
        timestamp: Utc::now(),
        email_status: outcome.email_status.clone(),
        sheet_status: outcome.sheet_status.clone(),
    };
    let id = entry.id;
    state.history.append(entry);

    Ok(Json(UploadResponse {
        id,
        original_filename,
        download_original: format!("/api/download/uploads/{saved_filename}"),
        download_annotated: format!("/api/download/annotated/{}", outcome.annotated_filename),
        saved_filename,
        annotated_filename: outcome.annotated_filename,
        compliant: outcome.result.is_compliant(),
        present: outcome.result.present.iter().cloned().collect(),
        missing: outcome.result.missing.iter().cloned().collect(),
        email_status: outcome.email_status,
        sheet_status: outcome.sheet_status,
    }))
}

/// Strip any path components and characters that don't belong in a
/// stored filename.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.' || c == ' ') {
        "contract.docx".to_string()
    } else {
        cleaned
    }
}

/// Resolve collisions with an existing upload by appending a timestamp,
/// so a re-uploaded contract never overwrites an earlier run's file.
fn unique_filename(dir: &Path, name: &str) -> String {
    if !dir.join(name).exists() {
        return name.to_string();
    }
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{timestamp}.{ext}"),
        None => format!("{name}_{timestamp}"),
    }
}
