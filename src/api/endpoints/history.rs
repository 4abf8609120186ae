//! Run history endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::history::HistoryEntry;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HistoryResponse {
    pub runs: Vec<HistoryEntry>,
}

/// `GET /api/history` — processed runs, newest first.
///
/// History lives in process memory only and is lost on restart.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    Ok(Json(HistoryResponse {
        runs: state.history.recent(),
    }))
}
