//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::config;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub clauses: usize,
    pub smtp_configured: bool,
    pub sheets_enabled: bool,
}

/// `GET /api/health` — liveness plus capability flags.
pub async fn check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        clauses: state.catalog.len(),
        smtp_configured: state.config.smtp.is_some(),
        sheets_enabled: state.config.sheets.is_some(),
    }))
}
