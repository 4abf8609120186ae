//! Settings endpoints — UI theme and site-owner label.
//!
//! The theme preference is process-wide and not durable; it reverts to
//! `DEFAULT_THEME` on restart.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::config::Theme;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SettingsResponse {
    pub theme: Theme,
    pub site_owner: String,
}

#[derive(Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

/// `GET /api/settings` — current theme and site-owner label.
pub async fn current(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, ApiError> {
    Ok(Json(SettingsResponse {
        theme: state.theme(),
        site_owner: state.config.site_owner.clone(),
    }))
}

/// `POST /api/settings/theme` — switch between `dark` and `light`.
pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>, ApiError> {
    let theme = Theme::parse(&request.theme).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid theme selection: {:?}", request.theme))
    })?;
    state.set_theme(theme);
    Ok(Json(ThemeResponse { theme }))
}
