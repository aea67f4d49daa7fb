use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::db::{self, DocumentStore};
use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::models::theme::{ThemePatch, COLLECTION, DOCUMENT_ID};
use crate::models::ThemeSettings;
use crate::state::AppState;

/// The stored theme, or the built-in defaults when none has been saved yet.
pub async fn load_theme(store: &dyn DocumentStore) -> Result<ThemeSettings> {
    Ok(db::fetch(store, COLLECTION, DOCUMENT_ID)
        .await?
        .unwrap_or_default())
}

// GET /api/admin/theme
pub async fn get_theme(State(state): State<Arc<AppState>>) -> Result<Json<ThemeSettings>> {
    Ok(Json(load_theme(state.store.as_ref()).await?))
}

// PUT /api/admin/theme
pub async fn update_theme(
    State(state): State<Arc<AppState>>,
    ApiJson(patch): ApiJson<ThemePatch>,
) -> Result<Json<ThemeSettings>> {
    let mut theme = load_theme(state.store.as_ref()).await?;
    if theme.apply(patch)? == 0 {
        return Err(AppError::validation("No fields to update"));
    }
    theme.updated_at = Some(Utc::now());

    state
        .store
        .upsert(COLLECTION, DOCUMENT_ID, &serde_json::to_value(&theme).map_err(db::StoreError::from)?)
        .await?;

    tracing::info!("theme settings updated");
    Ok(Json(theme))
}
