use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::Result;
use crate::handlers::content::load_collection;
use crate::handlers::theme::load_theme;
use crate::models::Resource;
use crate::state::AppState;

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

fn uncached<T: serde::Serialize>(body: T) -> Response {
    ([(header::CACHE_CONTROL, NO_CACHE)], Json(body)).into_response()
}

// GET /api/public/<collection>
pub async fn list_visible<R: Resource>(State(state): State<Arc<AppState>>) -> Result<Response> {
    let items: Vec<R> = load_collection::<R>(state.store.as_ref())
        .await?
        .into_iter()
        .filter(|item| item.is_visible())
        .collect();
    Ok(uncached(items))
}

// GET /api/public/theme
pub async fn theme(State(state): State<Arc<AppState>>) -> Result<Response> {
    Ok(uncached(load_theme(state.store.as_ref()).await?))
}
