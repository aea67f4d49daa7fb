use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::booking;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match state.store.count(booking::COLLECTION).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "health check could not reach the database");
            "unavailable"
        }
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
