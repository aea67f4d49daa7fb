use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::handlers::content::load_collection;
use crate::handlers::ApiJson;
use crate::models::{ChatMessage, MenuItem};
use crate::services::ai::estimator::{estimate, menu_context};
use crate::state::AppState;

pub const MAX_MESSAGES: usize = 50;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<Value>> {
    if body.messages.is_empty() {
        return Err(AppError::validation("messages must not be empty"));
    }
    if body.messages.len() > MAX_MESSAGES {
        return Err(AppError::validation(format!(
            "messages must contain at most {MAX_MESSAGES} entries"
        )));
    }

    let menu = match load_collection::<MenuItem>(state.store.as_ref()).await {
        Ok(items) => menu_context(&items),
        Err(e) => {
            tracing::warn!(error = %e, "could not load menu for chat context");
            String::new()
        }
    };

    let reply = estimate(state.llm.as_ref(), &body.messages, &menu)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "LLM call failed");
            AppError::Upstream("The assistant is unavailable right now, please try again".to_string())
        })?;

    Ok(Json(json!({
        "reply": reply.reply,
        "quoted": reply.estimate.quoted,
        "quote": reply.estimate.quote,
    })))
}
