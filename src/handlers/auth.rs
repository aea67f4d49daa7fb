use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::services::auth::{session_token, verify_credentials};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response> {
    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return Err(AppError::validation("username and password are required"));
    }

    if !verify_credentials(&state.config, username, &body.password)? {
        tracing::warn!(username, "failed admin login");
        return Err(AppError::Unauthorized("Invalid username or password".to_string()));
    }

    let token = state.sessions.issue(username, Utc::now())?;
    tracing::info!(username, "admin logged in");

    Ok((
        [(header::SET_COOKIE, state.sessions.set_cookie(&token))],
        Json(json!({ "success": true, "username": username })),
    )
        .into_response())
}

// POST /api/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

// GET /api/auth/session
pub async fn session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<serde_json::Value> {
    let username = session_token(&headers).and_then(|token| state.sessions.verify(token, Utc::now()));
    match username {
        Some(username) => Json(json!({ "authenticated": true, "username": username })),
        None => Json(json!({ "authenticated": false })),
    }
}
