use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::errors::AppError;
use crate::services::auth::session_token;
use crate::state::AppState;

/// Paths that need an admin session. A prefix matches itself and anything
/// below it, so `/administrator` is not covered by `/admin`.
const PROTECTED_PREFIXES: &[&str] = &[
    "/admin",
    "/api/admin",
    "/api/booking/accept",
    "/api/booking/reject",
    "/api/booking/suggest",
];

/// The signed-in admin, available to handlers behind `require_admin`.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_protected(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let username = session_token(request.headers())
        .and_then(|token| state.sessions.verify(token, Utc::now()))
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    request.extensions_mut().insert(AdminSession { username });
    Ok(next.run(request).await)
}
