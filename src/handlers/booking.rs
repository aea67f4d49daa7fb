use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::middleware::AdminSession;
use crate::models::booking::parse_event_datetime;
use crate::models::BookingRequest;
use crate::services::booking as workflow;
use crate::state::AppState;

fn required_id(id: Option<String>) -> Result<String> {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("bookingId is required"))
}

// POST /api/booking/create
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let outcome = workflow::create(&state, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "bookingId": outcome.booking.id,
            "notifications": outcome.notifications,
        })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdRequest {
    pub booking_id: Option<String>,
}

// POST /api/booking/accept
pub async fn accept_booking(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    ApiJson(body): ApiJson<BookingIdRequest>,
) -> Result<Json<Value>> {
    let id = required_id(body.booking_id)?;
    let booking = workflow::accept(&state, &id, &session.username).await?;
    Ok(Json(json!({ "success": true, "booking": booking })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub booking_id: Option<String>,
    pub reason: Option<String>,
}

// POST /api/booking/reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    ApiJson(body): ApiJson<RejectRequest>,
) -> Result<Json<Value>> {
    let id = required_id(body.booking_id)?;
    let booking = workflow::reject(&state, &id, body.reason, &session.username).await?;
    Ok(Json(json!({ "success": true, "booking": booking })))
}

// GET /api/booking/suggest
pub async fn prepare_suggestion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingIdRequest>,
) -> Result<Json<Value>> {
    let id = query.booking_id.filter(|id| !id.trim().is_empty());
    let Some(id) = id else {
        return Ok(Json(json!({ "ready": true })));
    };

    let booking = workflow::load(&state, id.trim()).await?;
    Ok(Json(json!({
        "ready": true,
        "bookingId": booking.id,
        "status": booking.status,
        "event": booking.event,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub booking_id: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

// POST /api/booking/suggest
pub async fn suggest_times(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    ApiJson(body): ApiJson<SuggestRequest>,
) -> Result<Json<Value>> {
    let id = required_id(body.booking_id)?;
    if body.options.is_empty() {
        return Err(AppError::validation("options must contain at least one datetime"));
    }
    let times = body
        .options
        .iter()
        .map(|raw| {
            parse_event_datetime(raw)
                .ok_or_else(|| AppError::validation(format!("invalid datetime in options: {raw}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = workflow::suggest(&state, &id, times, &session.username).await?;
    Ok(Json(json!({
        "success": true,
        "booking": outcome.booking,
        "notifications": outcome.notifications,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub booking_id: Option<String>,
    pub selected_time: Option<String>,
}

// POST /api/booking/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ConfirmRequest>,
) -> Result<Json<Value>> {
    let id = required_id(body.booking_id)?;
    let selected_time = match body.selected_time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_event_datetime(raw)
                .ok_or_else(|| AppError::validation(format!("invalid selectedTime: {raw}")))?,
        ),
    };

    let outcome = workflow::confirm(&state, &id, selected_time).await?;
    Ok(Json(json!({
        "success": true,
        "booking": outcome.booking,
        "notifications": outcome.notifications,
    })))
}
