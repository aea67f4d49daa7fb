use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::middleware::AdminSession;
use crate::models::{Booking, BookingStatus};
use crate::services::booking as workflow;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: usize = 100;

fn parse_status(raw: &str) -> Result<BookingStatus> {
    BookingStatus::parse(raw.trim()).ok_or_else(|| AppError::validation(format!("Invalid status: {raw}")))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    Ok(Json(workflow::list(&state, status, Some(limit)).await?))
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    Ok(Json(workflow::load(&state, &id).await?))
}

// PATCH /api/admin/bookings
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Value>> {
    let (Some(id), Some(status)) = (
        body.id.filter(|v| !v.trim().is_empty()),
        body.status.filter(|v| !v.trim().is_empty()),
    ) else {
        return Err(AppError::validation("id and status are required"));
    };

    let status = parse_status(&status)?;
    if !status.admin_settable() {
        return Err(AppError::validation(format!("Invalid status: {status}")));
    }

    let booking = workflow::set_status(&state, id.trim(), status, &session.username).await?;
    Ok(Json(json!({ "success": true, "booking": booking })))
}

// GET /api/admin/bookings/:id/ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let booking_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);
    let booking = workflow::load(&state, booking_id).await?;

    let ics = generate_ics(&booking, &state.config.business_name, state.config.event_duration_hours);
    let filename = format!("booking-{booking_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
