//! Booking workflow: persistence first, then best-effort notifications whose
//! outcomes are reported back to the caller.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::db;
use crate::errors::{AppError, Result};
use crate::models::booking::{self, DEFAULT_REJECTION_REASON};
use crate::models::{Booking, BookingAction, BookingRequest, BookingStatus};
use crate::services::ai::summary::summarize_chat;
use crate::services::calendar::CalendarEvent;
use crate::services::email::EmailMessage;
use crate::services::notifications::{self, Email};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Sent,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationOutcome {
    pub channel: &'static str,
    pub status: Delivery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    fn sent(channel: &'static str) -> Self {
        Self {
            channel,
            status: Delivery::Sent,
            error: None,
        }
    }

    fn skipped(channel: &'static str, reason: &str) -> Self {
        Self {
            channel,
            status: Delivery::Skipped,
            error: Some(reason.to_string()),
        }
    }

    fn failed(channel: &'static str, error: &anyhow::Error) -> Self {
        Self {
            channel,
            status: Delivery::Failed,
            error: Some(format!("{error:#}")),
        }
    }
}

pub struct Outcome {
    pub booking: Booking,
    pub notifications: Vec<NotificationOutcome>,
}

pub async fn load(state: &AppState, id: &str) -> Result<Booking> {
    db::fetch(state.store.as_ref(), booking::COLLECTION, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking", id))
}

pub async fn list(state: &AppState, status: Option<BookingStatus>, limit: Option<usize>) -> Result<Vec<Booking>> {
    let docs = state.store.list(booking::COLLECTION, None).await?;
    let mut bookings: Vec<Booking> = db::decode_all(booking::COLLECTION, docs);
    if let Some(status) = status {
        bookings.retain(|b| b.status == status);
    }
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(limit) = limit {
        bookings.truncate(limit);
    }
    Ok(bookings)
}

async fn save(state: &AppState, booking: &Booking) -> Result<()> {
    if !db::replace(state.store.as_ref(), booking::COLLECTION, &booking.id, booking).await? {
        return Err(AppError::not_found("Booking", &booking.id));
    }
    Ok(())
}

async fn transition(state: &AppState, id: &str, action: BookingAction, actor: &str) -> Result<Booking> {
    let mut booking = load(state, id).await?;
    let from = booking.status;
    booking.apply(action, actor, Utc::now())?;
    save(state, &booking).await?;

    tracing::info!(
        booking_id = %booking.id,
        from = %from,
        to = %booking.status,
        actor,
        "booking status changed"
    );
    Ok(booking)
}

pub async fn create(state: &AppState, request: BookingRequest) -> Result<Outcome> {
    let new = request.validate()?;
    let summary = summarize_chat(state.llm.as_ref(), &new.chat_history).await;
    let mut booking = Booking::new(new, summary, Utc::now());

    db::insert(state.store.as_ref(), booking::COLLECTION, &booking.id, &booking).await?;
    tracing::info!(
        booking_id = %booking.id,
        guests = booking.event.guest_count,
        date = %booking.event.date,
        "booking created"
    );

    let business = &state.config.business_name;
    let mut notifications = vec![
        send_to_client(state, &booking, notifications::client_acknowledgement(&booking, business)).await,
        send_to_admin(
            state,
            notifications::admin_new_booking(&booking, &state.config.site_url),
        )
        .await,
    ];
    notifications.push(sync_calendar(state, &mut booking).await);

    Ok(Outcome {
        booking,
        notifications,
    })
}

pub async fn accept(state: &AppState, id: &str, actor: &str) -> Result<Booking> {
    transition(state, id, BookingAction::Accept, actor).await
}

pub async fn reject(state: &AppState, id: &str, reason: Option<String>, actor: &str) -> Result<Booking> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
    transition(state, id, BookingAction::Reject { reason }, actor).await
}

/// Offers alternative times. The options are validated by the caller before
/// anything is read or sent.
pub async fn suggest(state: &AppState, id: &str, times: Vec<NaiveDateTime>, actor: &str) -> Result<Outcome> {
    if times.is_empty() {
        return Err(AppError::validation("At least one suggested time is required"));
    }
    let booking = transition(state, id, BookingAction::Suggest { times }, actor).await?;

    let outcome = match notifications::suggested_times(
        &booking,
        &state.config.business_name,
        &state.config.site_url,
    ) {
        Ok(email) => send_to_client(state, &booking, email).await,
        Err(e) => {
            tracing::error!(booking_id = %booking.id, error = %e, "failed to build suggestion email");
            NotificationOutcome::failed("client_email", &e)
        }
    };

    Ok(Outcome {
        booking,
        notifications: vec![outcome],
    })
}

pub async fn confirm(state: &AppState, id: &str, selected_time: Option<NaiveDateTime>) -> Result<Outcome> {
    let mut booking = transition(state, id, BookingAction::Confirm { selected_time }, "client").await?;

    let business = &state.config.business_name;
    let mut notifications = vec![
        send_to_client(state, &booking, notifications::client_confirmation(&booking, business)).await,
        send_to_admin(state, notifications::admin_confirmation(&booking)).await,
    ];
    notifications.push(sync_calendar(state, &mut booking).await);

    Ok(Outcome {
        booking,
        notifications,
    })
}

/// Dashboard shortcut that moves a booking to any status except `confirmed`.
pub async fn set_status(state: &AppState, id: &str, status: BookingStatus, actor: &str) -> Result<Booking> {
    if !status.admin_settable() {
        return Err(AppError::validation(format!(
            "Status '{status}' can only be reached through client confirmation"
        )));
    }
    transition(state, id, BookingAction::SetStatus(status), actor).await
}

// ── Notifications ──

async fn send_email(state: &AppState, channel: &'static str, to: &str, email: Email) -> NotificationOutcome {
    let Some(sender) = state.email.as_deref() else {
        tracing::info!(channel, subject = %email.subject, "email not configured, skipping notification");
        return NotificationOutcome::skipped(channel, "email not configured");
    };
    if to.trim().is_empty() {
        return NotificationOutcome::skipped(channel, "no recipient address");
    }

    let message = EmailMessage {
        to: to.to_string(),
        subject: email.subject,
        html: email.html,
        text: email.text,
    };
    match sender.send(&message).await {
        Ok(()) => {
            tracing::info!(channel, to = %message.to, "notification sent");
            NotificationOutcome::sent(channel)
        }
        Err(e) => {
            tracing::error!(channel, to = %message.to, error = %e, "failed to send notification");
            NotificationOutcome::failed(channel, &e)
        }
    }
}

async fn send_to_client(state: &AppState, booking: &Booking, email: Email) -> NotificationOutcome {
    send_email(state, "client_email", &booking.client.email, email).await
}

async fn send_to_admin(state: &AppState, email: Email) -> NotificationOutcome {
    send_email(state, "admin_email", &state.config.admin_email, email).await
}

/// Creates the calendar event for a booking, or updates it when one was
/// already created. A newly created event id is stored back on the booking.
async fn sync_calendar(state: &AppState, booking: &mut Booking) -> NotificationOutcome {
    const CHANNEL: &str = "calendar";

    let Some(calendar) = state.calendar.as_deref() else {
        return NotificationOutcome::skipped(CHANNEL, "calendar not configured");
    };
    let event = CalendarEvent::for_booking(booking, state.config.event_duration_hours);

    if let Some(event_id) = &booking.calendar_event_id {
        return match calendar.update_event(event_id, &event).await {
            Ok(()) => NotificationOutcome::sent(CHANNEL),
            Err(e) => {
                tracing::error!(booking_id = %booking.id, event_id = %event_id, error = %e, "failed to update calendar event");
                NotificationOutcome::failed(CHANNEL, &e)
            }
        };
    }

    match calendar.create_event(&event).await {
        Ok(event_id) => {
            // Only the event id is written: the stored booking may have moved on
            // while the notifications were going out.
            let stored = state
                .store
                .set_field(booking::COLLECTION, &booking.id, "calendarEventId", &Value::from(event_id.as_str()))
                .await;
            match stored {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(booking_id = %booking.id, "booking deleted before calendar event id was stored")
                }
                Err(e) => {
                    tracing::warn!(booking_id = %booking.id, error = %e, "failed to store calendar event id")
                }
            }
            booking.calendar_event_id = Some(event_id);
            NotificationOutcome::sent(CHANNEL)
        }
        Err(e) => {
            tracing::error!(booking_id = %booking.id, error = %e, "failed to create calendar event");
            NotificationOutcome::failed(CHANNEL, &e)
        }
    }
}
