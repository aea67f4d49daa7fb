use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MAX_EVENT_DURATION_HOURS;
use crate::errors::AppError;
use crate::models::ChatMessage;

pub const COLLECTION: &str = "bookings";

pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Start hour used when a booking's time of day is missing or free text.
const DEFAULT_START_HOUR: u32 = 17;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingReview,
    Approved,
    Rejected,
    SuggestedAlternative,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingReview => "pending_review",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::SuggestedAlternative => "suggested_alternative",
            BookingStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_review" => Some(BookingStatus::PendingReview),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            "suggested_alternative" => Some(BookingStatus::SuggestedAlternative),
            "confirmed" => Some(BookingStatus::Confirmed),
            _ => None,
        }
    }

    /// Statuses an admin may set directly from the dashboard.
    pub fn admin_settable(&self) -> bool {
        !matches!(self, BookingStatus::Confirmed)
    }

    pub fn can_move_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (PendingReview, Approved | Rejected | SuggestedAlternative | Confirmed)
                | (SuggestedAlternative, Approved | Rejected | SuggestedAlternative | Confirmed)
                | (Approved, Rejected | Confirmed)
        )
    }

    /// Only the admin status shortcut can send a booking back to review.
    pub fn can_reopen(&self) -> bool {
        use BookingStatus::*;
        matches!(self, Approved | Rejected | SuggestedAlternative)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransitionError {
    #[error("cannot move booking from {from} to {to}")]
    NotAllowed {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("selected time {0} is not one of the suggested options")]
    UnknownOption(NaiveDateTime),
}

#[derive(Debug, Clone)]
pub enum BookingAction {
    Accept,
    Reject { reason: String },
    Suggest { times: Vec<NaiveDateTime> },
    Confirm { selected_time: Option<NaiveDateTime> },
    SetStatus(BookingStatus),
}

impl BookingAction {
    pub fn target(&self) -> BookingStatus {
        match self {
            BookingAction::Accept => BookingStatus::Approved,
            BookingAction::Reject { .. } => BookingStatus::Rejected,
            BookingAction::Suggest { .. } => BookingStatus::SuggestedAlternative,
            BookingAction::Confirm { .. } => BookingStatus::Confirmed,
            BookingAction::SetStatus(status) => *status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub location: String,
    pub guest_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EventDetails {
    pub fn start(&self) -> NaiveDateTime {
        let time = self
            .time
            .as_deref()
            .and_then(parse_time_of_day)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or_default());
        self.date.and_time(time)
    }

    pub fn end(&self, duration_hours: i64) -> NaiveDateTime {
        self.start() + Duration::hours(duration_hours.clamp(1, MAX_EVENT_DURATION_HOURS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client: ClientInfo,
    pub event: EventDetails,
    #[serde(default)]
    pub estimated_quote: Option<f64>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub chat_summary: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_times: Option<Vec<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Booking {
    pub fn new(request: NewBooking, chat_summary: String, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            client: request.client,
            event: request.event,
            estimated_quote: request.estimated_quote,
            chat_history: request.chat_history,
            chat_summary,
            status: BookingStatus::PendingReview,
            suggested_times: None,
            rejection_reason: None,
            approved_at: None,
            rejected_at: None,
            suggested_at: None,
            confirmed_at: None,
            calendar_event_id: None,
            updated_by: None,
        }
    }

    /// Applies a workflow action, enforcing the transition table.
    pub fn apply(
        &mut self,
        action: BookingAction,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let next = action.target();
        let allowed = match action {
            BookingAction::SetStatus(BookingStatus::PendingReview) => self.status.can_reopen(),
            _ => self.status.can_move_to(next),
        };
        if !allowed {
            return Err(TransitionError::NotAllowed {
                from: self.status,
                to: next,
            });
        }

        match action {
            BookingAction::Accept => self.approved_at = Some(now),
            BookingAction::Reject { reason } => {
                self.rejection_reason = Some(reason);
                self.rejected_at = Some(now);
            }
            BookingAction::Suggest { times } => {
                self.suggested_times = Some(times);
                self.suggested_at = Some(now);
            }
            BookingAction::Confirm { selected_time } => {
                if let Some(selected) = selected_time {
                    let offered = self
                        .suggested_times
                        .as_ref()
                        .filter(|times| !times.is_empty());
                    if self.status == BookingStatus::SuggestedAlternative {
                        if let Some(times) = offered {
                            if !times.contains(&selected) {
                                return Err(TransitionError::UnknownOption(selected));
                            }
                        }
                    }
                    self.event.date = selected.date();
                    self.event.time = Some(selected.format("%H:%M").to_string());
                }
                self.confirmed_at = Some(now);
            }
            BookingAction::SetStatus(status) => match status {
                BookingStatus::Approved => self.approved_at = Some(now),
                BookingStatus::Rejected => self.rejected_at = Some(now),
                BookingStatus::SuggestedAlternative => self.suggested_at = Some(now),
                BookingStatus::PendingReview | BookingStatus::Confirmed => {}
            },
        }

        if next != BookingStatus::SuggestedAlternative {
            self.suggested_times = None;
        }
        self.status = next;
        self.updated_at = now;
        self.updated_by = Some(actor.to_string());
        Ok(())
    }
}

/// Raw booking submission from the public site. Every field is optional so
/// that missing values surface as one validation error listing all of them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub guest_count: Option<Value>,
    pub notes: Option<String>,
    pub estimated_quote: Option<f64>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client: ClientInfo,
    pub event: EventDetails,
    pub estimated_quote: Option<f64>,
    pub chat_history: Vec<ChatMessage>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_guest_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl BookingRequest {
    pub fn validate(self) -> Result<NewBooking, AppError> {
        let name = present(self.name);
        let email = present(self.email);
        let phone = present(self.phone);
        let event_date = present(self.event_date);
        let location = present(self.location);
        let guest_count = self.guest_count.filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });

        let missing: Vec<&str> = [
            ("name", name.is_none()),
            ("email", email.is_none()),
            ("phone", phone.is_none()),
            ("eventDate", event_date.is_none()),
            ("location", location.is_none()),
            ("guestCount", guest_count.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (Some(name), Some(email), Some(phone), Some(event_date), Some(location), Some(guest_count)) =
            (name, email, phone, event_date, location, guest_count)
        else {
            return Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let guest_count = parse_guest_count(&guest_count)
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::validation("guestCount must be a positive number"))?;

        if !email.contains('@') {
            return Err(AppError::validation("email is not a valid address"));
        }

        let date = NaiveDate::parse_from_str(&event_date, "%Y-%m-%d")
            .map_err(|_| AppError::validation("eventDate must be formatted as YYYY-MM-DD"))?;

        if let Some(quote) = self.estimated_quote {
            if !quote.is_finite() || quote < 0.0 {
                return Err(AppError::validation("estimatedQuote must be a non-negative number"));
            }
        }

        Ok(NewBooking {
            client: ClientInfo { name, email, phone },
            event: EventDetails {
                date,
                time: present(self.event_time),
                location,
                guest_count,
                notes: present(self.notes),
            },
            estimated_quote: self.estimated_quote,
            chat_history: self.chat_history,
        })
    }
}

/// Parses the datetimes clients and admins send: RFC 3339 (the wall-clock time
/// as written is kept) or a bare `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_event_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> BookingRequest {
        BookingRequest {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some("555-0100".to_string()),
            event_date: Some("2025-06-14".to_string()),
            event_time: Some("18:30".to_string()),
            location: Some("Brooklyn".to_string()),
            guest_count: Some(json!(12)),
            notes: None,
            estimated_quote: Some(900.0),
            chat_history: vec![],
        }
    }

    fn booking() -> Booking {
        Booking::new(request().validate().unwrap(), "summary".to_string(), Utc::now())
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_event_datetime(raw).unwrap()
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let req = BookingRequest {
            name: Some("  ".to_string()),
            phone: None,
            guest_count: Some(Value::Null),
            ..request()
        };
        let err = req.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("name"));
        assert!(msg.contains("phone"));
        assert!(msg.contains("guestCount"));
        assert!(!msg.contains("email"));
    }

    #[test]
    fn test_guest_count_accepts_numeric_string() {
        let req = BookingRequest {
            guest_count: Some(json!(" 20 ")),
            ..request()
        };
        assert_eq!(req.validate().unwrap().event.guest_count, 20);
    }

    #[test]
    fn test_guest_count_must_be_numeric() {
        let req = BookingRequest {
            guest_count: Some(json!("twenty")),
            ..request()
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let req = BookingRequest {
            guest_count: Some(json!(0)),
            ..request()
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_event_date_format() {
        let req = BookingRequest {
            event_date: Some("June 14".to_string()),
            ..request()
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_booking_starts_in_review() {
        let b = booking();
        assert_eq!(b.status, BookingStatus::PendingReview);
        assert!(!b.id.is_empty());
        assert!(b.suggested_times.is_none());
    }

    #[test]
    fn test_accept_and_reject() {
        let mut b = booking();
        b.apply(BookingAction::Accept, "admin", Utc::now()).unwrap();
        assert_eq!(b.status, BookingStatus::Approved);
        assert!(b.approved_at.is_some());
        assert_eq!(b.updated_by.as_deref(), Some("admin"));

        let mut b = booking();
        b.apply(
            BookingAction::Reject {
                reason: "fully booked".to_string(),
            },
            "admin",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(b.status, BookingStatus::Rejected);
        assert_eq!(b.rejection_reason.as_deref(), Some("fully booked"));
    }

    #[test]
    fn test_rejected_booking_cannot_be_confirmed() {
        let mut b = booking();
        b.apply(
            BookingAction::Reject {
                reason: DEFAULT_REJECTION_REASON.to_string(),
            },
            "admin",
            Utc::now(),
        )
        .unwrap();

        let err = b
            .apply(BookingAction::Confirm { selected_time: None }, "client", Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotAllowed {
                from: BookingStatus::Rejected,
                to: BookingStatus::Confirmed,
            }
        );
        assert_eq!(b.status, BookingStatus::Rejected);
    }

    #[test]
    fn test_confirmed_is_terminal() {
        let mut b = booking();
        b.apply(BookingAction::Confirm { selected_time: None }, "client", Utc::now())
            .unwrap();
        assert!(b.apply(BookingAction::Accept, "admin", Utc::now()).is_err());
        assert!(b
            .apply(BookingAction::SetStatus(BookingStatus::PendingReview), "admin", Utc::now())
            .is_err());
    }

    #[test]
    fn test_suggest_then_confirm_selected_time() {
        let mut b = booking();
        let options = vec![at("2025-06-20T19:00:00"), at("2025-06-21T12:00:00")];
        b.apply(
            BookingAction::Suggest {
                times: options.clone(),
            },
            "admin",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(b.status, BookingStatus::SuggestedAlternative);
        assert_eq!(b.suggested_times.as_ref(), Some(&options));

        b.apply(
            BookingAction::Confirm {
                selected_time: Some(options[1]),
            },
            "client",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.event.date, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
        assert_eq!(b.event.time.as_deref(), Some("12:00"));
        assert!(b.confirmed_at.is_some());
        assert!(b.suggested_times.is_none());
    }

    #[test]
    fn test_confirm_rejects_unoffered_time() {
        let mut b = booking();
        b.apply(
            BookingAction::Suggest {
                times: vec![at("2025-06-20T19:00:00")],
            },
            "admin",
            Utc::now(),
        )
        .unwrap();

        let err = b
            .apply(
                BookingAction::Confirm {
                    selected_time: Some(at("2025-07-01T19:00:00")),
                },
                "client",
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::UnknownOption(_)));
        assert_eq!(b.status, BookingStatus::SuggestedAlternative);
    }

    #[test]
    fn test_admin_reopen_clears_suggestions() {
        let mut b = booking();
        b.apply(
            BookingAction::Suggest {
                times: vec![at("2025-06-20T19:00:00")],
            },
            "admin",
            Utc::now(),
        )
        .unwrap();
        b.apply(BookingAction::SetStatus(BookingStatus::PendingReview), "admin", Utc::now())
            .unwrap();
        assert_eq!(b.status, BookingStatus::PendingReview);
        assert!(b.suggested_times.is_none());

        // already in review: nothing to reopen
        assert!(b
            .apply(BookingAction::SetStatus(BookingStatus::PendingReview), "admin", Utc::now())
            .is_err());
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            BookingStatus::PendingReview,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::SuggestedAlternative,
            BookingStatus::Confirmed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("cancelled"), None);
        assert!(!BookingStatus::Confirmed.admin_settable());
    }

    #[test]
    fn test_parse_event_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        assert_eq!(parse_event_datetime("2025-06-20T19:00:00Z"), Some(expected));
        assert_eq!(parse_event_datetime("2025-06-20T19:00:00-04:00"), Some(expected));
        assert_eq!(parse_event_datetime("2025-06-20T19:00"), Some(expected));
        assert_eq!(parse_event_datetime("2025-06-20 19:00:00"), Some(expected));
        assert_eq!(parse_event_datetime("next friday"), None);
    }

    #[test]
    fn test_event_start_defaults_for_free_text_time() {
        let mut event = booking().event;
        assert_eq!(event.start().format("%H:%M").to_string(), "18:30");

        event.time = Some("evening".to_string());
        assert_eq!(event.start().format("%H:%M").to_string(), "17:00");

        event.time = Some("7:15 pm".to_string());
        assert_eq!(event.start().format("%H:%M").to_string(), "19:15");
        assert_eq!(event.end(4).format("%H:%M").to_string(), "23:15");
    }

    #[test]
    fn test_event_end_bounds_duration() {
        let event = booking().event;
        assert_eq!(event.end(0), event.start() + Duration::hours(1));
        assert_eq!(
            event.end(i64::MAX),
            event.start() + Duration::hours(MAX_EVENT_DURATION_HOURS)
        );
    }
}
