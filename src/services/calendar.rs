use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::json;

use crate::models::Booking;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CalendarEvent {
    pub fn for_booking(booking: &Booking, duration_hours: i64) -> Self {
        let status = booking.status.as_str().replace('_', " ");
        Self {
            summary: format!(
                "Catering: {} ({} guests)",
                booking.client.name, booking.event.guest_count
            ),
            description: format!(
                "Status: {status}\nClient: {} <{}> {}\nEstimated quote: {}\n\n{}",
                booking.client.name,
                booking.client.email,
                booking.client.phone,
                booking
                    .estimated_quote
                    .map(|q| format!("${q:.2}"))
                    .unwrap_or_else(|| "n/a".to_string()),
                booking.chat_summary,
            ),
            location: booking.event.location.clone(),
            start: booking.event.start(),
            end: booking.event.end(duration_hours),
        }
    }
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Creates an event and returns the provider's id for it.
    async fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String>;

    async fn update_event(&self, event_id: &str, event: &CalendarEvent) -> anyhow::Result<()>;
}

/// Google Calendar v3 REST API authorised with a bearer access token.
pub struct GoogleCalendar {
    calendar_id: String,
    access_token: String,
    time_zone: String,
    client: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(calendar_id: String, access_token: String, time_zone: String) -> Self {
        Self {
            calendar_id,
            access_token,
            time_zone,
            client: reqwest::Client::new(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            self.calendar_id
        )
    }

    fn body(&self, event: &CalendarEvent) -> serde_json::Value {
        let stamp = |t: &NaiveDateTime| t.format("%Y-%m-%dT%H:%M:%S").to_string();
        json!({
            "summary": event.summary,
            "description": event.description,
            "location": event.location,
            "start": { "dateTime": stamp(&event.start), "timeZone": self.time_zone },
            "end": { "dateTime": stamp(&event.end), "timeZone": self.time_zone },
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn create_event(&self, event: &CalendarEvent) -> anyhow::Result<String> {
        let data: serde_json::Value = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&self.body(event))
            .send()
            .await
            .context("failed to call calendar API")?
            .error_for_status()
            .context("calendar API returned error")?
            .json()
            .await
            .context("failed to parse calendar response")?;

        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing id in calendar response"))
    }

    async fn update_event(&self, event_id: &str, event: &CalendarEvent) -> anyhow::Result<()> {
        self.client
            .patch(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(&self.access_token)
            .json(&self.body(event))
            .send()
            .await
            .context("failed to call calendar API")?
            .error_for_status()
            .context("calendar API returned error")?;
        Ok(())
    }
}

fn escape_ics(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

pub fn generate_ics(booking: &Booking, business_name: &str, duration_hours: i64) -> String {
    let event = CalendarEvent::for_booking(booking, duration_hours);
    let dtstart = event.start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = event.end.format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = booking.updated_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@chefbook", booking.id);

    let summary = escape_ics(&format!("{} - {}", business_name, event.summary));
    let description = escape_ics(&event.description);
    let location = escape_ics(&event.location);

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Chefbook//Catering Bookings//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}
