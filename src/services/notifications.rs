//! Email bodies for the booking workflow. Every interpolated value is
//! HTML-escaped; the plain-text part carries the same information.

use anyhow::Context;
use chrono::NaiveDateTime;
use html_escape::encode_text;
use reqwest::Url;

use crate::models::Booking;

fn quote_line(booking: &Booking) -> String {
    booking
        .estimated_quote
        .map(|q| format!("${q:.2}"))
        .unwrap_or_else(|| "to be confirmed".to_string())
}

fn when(booking: &Booking) -> String {
    match &booking.event.time {
        Some(time) => format!("{} at {}", booking.event.date.format("%A, %B %-d, %Y"), time),
        None => booking.event.date.format("%A, %B %-d, %Y").to_string(),
    }
}

fn option_label(time: &NaiveDateTime) -> String {
    time.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

/// Link the client follows to accept one of the suggested times.
pub fn confirm_link(site_url: &str, booking_id: &str, time: &NaiveDateTime) -> anyhow::Result<String> {
    let base = format!("{}/booking/confirm", site_url.trim_end_matches('/'));
    let selected = time.format("%Y-%m-%dT%H:%M:%S").to_string();
    let url = Url::parse_with_params(&base, &[("bookingId", booking_id), ("selectedTime", selected.as_str())])
        .with_context(|| format!("invalid SITE_URL: {site_url}"))?;
    Ok(url.to_string())
}

fn details_html(booking: &Booking) -> String {
    let notes = booking
        .event
        .notes
        .as_deref()
        .map(|n| format!("<li><strong>Notes:</strong> {}</li>", encode_text(n)))
        .unwrap_or_default();
    format!(
        "<ul>\
         <li><strong>When:</strong> {}</li>\
         <li><strong>Where:</strong> {}</li>\
         <li><strong>Guests:</strong> {}</li>\
         <li><strong>Estimated quote:</strong> {}</li>\
         {notes}</ul>",
        encode_text(&when(booking)),
        encode_text(&booking.event.location),
        booking.event.guest_count,
        quote_line(booking),
    )
}

fn details_text(booking: &Booking) -> String {
    let mut text = format!(
        "When: {}\nWhere: {}\nGuests: {}\nEstimated quote: {}\n",
        when(booking),
        booking.event.location,
        booking.event.guest_count,
        quote_line(booking),
    );
    if let Some(notes) = &booking.event.notes {
        text.push_str(&format!("Notes: {notes}\n"));
    }
    text
}

pub struct Email {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn client_acknowledgement(booking: &Booking, business_name: &str) -> Email {
    let name = &booking.client.name;
    Email {
        subject: format!("We received your booking request - {business_name}"),
        html: format!(
            "<p>Hi {},</p>\
             <p>Thanks for your request. We will review it and get back to you shortly.</p>\
             {}\
             <p>{}</p>",
            encode_text(name),
            details_html(booking),
            encode_text(business_name),
        ),
        text: format!(
            "Hi {name},\n\nThanks for your request. We will review it and get back to you shortly.\n\n{}\n{business_name}\n",
            details_text(booking)
        ),
    }
}

pub fn admin_new_booking(booking: &Booking, site_url: &str) -> Email {
    let dashboard = format!("{}/admin/bookings/{}", site_url.trim_end_matches('/'), booking.id);
    let client = &booking.client;
    Email {
        subject: format!(
            "New booking request: {} ({} guests, {})",
            client.name, booking.event.guest_count, booking.event.date
        ),
        html: format!(
            "<p>New booking request from <strong>{}</strong> ({}, {}).</p>\
             {}\
             <p><strong>Conversation summary:</strong><br>{}</p>\
             <p><a href=\"{}\">Review in the dashboard</a></p>",
            encode_text(&client.name),
            encode_text(&client.email),
            encode_text(&client.phone),
            details_html(booking),
            encode_text(&booking.chat_summary),
            encode_text(&dashboard),
        ),
        text: format!(
            "New booking request from {} ({}, {}).\n\n{}\nConversation summary:\n{}\n\nReview: {dashboard}\n",
            client.name,
            client.email,
            client.phone,
            details_text(booking),
            booking.chat_summary,
        ),
    }
}

pub fn suggested_times(booking: &Booking, business_name: &str, site_url: &str) -> anyhow::Result<Email> {
    let times = booking.suggested_times.as_deref().unwrap_or_default();
    let mut html_items = String::new();
    let mut text_items = String::new();
    for time in times {
        let link = confirm_link(site_url, &booking.id, time)?;
        html_items.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            encode_text(&link),
            encode_text(&option_label(time)),
        ));
        text_items.push_str(&format!("- {}: {link}\n", option_label(time)));
    }

    let name = &booking.client.name;
    Ok(Email {
        subject: format!("New times for your event - {business_name}"),
        html: format!(
            "<p>Hi {},</p>\
             <p>Unfortunately we can't make {} work. Could one of these times suit you instead?</p>\
             <ul>{html_items}</ul>\
             <p>Pick one to confirm your booking.</p>\
             <p>{}</p>",
            encode_text(name),
            encode_text(&when(booking)),
            encode_text(business_name),
        ),
        text: format!(
            "Hi {name},\n\nUnfortunately we can't make {} work. Could one of these times suit you instead?\n\n{text_items}\nPick one to confirm your booking.\n\n{business_name}\n",
            when(booking)
        ),
    })
}

pub fn client_confirmation(booking: &Booking, business_name: &str) -> Email {
    let name = &booking.client.name;
    Email {
        subject: format!("Your booking is confirmed - {business_name}"),
        html: format!(
            "<p>Hi {},</p>\
             <p>Your event is confirmed. We look forward to cooking for you!</p>\
             {}\
             <p>{}</p>",
            encode_text(name),
            details_html(booking),
            encode_text(business_name),
        ),
        text: format!(
            "Hi {name},\n\nYour event is confirmed. We look forward to cooking for you!\n\n{}\n{business_name}\n",
            details_text(booking)
        ),
    }
}

pub fn admin_confirmation(booking: &Booking) -> Email {
    let client = &booking.client;
    Email {
        subject: format!("Booking confirmed: {} on {}", client.name, booking.event.date),
        html: format!(
            "<p><strong>{}</strong> confirmed their booking.</p>{}",
            encode_text(&client.name),
            details_html(booking),
        ),
        text: format!("{} confirmed their booking.\n\n{}", client.name, details_text(booking)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{parse_event_datetime, BookingRequest};
    use chrono::Utc;

    fn booking() -> Booking {
        let request = BookingRequest {
            name: Some("<b>Mallory</b>".to_string()),
            email: Some("mallory@example.com".to_string()),
            phone: Some("555-0199".to_string()),
            event_date: Some("2025-09-05".to_string()),
            location: Some("Rooftop & Co".to_string()),
            guest_count: Some(serde_json::json!(30)),
            estimated_quote: Some(2400.0),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let mut booking = Booking::new(request, "Wedding rehearsal".to_string(), Utc::now());
        booking.id = "b-1".to_string();
        booking
    }

    #[test]
    fn test_client_name_is_escaped() {
        let email = client_acknowledgement(&booking(), "Chef Rosa");
        assert!(email.html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(!email.html.contains("<b>Mallory"));
        assert!(email.html.contains("Rooftop &amp; Co"));
        assert!(email.text.contains("$2400.00"));
    }

    #[test]
    fn test_confirm_link_encodes_params() {
        let time = parse_event_datetime("2025-09-06T18:00:00").unwrap();
        let link = confirm_link("https://chef.example.com/", "b 1", &time).unwrap();
        assert_eq!(
            link,
            "https://chef.example.com/booking/confirm?bookingId=b+1&selectedTime=2025-09-06T18%3A00%3A00"
        );
    }

    #[test]
    fn test_suggested_times_one_link_per_option() {
        let mut b = booking();
        b.suggested_times = Some(vec![
            parse_event_datetime("2025-09-06T18:00:00").unwrap(),
            parse_event_datetime("2025-09-07T12:30:00").unwrap(),
        ]);
        let email = suggested_times(&b, "Chef Rosa", "https://chef.example.com").unwrap();
        assert_eq!(email.html.matches("/booking/confirm?").count(), 2);
        assert_eq!(email.text.matches("/booking/confirm?").count(), 2);
        assert!(email.text.contains("Saturday, September 6, 2025 at 6:00 PM"));
    }

    #[test]
    fn test_admin_email_links_dashboard() {
        let email = admin_new_booking(&booking(), "https://chef.example.com");
        assert!(email.text.contains("https://chef.example.com/admin/bookings/b-1"));
        assert!(email.text.contains("Wedding rehearsal"));
    }
}
