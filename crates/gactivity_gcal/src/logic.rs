// --- File: crates/gactivity_gcal/src/logic.rs ---
use gactivity_common::format::{format_utc_millis, normalize_timestamp, total_minutes, truncated};
use gactivity_common::{external_service_error, CalendarEventRecord, GactivityError};
use google_calendar3::api::{Event, EventAttendee, EventDateTime};
use thiserror::Error;

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum GcalError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("HTTPS connector error: {0}")]
    ConnectorError(String),
}

impl From<GcalError> for GactivityError {
    fn from(err: GcalError) -> Self {
        external_service_error("Google Calendar", err)
    }
}

/// Events lacking any of these fields cannot be stored and are skipped:
/// summary, event type, status, created, creator, organizer.
pub fn is_known_event(event: &Event) -> bool {
    event.summary.is_some()
        && event.event_type.is_some()
        && event.status.is_some()
        && event.created.is_some()
        && event.creator.is_some()
        && event.organizer.is_some()
}

/// `{"Email": "<email>", "Response Status": "<status>"}`
pub fn format_attendee(attendee: &EventAttendee) -> String {
    format!(
        "{{\"Email\": \"{}\", \"Response Status\": \"{}\"}}",
        attendee.email.as_deref().unwrap_or("null"),
        attendee.response_status.as_deref().unwrap_or("null")
    )
}

/// Timed events carry `dateTime`, all-day events only `date`.
fn event_time(value: Option<&EventDateTime>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if let Some(date_time) = value.date_time {
        return format_utc_millis(date_time);
    }
    value
        .date
        .map(|date| normalize_timestamp(&date.format("%Y-%m-%d").to_string()))
        .unwrap_or_default()
}

/// Converts an API event into a storable record, or `None` for unknown events.
pub fn to_record(event: &Event, attendee_preview: usize) -> Option<CalendarEventRecord> {
    if !is_known_event(event) {
        return None;
    }

    let created = event.created.map(format_utc_millis)?;
    let updated = event
        .updated
        .map(format_utc_millis)
        .unwrap_or_else(|| created.clone());

    let attendees: Vec<String> = event
        .attendees
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(format_attendee)
        .collect();

    let start_time = event_time(event.start.as_ref());
    let end_time = event_time(event.end.as_ref());
    let total_time = total_minutes(&start_time, &end_time).unwrap_or_default();

    Some(CalendarEventRecord {
        event_id: event.id.clone().unwrap_or_default(),
        event_title: event.summary.clone().unwrap_or_default(),
        event_type: event.event_type.clone().unwrap_or_default(),
        status: event.status.clone().unwrap_or_default(),
        created_time: created,
        updated_time: updated,
        creator: event
            .creator
            .as_ref()
            .and_then(|creator| creator.email.clone())
            .unwrap_or_default(),
        organizer: event
            .organizer
            .as_ref()
            .and_then(|organizer| organizer.email.clone())
            .unwrap_or_default(),
        event_link: event.html_link.clone().unwrap_or_default(),
        attendees: truncated(&attendees, attendee_preview),
        start_time,
        end_time,
        total_time,
    })
}

/// Maps a page of events, dropping the unknown ones.
pub fn to_records(events: &[Event], attendee_preview: usize) -> Vec<CalendarEventRecord> {
    events
        .iter()
        .filter_map(|event| to_record(event, attendee_preview))
        .collect()
}
