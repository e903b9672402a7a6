// --- File: crates/services/gactivity_backend/src/views.rs ---
use gactivity_common::html::{escape_html, page, table};
use gactivity_common::{CalendarEventRecord, DriveActivityRecord};

pub const CALENDAR_HEADERS: [&str; 13] = [
    "Event ID",
    "Event Title",
    "Event Type",
    "Status",
    "Created Time",
    "Updated Time",
    "Creator",
    "Organizer",
    "Event Link",
    "Attendees",
    "Start Time",
    "End Time",
    "Total Time",
];

pub const DRIVE_HEADERS: [&str; 8] = [
    "Activity ID",
    "Time Activity",
    "User Action",
    "Primary Action",
    "Sub Action",
    "Sub Action Type",
    "Sub Action Result",
    "Item",
];

pub fn index_page(email: Option<&str>) -> String {
    let account = match email {
        Some(email) => format!(
            "<p>Signed in as {}. <a href=\"/logout\">Sign out</a></p>",
            escape_html(email)
        ),
        None => "<p><a href=\"/login\">Sign in with Google</a></p>".to_string(),
    };
    let body = format!(
        "<h1>Google Workspace Activity</h1>\n{}\n<ul>\n\
         <li><a href=\"/calendar-collection\">Collect Google Calendar events</a></li>\n\
         <li><a href=\"/drive-activity\">Collect Google Drive activity</a></li>\n\
         <li><a href=\"/bigquery/datasets\">BigQuery datasets</a></li>\n</ul>",
        account
    );
    page("Google Workspace Activity", &body)
}

pub fn calendar_page(email: &str, events: &[CalendarEventRecord]) -> String {
    let title = format!("Google Calendar Event Collection for {}", email);
    let rows = events.iter().map(CalendarEventRecord::cells);
    let body = format!(
        "<h2>{}</h2>\n{}",
        escape_html(&title),
        table(&CALENDAR_HEADERS, rows)
    );
    page(&title, &body)
}

pub fn drive_activity_page(email: &str, activities: &[DriveActivityRecord]) -> String {
    let title = format!("Drive Activity Log Collection for {}", email);
    let rows = activities.iter().map(DriveActivityRecord::cells);
    let body = format!(
        "<h2>{}</h2>\n{}",
        escape_html(&title),
        table(&DRIVE_HEADERS, rows)
    );
    page(&title, &body)
}
