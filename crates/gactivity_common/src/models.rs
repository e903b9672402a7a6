use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar event as collected from Google Calendar and stored in BigQuery.
///
/// Timestamps use the canonical `yyyy-MM-ddTHH:mm:ss.SSSZ` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventRecord {
    pub event_id: String,
    pub event_title: String,
    pub event_type: String,
    pub status: String,
    pub created_time: String,
    pub updated_time: String,
    pub creator: String,
    pub organizer: String,
    pub event_link: String,
    /// Preview of the attendee list, see `format::truncated`.
    pub attendees: String,
    pub start_time: String,
    pub end_time: String,
    /// e.g. `60.0 minutes`
    pub total_time: String,
}

impl CalendarEventRecord {
    pub const COLUMNS: [&'static str; 13] = [
        "eventId",
        "eventTitle",
        "eventType",
        "status",
        "createdTime",
        "updatedTime",
        "creator",
        "organizer",
        "eventLink",
        "attendees",
        "startTime",
        "endTime",
        "totalTime",
    ];

    /// Cell values in [`Self::COLUMNS`] order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.event_id.clone(),
            self.event_title.clone(),
            self.event_type.clone(),
            self.status.clone(),
            self.created_time.clone(),
            self.updated_time.clone(),
            self.creator.clone(),
            self.organizer.clone(),
            self.event_link.clone(),
            self.attendees.clone(),
            self.start_time.clone(),
            self.end_time.clone(),
            self.total_time.clone(),
        ]
    }
}

/// One action of a Drive activity. An activity with several actions
/// yields several records sharing the same `activity_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DriveActivityRecord {
    pub activity_id: String,
    pub time_activity: String,
    pub user_action: String,
    pub primary_action: String,
    pub sub_action: String,
    pub sub_action_type: String,
    pub sub_action_result: String,
    pub item: String,
}

impl DriveActivityRecord {
    pub const COLUMNS: [&'static str; 8] = [
        "activityId",
        "timeActivity",
        "userAction",
        "primaryAction",
        "subAction",
        "subActionType",
        "subActionResult",
        "item",
    ];

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.activity_id.clone(),
            self.time_activity.clone(),
            self.user_action.clone(),
            self.primary_action.clone(),
            self.sub_action.clone(),
            self.sub_action_type.clone(),
            self.sub_action_result.clone(),
            self.item.clone(),
        ]
    }
}

/// Half-open collection window `(start, end]` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Outcome of loading a batch of records into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub updated: usize,
    pub duplicates: usize,
}

impl LoadSummary {
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }
}

/// The signed-in Google account the collected records are filtered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    /// People API id without the `people/` prefix.
    pub account_id: String,
    pub email: String,
}
