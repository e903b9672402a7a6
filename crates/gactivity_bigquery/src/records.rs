//! Conversion between stored rows and the shared record types.

use std::collections::HashMap;

use gactivity_common::format::{from_epoch_micros, parse_timestamp};
use gactivity_common::{CalendarEventRecord, DriveActivityRecord};
use serde_json::Value;
use tracing::warn;

use crate::models::{TableRow, TableSchema};

/// A result row keyed by column name.
pub type Row = HashMap<String, Value>;

/// Pairs each cell with its column name from the result schema.
pub fn named_rows(schema: &TableSchema, rows: &[TableRow]) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            schema
                .fields
                .iter()
                .zip(row.f.iter())
                .map(|(field, cell)| (field.name.clone(), cell.v.clone()))
                .collect()
        })
        .collect()
}

fn cell_string(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

/// TIMESTAMP cells arrive as int64 microseconds (`useInt64Timestamp`) or,
/// from older endpoints, as float seconds.
fn cell_timestamp(row: &Row, column: &str) -> Option<String> {
    let raw = cell_string(row, column)?;
    if let Ok(micros) = raw.parse::<i64>() {
        return from_epoch_micros(micros);
    }
    let seconds = raw.parse::<f64>().ok()?;
    from_epoch_micros((seconds * 1_000_000.0).round() as i64)
}

/// `None` for rows lacking any required column.
pub fn drive_activity_from_row(row: &Row) -> Option<DriveActivityRecord> {
    Some(DriveActivityRecord {
        activity_id: cell_string(row, "activityId")?,
        time_activity: cell_timestamp(row, "timeActivity")?,
        user_action: cell_string(row, "userAction")?,
        primary_action: cell_string(row, "primaryAction")?,
        sub_action: cell_string(row, "subAction")?,
        sub_action_type: cell_string(row, "subActionType")?,
        sub_action_result: cell_string(row, "subActionResult").unwrap_or_default(),
        item: cell_string(row, "item")?,
    })
}

pub fn calendar_event_from_row(row: &Row) -> Option<CalendarEventRecord> {
    Some(CalendarEventRecord {
        event_id: cell_string(row, "eventId")?,
        event_title: cell_string(row, "eventTitle")?,
        event_type: cell_string(row, "eventType")?,
        status: cell_string(row, "status")?,
        created_time: cell_timestamp(row, "createdTime")?,
        updated_time: cell_timestamp(row, "updatedTime")?,
        creator: cell_string(row, "creator")?,
        organizer: cell_string(row, "organizer")?,
        event_link: cell_string(row, "eventLink")?,
        attendees: cell_string(row, "attendees")?,
        start_time: cell_timestamp(row, "startTime")?,
        end_time: cell_timestamp(row, "endTime")?,
        total_time: cell_string(row, "totalTime")?,
    })
}

pub fn decode_drive_activities(rows: &[Row]) -> Vec<DriveActivityRecord> {
    rows.iter().filter_map(drive_activity_from_row).collect()
}

pub fn decode_calendar_events(rows: &[Row]) -> Vec<CalendarEventRecord> {
    rows.iter().filter_map(calendar_event_from_row).collect()
}

/// Canonical timestamp to a BigQuery literal. Empty or unparseable values bind NULL.
pub fn timestamp_literal(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    match parse_timestamp(value) {
        Some(parsed) => Some(parsed.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()),
        None => {
            warn!("Binding NULL for unparseable timestamp '{}'", value);
            None
        }
    }
}
