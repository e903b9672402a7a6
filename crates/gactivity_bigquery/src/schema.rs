//! Table layouts of the two collections. Every column is NULLABLE.

use gactivity_common::{CalendarEventRecord, DriveActivityRecord};

use crate::models::{TableFieldSchema, TableSchema};

pub const DRIVE_TIMESTAMP_COLUMNS: [&str; 1] = ["timeActivity"];

pub const CALENDAR_TIMESTAMP_COLUMNS: [&str; 4] =
    ["createdTime", "updatedTime", "startTime", "endTime"];

fn schema_for(columns: &[&str], timestamp_columns: &[&str]) -> TableSchema {
    TableSchema {
        fields: columns
            .iter()
            .map(|column| {
                let field_type = if timestamp_columns.contains(column) {
                    "TIMESTAMP"
                } else {
                    "STRING"
                };
                TableFieldSchema::nullable(column, field_type)
            })
            .collect(),
    }
}

pub fn drive_activity_schema() -> TableSchema {
    schema_for(&DriveActivityRecord::COLUMNS, &DRIVE_TIMESTAMP_COLUMNS)
}

pub fn calendar_schema() -> TableSchema {
    schema_for(&CalendarEventRecord::COLUMNS, &CALENDAR_TIMESTAMP_COLUMNS)
}
