//! Deduplication of freshly collected records against the stored ones.

use std::collections::{HashMap, HashSet};

use gactivity_common::format::normalize_timestamp;
use gactivity_common::{CalendarEventRecord, DriveActivityRecord};
use tracing::info;

/// What to write for a batch of fresh records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan<T> {
    pub inserts: Vec<T>,
    pub updates: Vec<T>,
    pub duplicates: usize,
}

impl<T> Default for MergePlan<T> {
    fn default() -> Self {
        Self {
            inserts: Vec::new(),
            updates: Vec::new(),
            duplicates: 0,
        }
    }
}

impl<T> MergePlan<T> {
    /// Rows that will be written, inserts plus updates.
    pub fn changed_count(&self) -> usize {
        self.inserts.len() + self.updates.len()
    }

    pub fn log_outcome(&self) {
        if self.changed_count() == 0 {
            info!("No record updated. Stop update method");
        } else {
            info!("Total record updated: {}", self.changed_count());
        }
    }
}

type DriveKey = (String, String, String, String, String, String);

fn drive_key(record: &DriveActivityRecord) -> DriveKey {
    (
        normalize_timestamp(&record.time_activity),
        record.user_action.clone(),
        record.primary_action.clone(),
        record.sub_action.clone(),
        record.sub_action_result.clone(),
        record.item.clone(),
    )
}

/// A fresh activity row is a duplicate when a stored row has the same time,
/// actors, actions, result and items. The activity id is random per
/// collection and never compared.
pub fn plan_drive_activities(
    stored: &[DriveActivityRecord],
    fresh: Vec<DriveActivityRecord>,
) -> MergePlan<DriveActivityRecord> {
    let known: HashSet<DriveKey> = stored.iter().map(drive_key).collect();
    let mut plan = MergePlan::default();
    for record in fresh {
        if known.contains(&drive_key(&record)) {
            plan.duplicates += 1;
        } else {
            plan.inserts.push(record);
        }
    }
    plan
}

/// Fresh calendar events are matched on `eventId` and `createdTime`:
/// the same `updatedTime` makes a duplicate, a different one an update,
/// no match an insert.
pub fn plan_calendar_events(
    stored: &[CalendarEventRecord],
    fresh: Vec<CalendarEventRecord>,
) -> MergePlan<CalendarEventRecord> {
    let mut known: HashMap<(String, String), HashSet<String>> = HashMap::new();
    for record in stored {
        known
            .entry((record.event_id.clone(), normalize_timestamp(&record.created_time)))
            .or_default()
            .insert(normalize_timestamp(&record.updated_time));
    }

    let mut plan = MergePlan::default();
    for mut record in fresh {
        record.start_time = normalize_timestamp(&record.start_time);
        record.end_time = normalize_timestamp(&record.end_time);

        let key = (record.event_id.clone(), normalize_timestamp(&record.created_time));
        match known.get(&key) {
            Some(updates) if updates.contains(&normalize_timestamp(&record.updated_time)) => {
                plan.duplicates += 1;
            }
            Some(_) => plan.updates.push(record),
            None => plan.inserts.push(record),
        }
    }
    plan
}
