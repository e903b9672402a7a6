// --- File: crates/services/gactivity_backend/src/pipelines.rs ---
//! Collect, load, then read back what the store holds for the account.

use chrono::{DateTime, Utc};
use gactivity_common::format::{lookback_window, month_window, parse_time_zone};
use gactivity_common::{
    internal_error, AccountIdentity, CalendarEventRecord, DriveActivityRecord, GactivityError,
};
use tracing::info;

use crate::app_state::AppState;

/// Current month's calendar events, merged into the calendar table.
pub async fn run_calendar_pipeline(
    state: &AppState,
    access_token: &str,
    identity: &AccountIdentity,
    now: DateTime<Utc>,
) -> Result<Vec<CalendarEventRecord>, GactivityError> {
    let time_zone = parse_time_zone(&state.config.collector.time_zone);
    let window = month_window(now, time_zone)
        .ok_or_else(|| internal_error("Could not compute the calendar window"))?;

    let events = state.calendar.collect_events(access_token, window).await?;
    let summary = state.store.load_calendar_events(events).await?;
    info!(
        "Calendar load for {}: {} inserted, {} updated, {} duplicates",
        identity.email, summary.inserted, summary.updated, summary.duplicates
    );

    state.store.calendar_events_for(identity).await
}

/// Drive activity of the last `drive_lookback_days`, merged into the activity table.
pub async fn run_drive_pipeline(
    state: &AppState,
    access_token: &str,
    identity: &AccountIdentity,
    now: DateTime<Utc>,
) -> Result<Vec<DriveActivityRecord>, GactivityError> {
    let collector = &state.config.collector;
    let window = lookback_window(
        now,
        collector.drive_lookback_days,
        parse_time_zone(&collector.time_zone),
    )
    .ok_or_else(|| internal_error("Could not compute the Drive activity window"))?;

    let activities = state.drive.collect_activities(access_token, window).await?;
    let summary = state.store.load_drive_activities(activities).await?;
    info!(
        "Drive activity load for {}: {} inserted, {} duplicates",
        identity.email, summary.inserted, summary.duplicates
    );

    state.store.drive_activities_for(identity).await
}
