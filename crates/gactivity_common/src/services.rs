//! Service abstractions for the Google APIs and the record store.
//!
//! The web layer only talks to these traits, so the pipelines can be tested
//! with mocks instead of live Google endpoints.

use async_trait::async_trait;

use crate::error::GactivityError;
use crate::models::{
    AccountIdentity, CalendarEventRecord, DriveActivityRecord, LoadSummary, TimeWindow,
};

/// Collects calendar events visible to the holder of `access_token`.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn collect_events(
        &self,
        access_token: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEventRecord>, GactivityError>;
}

/// Collects Drive activity visible to the holder of `access_token`.
#[async_trait]
pub trait DriveActivitySource: Send + Sync {
    async fn collect_activities(
        &self,
        access_token: &str,
        window: TimeWindow,
    ) -> Result<Vec<DriveActivityRecord>, GactivityError>;
}

/// Persistent store for collected records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Merges fresh calendar events into the store.
    async fn load_calendar_events(
        &self,
        records: Vec<CalendarEventRecord>,
    ) -> Result<LoadSummary, GactivityError>;

    /// Merges fresh Drive activity records into the store.
    async fn load_drive_activities(
        &self,
        records: Vec<DriveActivityRecord>,
    ) -> Result<LoadSummary, GactivityError>;

    /// Stored events whose attendees mention the account, newest first.
    async fn calendar_events_for(
        &self,
        identity: &AccountIdentity,
    ) -> Result<Vec<CalendarEventRecord>, GactivityError>;

    /// Stored Drive activity performed by the account.
    async fn drive_activities_for(
        &self,
        identity: &AccountIdentity,
    ) -> Result<Vec<DriveActivityRecord>, GactivityError>;
}
