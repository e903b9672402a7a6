// --- File: crates/gactivity_gcal/src/service.rs ---
//! Google Calendar implementation of the `CalendarSource` trait.

use async_trait::async_trait;
use gactivity_common::{CalendarEventRecord, CalendarSource, GactivityError, TimeWindow};
use gactivity_config::CollectorConfig;
use tracing::{debug, info, warn};

use crate::auth::{create_calendar_hub, HubType};
use crate::logic::{to_records, GcalError};

/// Calendar used when the calendar list comes back empty.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Collects the current user's calendar events with their own access token.
pub struct GoogleCalendarCollector {
    page_size: u32,
    attendee_preview: usize,
    api_base: Option<String>,
}

impl GoogleCalendarCollector {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            page_size: config.calendar_page_size.max(1),
            attendee_preview: config.attendee_preview,
            api_base: config.calendar_api_base.clone(),
        }
    }

    /// Walks the calendar list page by page. A page without entries falls
    /// back to the primary calendar.
    pub async fn collect_with_hub(
        &self,
        hub: &HubType,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEventRecord>, GcalError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut call = hub.calendar_list().list();
            if let Some(token) = page_token.as_deref() {
                call = call.page_token(token);
            }
            let (_, calendar_list) = call.doit().await?;

            let calendar_ids: Vec<String> = calendar_list
                .items
                .unwrap_or_default()
                .into_iter()
                .filter_map(|entry| entry.id)
                .collect();

            if calendar_ids.is_empty() {
                records.extend(self.collect_calendar(hub, PRIMARY_CALENDAR, window).await?);
            } else {
                for calendar_id in &calendar_ids {
                    records.extend(self.collect_calendar(hub, calendar_id, window).await?);
                }
            }

            page_token = calendar_list.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if records.is_empty() {
            info!("No upcoming events found.");
        } else {
            info!("Collected {} calendar events", records.len());
        }
        Ok(records)
    }

    /// All events of one calendar inside the window, newest updates last.
    async fn collect_calendar(
        &self,
        hub: &HubType,
        calendar_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEventRecord>, GcalError> {
        debug!("Collecting events for calendar {}", calendar_id);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut call = hub
                .events()
                .list(calendar_id)
                .max_results(self.page_size as i32)
                .single_events(false)
                .show_deleted(true)
                .show_hidden_invitations(true)
                .order_by("updated")
                .time_min(window.start)
                .time_max(window.end);
            if let Some(token) = page_token.as_deref() {
                call = call.page_token(token);
            }

            let (_, events) = call.doit().await?;
            let items = events.items.unwrap_or_default();
            let mapped = to_records(&items, self.attendee_preview);
            if mapped.len() < items.len() {
                debug!(
                    "Skipped {} events with unknown fields in {}",
                    items.len() - mapped.len(),
                    calendar_id
                );
            }
            records.extend(mapped);

            page_token = events.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarCollector {
    async fn collect_events(
        &self,
        access_token: &str,
        window: TimeWindow,
    ) -> Result<Vec<CalendarEventRecord>, GactivityError> {
        let hub = create_calendar_hub(access_token, self.api_base.as_deref())?;
        self.collect_with_hub(&hub, window).await.map_err(|err| {
            warn!("Calendar collection failed: {}", err);
            err.into()
        })
    }
}
