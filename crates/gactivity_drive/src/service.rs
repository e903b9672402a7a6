// --- File: crates/gactivity_drive/src/service.rs ---
//! Google Drive implementation of the `DriveActivitySource` trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gactivity_auth::EmailLookup;
use gactivity_common::{DriveActivityRecord, DriveActivitySource, GactivityError, TimeWindow};
use gactivity_config::CollectorConfig;
use tracing::{info, warn};

use crate::client::DriveActivityClient;
use crate::logic::{person_names, ActivityFormatter, DriveError};
use crate::models::QueryDriveActivityRequest;

/// `time > {start} AND time <= {end}` with both bounds in epoch milliseconds.
pub fn time_filter(window: TimeWindow) -> String {
    format!(
        "time > {} AND time <= {}",
        window.start.timestamp_millis(),
        window.end.timestamp_millis()
    )
}

pub struct DriveActivityCollector {
    client: DriveActivityClient,
    emails: Arc<dyn EmailLookup>,
    page_size: u32,
    actor_preview: usize,
    folder_id: Option<String>,
}

impl DriveActivityCollector {
    pub fn new(config: &CollectorConfig, emails: Arc<dyn EmailLookup>) -> Self {
        Self::with_client(
            DriveActivityClient::new(&config.drive_activity_api_base),
            config,
            emails,
        )
    }

    pub fn with_client(
        client: DriveActivityClient,
        config: &CollectorConfig,
        emails: Arc<dyn EmailLookup>,
    ) -> Self {
        Self {
            client,
            emails,
            page_size: config.drive_page_size.max(1),
            actor_preview: config.actor_preview,
            folder_id: config
                .drive_folder_id
                .clone()
                .filter(|folder| !folder.trim().is_empty()),
        }
    }

    pub fn request_for(&self, window: TimeWindow) -> QueryDriveActivityRequest {
        QueryDriveActivityRequest {
            ancestor_name: self.folder_id.as_ref().map(|folder| format!("items/{}", folder)),
            page_size: self.page_size,
            filter: Some(time_filter(window)),
            ..Default::default()
        }
    }

    async fn collect(
        &self,
        access_token: &str,
        window: TimeWindow,
    ) -> Result<Vec<DriveActivityRecord>, DriveError> {
        let activities = self
            .client
            .query_all(access_token, self.request_for(window))
            .await?;

        let mut emails = HashMap::new();
        for name in person_names(&activities) {
            let email = self.emails.resolve(access_token, &name).await;
            emails.insert(name, email);
        }

        let records = ActivityFormatter::new(&emails, self.actor_preview).to_sorted_records(activities);
        if records.is_empty() {
            info!("No activity collected from Google Drive!");
        } else {
            info!("Collected {} Drive activity rows", records.len());
        }
        Ok(records)
    }
}

#[async_trait]
impl DriveActivitySource for DriveActivityCollector {
    async fn collect_activities(
        &self,
        access_token: &str,
        window: TimeWindow,
    ) -> Result<Vec<DriveActivityRecord>, GactivityError> {
        self.collect(access_token, window).await.map_err(|err| {
            warn!("Drive activity collection failed: {}", err);
            err.into()
        })
    }
}
