// --- File: crates/gactivity_bigquery/src/loader.rs ---
//! `RecordStore` backed by two BigQuery tables.

use async_trait::async_trait;
use gactivity_common::{
    AccountIdentity, CalendarEventRecord, DriveActivityRecord, GactivityError, LoadSummary,
    RecordStore,
};
use gactivity_config::BigQueryConfig;
use tracing::{info, warn};

use crate::client::{BigQueryClient, SelectQuery};
use crate::error::BigQueryError;
use crate::merge::{plan_calendar_events, plan_drive_activities};
use crate::models::QueryParameter;
use crate::records::{decode_calendar_events, decode_drive_activities};
use crate::schema::{
    calendar_schema, drive_activity_schema, CALENDAR_TIMESTAMP_COLUMNS, DRIVE_TIMESTAMP_COLUMNS,
};

pub struct BigQueryLoader {
    client: BigQueryClient,
    dataset: String,
    drive_table: String,
    calendar_table: String,
}

/// `LIKE` pattern matching the value anywhere in the column.
fn contains_pattern(value: &str) -> String {
    format!("%{}%", value)
}

fn identity_params(identity: &AccountIdentity) -> Vec<QueryParameter> {
    vec![
        QueryParameter::string("email_pattern", &contains_pattern(&identity.email)),
        QueryParameter::string("id_pattern", &contains_pattern(&identity.account_id)),
    ]
}

impl BigQueryLoader {
    pub fn new(client: BigQueryClient, config: &BigQueryConfig) -> Self {
        Self {
            client,
            dataset: config.dataset.clone(),
            drive_table: config.drive_activity_table.clone(),
            calendar_table: config.calendar_table.clone(),
        }
    }

    pub fn client(&self) -> &BigQueryClient {
        &self.client
    }

    /// Creates the dataset and both tables when they are missing.
    pub async fn prepare_tables(&self) -> Result<(), BigQueryError> {
        self.client.create_dataset(&self.dataset).await?;
        self.client
            .create_table(&self.dataset, &self.drive_table, drive_activity_schema())
            .await?;
        self.client
            .create_table(&self.dataset, &self.calendar_table, calendar_schema())
            .await?;
        Ok(())
    }

    /// Makes sure the table exists; `true` when it had to be created.
    async fn ensure_table(
        &self,
        table: &str,
        schema: crate::models::TableSchema,
    ) -> Result<bool, BigQueryError> {
        if !self.client.dataset_exists(&self.dataset).await? {
            self.client.create_dataset(&self.dataset).await?;
        }
        if self.client.table_exists(&self.dataset, table).await? {
            warn!("Table {} already exists. Update the table record", table);
            return Ok(false);
        }
        self.client.create_table(&self.dataset, table, schema).await
    }

    async fn merge_calendar_events(
        &self,
        records: Vec<CalendarEventRecord>,
    ) -> Result<LoadSummary, BigQueryError> {
        let created = self.ensure_table(&self.calendar_table, calendar_schema()).await?;
        let stored = if created {
            Vec::new()
        } else {
            let rows = self
                .client
                .select(&self.dataset, &SelectQuery::all(&self.calendar_table))
                .await?;
            decode_calendar_events(&rows)
        };

        let plan = plan_calendar_events(&stored, records);
        for record in &plan.updates {
            self.client
                .update_calendar_event(&self.dataset, &self.calendar_table, record)
                .await?;
        }
        let rows: Vec<Vec<String>> = plan.inserts.iter().map(CalendarEventRecord::cells).collect();
        if !rows.is_empty() {
            self.client
                .insert_rows(
                    &self.dataset,
                    &self.calendar_table,
                    &CalendarEventRecord::COLUMNS,
                    &CALENDAR_TIMESTAMP_COLUMNS,
                    &rows,
                )
                .await?;
        }
        plan.log_outcome();

        Ok(LoadSummary {
            inserted: plan.inserts.len(),
            updated: plan.updates.len(),
            duplicates: plan.duplicates,
        })
    }

    async fn merge_drive_activities(
        &self,
        records: Vec<DriveActivityRecord>,
    ) -> Result<LoadSummary, BigQueryError> {
        let created = self
            .ensure_table(&self.drive_table, drive_activity_schema())
            .await?;
        let stored = if created {
            Vec::new()
        } else {
            let rows = self
                .client
                .select(&self.dataset, &SelectQuery::all(&self.drive_table))
                .await?;
            decode_drive_activities(&rows)
        };

        let plan = plan_drive_activities(&stored, records);
        let rows: Vec<Vec<String>> = plan.inserts.iter().map(DriveActivityRecord::cells).collect();
        if !rows.is_empty() {
            self.client
                .insert_rows(
                    &self.dataset,
                    &self.drive_table,
                    &DriveActivityRecord::COLUMNS,
                    &DRIVE_TIMESTAMP_COLUMNS,
                    &rows,
                )
                .await?;
        }
        plan.log_outcome();

        Ok(LoadSummary {
            inserted: plan.inserts.len(),
            updated: 0,
            duplicates: plan.duplicates,
        })
    }
}

#[async_trait]
impl RecordStore for BigQueryLoader {
    async fn load_calendar_events(
        &self,
        records: Vec<CalendarEventRecord>,
    ) -> Result<LoadSummary, GactivityError> {
        if records.is_empty() {
            warn!("No calendar events to load. Skip....");
            return Ok(LoadSummary::default());
        }
        Ok(self.merge_calendar_events(records).await?)
    }

    async fn load_drive_activities(
        &self,
        records: Vec<DriveActivityRecord>,
    ) -> Result<LoadSummary, GactivityError> {
        if records.is_empty() {
            warn!("No drive activity to load. Skip....");
            return Ok(LoadSummary::default());
        }
        Ok(self.merge_drive_activities(records).await?)
    }

    async fn calendar_events_for(
        &self,
        identity: &AccountIdentity,
    ) -> Result<Vec<CalendarEventRecord>, GactivityError> {
        let query = SelectQuery::all(&self.calendar_table)
            .filter(
                "lower(attendees) LIKE lower(@email_pattern) OR lower(attendees) LIKE lower(@id_pattern)",
                identity_params(identity),
            )
            .order_by_desc(&["createdTime"]);
        let rows = self.client.select(&self.dataset, &query).await?;
        let records = decode_calendar_events(&rows);
        info!("Read {} calendar events for {}", records.len(), identity.email);
        Ok(records)
    }

    async fn drive_activities_for(
        &self,
        identity: &AccountIdentity,
    ) -> Result<Vec<DriveActivityRecord>, GactivityError> {
        let query = SelectQuery::all(&self.drive_table)
            .filter(
                "lower(userAction) LIKE lower(@email_pattern) OR lower(userAction) LIKE lower(@id_pattern)",
                identity_params(identity),
            )
            .order_by_desc(&["timeActivity", "activityId"]);
        let rows = self.client.select(&self.dataset, &query).await?;
        let records = decode_drive_activities(&rows);
        info!("Read {} drive activities for {}", records.len(), identity.email);
        Ok(records)
    }
}
