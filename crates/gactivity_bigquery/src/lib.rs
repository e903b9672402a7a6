// --- File: crates/gactivity_bigquery/src/lib.rs ---
pub mod auth;
pub mod client;
pub mod error;
pub mod loader;
pub mod merge;
pub mod models;
pub mod records;
pub mod schema;

#[cfg(test)]
mod merge_proptest;

pub use auth::{AccessTokenProvider, ServiceAccountTokens, StaticToken, BIGQUERY_SCOPES};
pub use client::{BigQueryClient, ColumnChanges, DatasetCatalog, SelectQuery};
pub use error::BigQueryError;
pub use loader::BigQueryLoader;
pub use merge::{plan_calendar_events, plan_drive_activities, MergePlan};
pub use models::{DatasetOverview, QueryParameter, TableFieldSchema, TableSchema};
