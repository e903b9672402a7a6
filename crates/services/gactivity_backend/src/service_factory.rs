// --- File: crates/services/gactivity_backend/src/service_factory.rs ---
//! Wires the Google collectors and the BigQuery store into an [`AppState`].

use std::sync::Arc;

use gactivity_auth::{EmailResolver, PeopleClient};
use gactivity_bigquery::{BigQueryClient, BigQueryLoader, ServiceAccountTokens};
use gactivity_common::logging::log_result;
use gactivity_common::{config_error, GactivityError};
use gactivity_config::AppConfig;
use gactivity_drive::DriveActivityCollector;
use gactivity_gcal::GoogleCalendarCollector;
use tracing::info;

use crate::app_state::AppState;

/// Builds the production state.
///
/// The service account key is required. Failing to prepare the dataset and
/// tables is only logged; the loaders create missing tables on demand.
pub async fn build_app_state(config: Arc<AppConfig>) -> Result<AppState, GactivityError> {
    let key_path = config
        .bigquery
        .key_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .ok_or_else(|| config_error("bigquery.key_path is not set"))?;

    info!("ℹ️ Initializing BigQuery client for project {}...", config.bigquery.project_id);
    let tokens = ServiceAccountTokens::from_key_file(key_path).await?;
    let client = BigQueryClient::new(&config.bigquery, Arc::new(tokens));
    let loader = BigQueryLoader::new(client.clone(), &config.bigquery);

    let _ = log_result(
        loader.prepare_tables().await,
        &format!("✅ Dataset {} is ready", config.bigquery.dataset),
        &format!("❌ Failed to prepare dataset {}", config.bigquery.dataset),
    );

    let emails = EmailResolver::new(PeopleClient::new(&config.google_oauth.people_api_base));
    let calendar = GoogleCalendarCollector::new(&config.collector);
    let drive = DriveActivityCollector::new(&config.collector, Arc::new(emails));

    AppState::builder(config)
        .with_calendar(Arc::new(calendar))
        .with_drive(Arc::new(drive))
        .with_store(Arc::new(loader))
        .with_catalog(Arc::new(client))
        .build()
}
