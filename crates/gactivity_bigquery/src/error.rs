// --- File: crates/gactivity_bigquery/src/error.rs ---
use gactivity_common::{external_service_error, GactivityError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BigQueryError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("BigQuery API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Service account token error: {0}")]
    TokenError(String),

    #[error("Query job failed: {0}")]
    JobError(String),

    #[error("Query job {0} did not complete in time")]
    Timeout(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Schema error: {0}")]
    SchemaError(String),
}

impl BigQueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BigQueryError::ApiError { status: 404, .. })
    }
}

impl From<BigQueryError> for GactivityError {
    fn from(err: BigQueryError) -> Self {
        match err {
            BigQueryError::InvalidIdentifier(_) | BigQueryError::SchemaError(_) => {
                GactivityError::ValidationError(err.to_string())
            }
            _ => external_service_error("BigQuery", err),
        }
    }
}
