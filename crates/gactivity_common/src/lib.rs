// --- File: crates/gactivity_common/src/lib.rs ---

pub mod error; // Error handling
pub mod format; // Timestamp and preview formatting
pub mod html; // HTML page helpers
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared record models
pub mod services; // Service abstractions

#[cfg(test)]
mod format_proptest;

pub use error::{
    auth_error, config_error, external_service_error, internal_error, storage_error,
    GactivityError, HttpStatusCode,
};

pub use http::client::{google_api_client, HTTP_CLIENT};

pub use models::{
    AccountIdentity, CalendarEventRecord, DriveActivityRecord, LoadSummary, TimeWindow,
};

pub use services::{CalendarSource, DriveActivitySource, RecordStore};
