// File: crates/gactivity_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};

use crate::logic::GcalError;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds a Calendar hub that authorises every call with the user's access token.
///
/// `api_base` replaces the default `https://www.googleapis.com/calendar/v3/` root.
pub fn create_calendar_hub(access_token: &str, api_base: Option<&str>) -> Result<HubType, GcalError> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| GcalError::ConnectorError(e.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    // google-apis-common implements GetToken for a plain bearer String
    let mut hub = CalendarHub::new(client, access_token.to_string());
    if let Some(base) = api_base {
        hub.base_url(format!("{}/", base.trim_end_matches('/')));
    }

    Ok(hub)
}
