use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

const GOOGLE_API_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared client for the Google REST APIs (OAuth, People, Drive Activity, BigQuery).
/// A default client is used if the TLS backend cannot initialise.
pub static HTTP_CLIENT: Lazy<Client> =
    Lazy::new(|| google_api_client(GOOGLE_API_TIMEOUT).unwrap_or_else(|_| Client::new()));

/// Client with an overall request timeout and the crate's user agent.
/// Redirects are not followed.
pub fn google_api_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("gactivity/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
