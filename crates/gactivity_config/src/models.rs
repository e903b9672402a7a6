// --- File: crates/gactivity_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL used to build the OAuth redirect when the request
    /// carries no usable Host header (e.g. behind a proxy).
    #[serde(default)]
    pub public_base_url: Option<String>,
}

// --- Google OAuth (user consent) Config ---
// client_secret is usually "secret_from_env" and read from GOOGLE_OAUTH_CLIENT_SECRET.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleOAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_path")]
    pub redirect_path: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_revoke_url")]
    pub revoke_url: String,
    #[serde(default = "default_people_api_base")]
    pub people_api_base: String,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_path: default_redirect_path(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            revoke_url: default_revoke_url(),
            people_api_base: default_people_api_base(),
        }
    }
}

// --- BigQuery Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BigQueryConfig {
    #[serde(default)]
    pub project_id: String,
    /// Path to the service account JSON key.
    pub key_path: Option<String>,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_drive_activity_table")]
    pub drive_activity_table: String,
    #[serde(default = "default_calendar_table")]
    pub calendar_table: String,
    pub location: Option<String>,
    #[serde(default = "default_bigquery_api_base")]
    pub api_base: String,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            key_path: None,
            dataset: default_dataset(),
            drive_activity_table: default_drive_activity_table(),
            calendar_table: default_calendar_table(),
            location: None,
            api_base: default_bigquery_api_base(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

// --- Collector Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectorConfig {
    /// IANA zone used when computing the collection windows.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_page_size")]
    pub calendar_page_size: u32,
    #[serde(default = "default_page_size")]
    pub drive_page_size: u32,
    #[serde(default = "default_attendee_preview")]
    pub attendee_preview: usize,
    #[serde(default = "default_actor_preview")]
    pub actor_preview: usize,
    #[serde(default = "default_drive_lookback_days")]
    pub drive_lookback_days: i64,
    /// Restricts the Drive activity query to one folder (items/{id}).
    pub drive_folder_id: Option<String>,
    #[serde(default = "default_drive_activity_api_base")]
    pub drive_activity_api_base: String,
    /// Overrides the Calendar API root (tests point this at a mock server).
    pub calendar_api_base: Option<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            calendar_page_size: default_page_size(),
            drive_page_size: default_page_size(),
            attendee_preview: default_attendee_preview(),
            actor_preview: default_actor_preview(),
            drive_lookback_days: default_drive_lookback_days(),
            drive_folder_id: None,
            drive_activity_api_base: default_drive_activity_api_base(),
            calendar_api_base: None,
        }
    }
}

// --- Session Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// HMAC key for the session cookie. Empty means a random per-process key.
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_session_ttl_minutes")]
    pub ttl_minutes: i64,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_name: default_cookie_name(),
            ttl_minutes: default_session_ttl_minutes(),
            secure_cookie: false,
        }
    }
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
    #[serde(default)]
    pub journald: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_file_prefix(),
            journald: false,
        }
    }
}

// --- Main Application Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub google_oauth: GoogleOAuthConfig,
    #[serde(default)]
    pub bigquery: BigQueryConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_redirect_path() -> String {
    "/oauth2callback".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_revoke_url() -> String {
    "https://accounts.google.com/o/oauth2/revoke".to_string()
}

fn default_people_api_base() -> String {
    "https://people.googleapis.com/v1".to_string()
}

fn default_dataset() -> String {
    "demo_data_set1".to_string()
}

fn default_drive_activity_table() -> String {
    "drive_activity".to_string()
}

fn default_calendar_table() -> String {
    "calendar_collection".to_string()
}

fn default_bigquery_api_base() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_attendee_preview() -> usize {
    5
}

fn default_actor_preview() -> usize {
    2
}

fn default_drive_lookback_days() -> i64 {
    1
}

fn default_drive_activity_api_base() -> String {
    "https://driveactivity.googleapis.com/v2".to_string()
}

fn default_cookie_name() -> String {
    "gactivity_session".to_string()
}

fn default_session_ttl_minutes() -> i64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "gactivity.log".to_string()
}
