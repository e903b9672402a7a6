// --- File: crates/services/gactivity_backend/src/app_state.rs ---
use std::sync::Arc;

use gactivity_auth::{CookieSigner, CredentialStore, GoogleOAuthClient, PeopleClient, SessionStore};
use gactivity_bigquery::DatasetCatalog;
use gactivity_common::{config_error, CalendarSource, DriveActivitySource, GactivityError, RecordStore};
use gactivity_config::AppConfig;

/// Application state shared by every route.
///
/// The Google collectors and the record store sit behind traits so the
/// handlers can run against mocks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub calendar: Arc<dyn CalendarSource>,
    pub drive: Arc<dyn DriveActivitySource>,
    pub store: Arc<dyn RecordStore>,
    pub catalog: Arc<dyn DatasetCatalog>,
    pub oauth: Arc<GoogleOAuthClient>,
    pub people: PeopleClient,
    pub credentials: Arc<CredentialStore>,
    pub sessions: Arc<SessionStore>,
}

/// Builder for [`AppState`]. The OAuth, People and session parts are derived
/// from the configuration; the data services must be supplied.
pub struct AppStateBuilder {
    config: Arc<AppConfig>,
    calendar: Option<Arc<dyn CalendarSource>>,
    drive: Option<Arc<dyn DriveActivitySource>>,
    store: Option<Arc<dyn RecordStore>>,
    catalog: Option<Arc<dyn DatasetCatalog>>,
}

impl AppStateBuilder {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            calendar: None,
            drive: None,
            store: None,
            catalog: None,
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarSource>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_drive(mut self, drive: Arc<dyn DriveActivitySource>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn DatasetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<AppState, GactivityError> {
        let session_config = &self.config.session;
        let sessions = SessionStore::new(
            CookieSigner::new(&session_config.secret),
            &session_config.cookie_name,
            session_config.ttl_minutes,
            session_config.secure_cookie,
        );

        Ok(AppState {
            calendar: self
                .calendar
                .ok_or_else(|| config_error("Calendar source must be set"))?,
            drive: self
                .drive
                .ok_or_else(|| config_error("Drive activity source must be set"))?,
            store: self
                .store
                .ok_or_else(|| config_error("Record store must be set"))?,
            catalog: self
                .catalog
                .ok_or_else(|| config_error("Dataset catalog must be set"))?,
            oauth: Arc::new(GoogleOAuthClient::new(self.config.google_oauth.clone())),
            people: PeopleClient::new(&self.config.google_oauth.people_api_base),
            credentials: Arc::new(CredentialStore::new()),
            sessions: Arc::new(sessions),
            config: self.config,
        })
    }
}

impl AppState {
    pub fn builder(config: Arc<AppConfig>) -> AppStateBuilder {
        AppStateBuilder::new(config)
    }
}
