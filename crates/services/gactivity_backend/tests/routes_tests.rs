//! Drives the router end to end with mocked services and a mocked Google.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use gactivity_auth::StoredCredential;
use gactivity_backend::{routes, AppState};
use gactivity_bigquery::{BigQueryError, DatasetCatalog, DatasetOverview};
use gactivity_common::{
    storage_error, AccountIdentity, CalendarEventRecord, CalendarSource, DriveActivityRecord,
    DriveActivitySource, GactivityError, LoadSummary, RecordStore, TimeWindow,
};
use gactivity_config::{AppConfig, GoogleOAuthConfig, ServerConfig, SessionConfig};
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Calendar {}
    #[async_trait]
    impl CalendarSource for Calendar {
        async fn collect_events(
            &self,
            access_token: &str,
            window: TimeWindow,
        ) -> Result<Vec<CalendarEventRecord>, GactivityError>;
    }
}

mock! {
    pub Drive {}
    #[async_trait]
    impl DriveActivitySource for Drive {
        async fn collect_activities(
            &self,
            access_token: &str,
            window: TimeWindow,
        ) -> Result<Vec<DriveActivityRecord>, GactivityError>;
    }
}

mock! {
    pub Store {}
    #[async_trait]
    impl RecordStore for Store {
        async fn load_calendar_events(
            &self,
            records: Vec<CalendarEventRecord>,
        ) -> Result<LoadSummary, GactivityError>;
        async fn load_drive_activities(
            &self,
            records: Vec<DriveActivityRecord>,
        ) -> Result<LoadSummary, GactivityError>;
        async fn calendar_events_for(
            &self,
            identity: &AccountIdentity,
        ) -> Result<Vec<CalendarEventRecord>, GactivityError>;
        async fn drive_activities_for(
            &self,
            identity: &AccountIdentity,
        ) -> Result<Vec<DriveActivityRecord>, GactivityError>;
    }
}

mock! {
    pub Catalog {}
    #[async_trait]
    impl DatasetCatalog for Catalog {
        async fn datasets_overview(&self) -> Result<Vec<DatasetOverview>, BigQueryError>;
    }
}

const USER_ID: &str = "user-1";

fn test_config(google: &str) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_base_url: None,
        },
        google_oauth: GoogleOAuthConfig {
            client_id: "client-1".to_string(),
            client_secret: "shh".to_string(),
            auth_url: "https://accounts.example.com/auth".to_string(),
            token_url: format!("{}/token", google),
            revoke_url: format!("{}/revoke", google),
            people_api_base: format!("{}/v1", google),
            ..Default::default()
        },
        bigquery: Default::default(),
        collector: Default::default(),
        session: SessionConfig {
            secret: "test-secret".to_string(),
            ..Default::default()
        },
        logging: Default::default(),
    })
}

fn build_state(
    google: &str,
    calendar: MockCalendar,
    drive: MockDrive,
    store: MockStore,
    catalog: MockCatalog,
) -> AppState {
    AppState::builder(test_config(google))
        .with_calendar(Arc::new(calendar))
        .with_drive(Arc::new(drive))
        .with_store(Arc::new(store))
        .with_catalog(Arc::new(catalog))
        .build()
        .unwrap()
}

fn idle_state(google: &str) -> AppState {
    build_state(
        google,
        MockCalendar::new(),
        MockDrive::new(),
        MockStore::new(),
        MockCatalog::new(),
    )
}

/// `name=value` part of a `Set-Cookie` header.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

/// Creates a signed-in session with a stored credential and returns its cookie.
async fn sign_in(state: &AppState) -> String {
    let mut session = state.sessions.create().await;
    session.user_id = Some(USER_ID.to_string());
    session.google_account_id = Some("1234".to_string());
    session.google_account_email = Some("alice@example.com".to_string());
    let session = state.sessions.update(session).await;
    state
        .credentials
        .store(
            USER_ID,
            StoredCredential {
                access_token: "user-token".to_string(),
                refresh_token: Some("refresh-token".to_string()),
                expires_at: None,
                scope: None,
            },
        )
        .await;
    cookie_pair(&state.sessions.session_cookie(&session))
}

async fn get(state: &AppState, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri).header(header::HOST, "localhost:3000");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    routes(state.clone())
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_collection_pages_require_sign_in() {
    let state = idle_state("http://127.0.0.1:9");

    for uri in ["/calendar-collection", "/drive-activity", "/bigquery/datasets"] {
        let response = get(&state, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(body_text(response).await.contains("User is not authenticated"));
    }
}

#[tokio::test]
async fn test_index_shows_signed_in_account() {
    let state = idle_state("http://127.0.0.1:9");
    let cookie = sign_in(&state).await;

    let response = get(&state, "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Signed in as alice@example.com"));
}

#[tokio::test]
async fn test_login_redirects_to_consent_screen() {
    let state = idle_state("http://127.0.0.1:9");

    let response = get(&state, "/login", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = location(&response);
    assert!(target.starts_with("https://accounts.example.com/auth?client_id=client-1"));
    assert!(target.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth2callback"));
    assert!(target.contains("access_type=offline"));

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::COOKIE, cookie_pair(set_cookie).parse().unwrap());
    let session = state.sessions.from_headers(&headers).await.unwrap();
    assert!(session.user_id.is_some());
    let oauth_state = session.oauth_state.unwrap();
    assert!(target.contains(&format!("state={}", oauth_state)));
}

#[tokio::test]
async fn test_login_with_credential_goes_home() {
    let state = idle_state("http://127.0.0.1:9");
    let cookie = sign_in(&state).await;

    let response = get(&state, "/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

async fn pending_sign_in(state: &AppState, oauth_state: &str) -> String {
    let mut session = state.sessions.create().await;
    session.user_id = Some(USER_ID.to_string());
    session.oauth_state = Some(oauth_state.to_string());
    let session = state.sessions.update(session).await;
    cookie_pair(&state.sessions.session_cookie(&session))
}

#[tokio::test]
async fn test_callback_rejects_foreign_state() {
    let state = idle_state("http://127.0.0.1:9");
    let cookie = pending_sign_in(&state, "expected").await;

    let response = get(&state, "/oauth2callback?code=c1&state=forged", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.credentials.load(USER_ID).await.is_none());
}

#[tokio::test]
async fn test_callback_stores_credential_and_profile() {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "scope": "openid"
        })))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/people/me"))
        .and(header_matcher("authorization", "Bearer fresh-token"))
        .and(query_param("personFields", "emailAddresses,names"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceName": "people/1234",
            "emailAddresses": [{ "value": "alice@example.com" }]
        })))
        .expect(1)
        .mount(&google)
        .await;

    let state = idle_state(&google.uri());
    let cookie = pending_sign_in(&state, "xyz").await;

    let response = get(&state, "/oauth2callback?code=c1&state=xyz", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let credential = state.credentials.load(USER_ID).await.unwrap();
    assert_eq!(credential.access_token, "fresh-token");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let signed_in = cookie_pair(set_cookie);
    assert_ne!(signed_in, cookie);

    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::COOKIE, signed_in.parse().unwrap());
    let session = state.sessions.from_headers(&headers).await.unwrap();
    assert_eq!(session.user_id.as_deref(), Some(USER_ID));
    assert_eq!(session.google_account_id.as_deref(), Some("1234"));
    assert_eq!(session.google_account_email.as_deref(), Some("alice@example.com"));
    assert!(session.oauth_state.is_none());

    // the cookie issued before sign-in no longer addresses any session
    let mut stale = axum::http::HeaderMap::new();
    stale.insert(header::COOKIE, cookie.parse().unwrap());
    assert!(state.sessions.from_headers(&stale).await.is_none());
    let page = body_text(get(&state, "/", Some(&cookie)).await).await;
    assert!(!page.contains("alice@example.com"));
}

#[tokio::test]
async fn test_logout_revokes_and_forgets() {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/revoke"))
        .and(query_param("token", "user-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&google)
        .await;

    let state = idle_state(&google.uri());
    let cookie = sign_in(&state).await;

    let response = get(&state, "/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(response.headers().contains_key(header::SET_COOKIE));

    assert!(state.credentials.load(USER_ID).await.is_none());
    let after = get(&state, "/calendar-collection", Some(&cookie)).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_goes_home() {
    let state = idle_state("http://127.0.0.1:9");

    let response = get(&state, "/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_calendar_collection_page() {
    let mut calendar = MockCalendar::new();
    calendar
        .expect_collect_events()
        .withf(|token, window| token == "user-token" && window.start < window.end)
        .times(1)
        .returning(|_, _| {
            Ok(vec![CalendarEventRecord {
                event_id: "e1".to_string(),
                ..Default::default()
            }])
        });

    let mut store = MockStore::new();
    store
        .expect_load_calendar_events()
        .withf(|records| records.len() == 1)
        .times(1)
        .returning(|_| {
            Ok(LoadSummary {
                inserted: 1,
                ..Default::default()
            })
        });
    store
        .expect_calendar_events_for()
        .withf(|identity| identity.email == "alice@example.com" && identity.account_id == "1234")
        .times(1)
        .returning(|_| {
            Ok(vec![CalendarEventRecord {
                event_id: "e1".to_string(),
                event_title: "<script>alert(1)</script>".to_string(),
                total_time: "60.0 minutes".to_string(),
                ..Default::default()
            }])
        });

    let state = build_state(
        "http://127.0.0.1:9",
        calendar,
        MockDrive::new(),
        store,
        MockCatalog::new(),
    );
    let cookie = sign_in(&state).await;

    let response = get(&state, "/calendar-collection", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Google Calendar Event Collection for alice@example.com"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("<td>60.0 minutes</td>"));
}

#[tokio::test]
async fn test_drive_activity_page() {
    let mut drive = MockDrive::new();
    drive
        .expect_collect_activities()
        .withf(|token, _| token == "user-token")
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let mut store = MockStore::new();
    store
        .expect_load_drive_activities()
        .times(1)
        .returning(|_| Ok(LoadSummary::default()));
    store
        .expect_drive_activities_for()
        .times(1)
        .returning(|_| {
            Ok(vec![DriveActivityRecord {
                activity_id: "a1".to_string(),
                primary_action: "edit".to_string(),
                item: "driveItem:'Plan'".to_string(),
                ..Default::default()
            }])
        });

    let state = build_state(
        "http://127.0.0.1:9",
        MockCalendar::new(),
        drive,
        store,
        MockCatalog::new(),
    );
    let cookie = sign_in(&state).await;

    let response = get(&state, "/drive-activity", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Drive Activity Log Collection for alice@example.com"));
    assert!(html.contains("<th>Sub Action Result</th>"));
    assert!(html.contains("<td>driveItem:&#39;Plan&#39;</td>"));
}

#[tokio::test]
async fn test_failed_load_reports_error_page() {
    let mut drive = MockDrive::new();
    drive
        .expect_collect_activities()
        .returning(|_, _| Ok(vec![DriveActivityRecord::default()]));

    let mut store = MockStore::new();
    store
        .expect_load_drive_activities()
        .returning(|_| Err(storage_error("table is gone")));
    store.expect_drive_activities_for().never();

    let state = build_state(
        "http://127.0.0.1:9",
        MockCalendar::new(),
        drive,
        store,
        MockCatalog::new(),
    );
    let cookie = sign_in(&state).await;

    let response = get(&state, "/drive-activity", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("table is gone"));
}

#[tokio::test]
async fn test_datasets_overview_as_json() {
    let mut catalog = MockCatalog::new();
    catalog.expect_datasets_overview().times(1).returning(|| {
        Ok(vec![DatasetOverview {
            dataset_id: "demo_data_set1".to_string(),
            friendly_name: "No friendly name".to_string(),
            description: "No description".to_string(),
            location: "EU".to_string(),
            tables: Vec::new(),
        }])
    });

    let state = build_state(
        "http://127.0.0.1:9",
        MockCalendar::new(),
        MockDrive::new(),
        MockStore::new(),
        catalog,
    );
    let cookie = sign_in(&state).await;

    let response = get(&state, "/bigquery/datasets", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body[0]["datasetId"], "demo_data_set1");
    assert_eq!(body[0]["location"], "EU");
}
