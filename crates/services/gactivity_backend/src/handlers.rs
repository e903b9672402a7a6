// File: crates/services/gactivity_backend/src/handlers.rs
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use gactivity_auth::{AuthError, Session, StoredCredential};
use gactivity_bigquery::DatasetOverview;
use gactivity_common::{auth_error, AccountIdentity, GactivityError};
use gactivity_config::AppConfig;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::pipelines::{run_calendar_pipeline, run_drive_pipeline};
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `{scheme}://{host}{redirect_path}`, preferring the configured public base URL.
pub fn redirect_uri(config: &AppConfig, headers: &HeaderMap) -> String {
    let path = &config.google_oauth.redirect_path;
    if let Some(base) = config
        .server
        .public_base_url
        .as_deref()
        .filter(|base| !base.is_empty())
    {
        return format!("{}{}", base.trim_end_matches('/'), path);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}{}", scheme, host, path)
}

fn redirect_with_cookie(cookie: String, location: &str) -> Response {
    ([(header::SET_COOKIE, cookie)], Redirect::to(location)).into_response()
}

fn identity(session: &Session) -> AccountIdentity {
    AccountIdentity {
        account_id: session.google_account_id.clone().unwrap_or_default(),
        email: session.google_account_email.clone().unwrap_or_default(),
    }
}

/// Session and a usable credential, refreshed when expired.
async fn authenticated(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Session, StoredCredential), GactivityError> {
    let session = state
        .sessions
        .from_headers(headers)
        .await
        .ok_or_else(|| auth_error("User is not authenticated"))?;
    let user_id = session
        .user_id
        .as_deref()
        .ok_or_else(|| auth_error("User is not authenticated"))?;
    let credential = state
        .credentials
        .load_fresh(user_id, &state.oauth)
        .await?
        .ok_or_else(|| auth_error("User is not authenticated"))?;
    Ok((session, credential))
}

pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = state.sessions.from_headers(&headers).await;
    let email = session.and_then(|session| session.google_account_email);
    Html(views::index_page(email.as_deref()))
}

/// Starts the consent flow unless the browser already has a credential.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GactivityError> {
    let mut session = match state.sessions.from_headers(&headers).await {
        Some(session) => session,
        None => state.sessions.create().await,
    };

    if let Some(user_id) = session.user_id.as_deref() {
        if state.credentials.load(user_id).await.is_some() {
            return Ok(Redirect::to("/").into_response());
        }
    }

    if session.user_id.is_none() {
        session.user_id = Some(Uuid::new_v4().to_string());
    }
    let oauth_state = Uuid::new_v4().simple().to_string();
    session.oauth_state = Some(oauth_state.clone());
    let session = state.sessions.update(session).await;

    let url = state
        .oauth
        .authorization_url(&redirect_uri(&state.config, &headers), &oauth_state)?;
    Ok(redirect_with_cookie(state.sessions.session_cookie(&session), &url))
}

pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, GactivityError> {
    if let Some(error) = query.error.as_deref() {
        warn!("Google sign-in was not completed: {}", error);
        return Err(auth_error(format!("Sign-in failed: {}", error)));
    }

    let mut session = state
        .sessions
        .from_headers(&headers)
        .await
        .ok_or_else(|| auth_error("No sign-in in progress for this browser"))?;
    let expected = session.oauth_state.take();
    if expected.is_none() || expected != query.state {
        return Err(AuthError::StateMismatch.into());
    }
    let user_id = session
        .user_id
        .clone()
        .ok_or_else(|| auth_error("No sign-in in progress for this browser"))?;
    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| GactivityError::ValidationError("Missing authorization code".to_string()))?;

    let credential = state
        .oauth
        .exchange_code(code, &redirect_uri(&state.config, &headers))
        .await?;
    let profile = state.people.me(&credential.access_token).await?;
    state.credentials.store(&user_id, credential).await;

    info!("Signed in {} ({})", profile.email, profile.account_id);
    session.google_account_id = Some(profile.account_id);
    session.google_account_email = Some(profile.email);
    let session = state.sessions.rotate(session).await;

    Ok(redirect_with_cookie(state.sessions.session_cookie(&session), "/"))
}

/// Revokes the token, forgets the credential and ends the session.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = state.sessions.from_headers(&headers).await else {
        return Redirect::to("/").into_response();
    };
    let credential = match session.user_id.as_deref() {
        Some(user_id) => state.credentials.load(user_id).await,
        None => None,
    };
    let (Some(user_id), Some(credential)) = (session.user_id.as_deref(), credential) else {
        return Redirect::to("/").into_response();
    };

    if let Err(err) = state.oauth.revoke(&credential.access_token).await {
        warn!("Failed to revoke access token: {}", err);
    }
    state.credentials.delete(user_id).await;
    state.sessions.invalidate(&session.id).await;
    info!("Signed out user {}", user_id);

    redirect_with_cookie(state.sessions.removal_cookie(), "/")
}

pub async fn calendar_collection_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, GactivityError> {
    let (session, credential) = authenticated(&state, &headers).await?;
    let identity = identity(&session);
    let events =
        run_calendar_pipeline(&state, &credential.access_token, &identity, Utc::now()).await?;
    Ok(Html(views::calendar_page(&identity.email, &events)))
}

pub async fn drive_activity_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, GactivityError> {
    let (session, credential) = authenticated(&state, &headers).await?;
    let identity = identity(&session);
    let activities =
        run_drive_pipeline(&state, &credential.access_token, &identity, Utc::now()).await?;
    Ok(Html(views::drive_activity_page(&identity.email, &activities)))
}

pub async fn datasets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DatasetOverview>>, GactivityError> {
    authenticated(&state, &headers).await?;
    Ok(Json(state.catalog.datasets_overview().await?))
}
