//! Google OAuth2 authorization code flow for the signed-in user.
//!
//! The flow runs against the plain REST endpoints: the consent URL is built
//! locally, the code and refresh exchanges are form posts to the token
//! endpoint, and logout posts the access token to the revoke endpoint.

use chrono::{DateTime, Duration, Utc};
use gactivity_common::HTTP_CLIENT;
use gactivity_config::GoogleOAuthConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AuthError;

/// Scopes requested from the user.
pub const USER_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/drive.activity.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_SKEW_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// A user's OAuth credential as kept by the [`crate::CredentialStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl StoredCredential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expires_at| now + Duration::seconds(EXPIRY_SKEW_SECS) >= expires_at)
            .unwrap_or(false)
    }

    fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_in.map(|secs| now + Duration::seconds(secs)),
            scope: response.scope,
        }
    }
}

/// Client for Google's OAuth2 endpoints.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self::with_client(HTTP_CLIENT.clone(), config)
    }

    pub fn with_client(client: Client, config: GoogleOAuthConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GoogleOAuthConfig {
        &self.config
    }

    /// Builds the consent screen URL. `offline` access makes Google return a
    /// refresh token on the first exchange.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, AuthError> {
        if self.config.client_id.is_empty() {
            return Err(AuthError::ConfigError(
                "google_oauth.client_id is not set".to_string(),
            ));
        }
        let scope = USER_SCOPES.join(" ");
        let query = serde_urlencoded::to_string([
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("include_granted_scopes", "true"),
            ("prompt", "consent"),
            ("state", state),
        ])?;
        Ok(format!("{}?{}", self.config.auth_url, query))
    }

    /// Exchanges an authorization code for a credential.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<StoredCredential, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.request_token(&params).await?;
        info!("Exchanged authorization code for an access token");
        Ok(StoredCredential::from_response(response, Utc::now()))
    }

    /// Uses the refresh token to obtain a new access token.
    ///
    /// Google usually omits the refresh token in this response; the old one is kept.
    pub async fn refresh(&self, credential: &StoredCredential) -> Result<StoredCredential, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(AuthError::MissingRefreshToken)?;
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&params).await?;
        debug!("Refreshed access token");

        let mut refreshed = StoredCredential::from_response(response, Utc::now());
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = credential.refresh_token.clone();
        }
        Ok(refreshed)
    }

    /// Revokes the token at Google.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(&self.config.revoke_url)
            .query(&[("token", token)])
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        info!("Revoked Google access token");
        Ok(())
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(AuthError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
