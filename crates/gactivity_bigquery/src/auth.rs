//! Access tokens for the BigQuery REST API.

use async_trait::async_trait;
use std::path::Path;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

use crate::error::BigQueryError;

pub const BIGQUERY_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/bigquery",
    "https://www.googleapis.com/auth/bigquery.insertdata",
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/cloud-platform.read-only",
];

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, BigQueryError>;
}

/// Service account credentials; yup-oauth2 caches and refreshes the token.
pub struct ServiceAccountTokens {
    auth: DefaultAuthenticator,
}

impl ServiceAccountTokens {
    pub async fn from_key_file(key_path: &str) -> Result<Self, BigQueryError> {
        let sa_key = read_service_account_key(Path::new(key_path))
            .await
            .map_err(|e| BigQueryError::TokenError(format!("{}: {}", key_path, e)))?;

        let auth = ServiceAccountAuthenticator::builder(sa_key)
            .build()
            .await
            .map_err(|e| BigQueryError::TokenError(e.to_string()))?;

        Ok(Self { auth })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, BigQueryError> {
        let token = self
            .auth
            .token(&BIGQUERY_SCOPES)
            .await
            .map_err(|e| BigQueryError::TokenError(e.to_string()))?;

        match token.token() {
            Some(token) => Ok(token.to_string()),
            None => Err(BigQueryError::TokenError("No token available".to_string())),
        }
    }
}

/// Fixed token, for emulators and tests.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, BigQueryError> {
        Ok(self.0.clone())
    }
}
