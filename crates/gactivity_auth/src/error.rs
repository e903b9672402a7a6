use gactivity_common::{external_service_error, GactivityError};
use thiserror::Error;

/// Errors raised while talking to Google's OAuth and People endpoints.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to encode request: {0}")]
    EncodeError(#[from] serde_urlencoded::ser::Error),

    /// Google answered with a non-success status.
    #[error("Google OAuth error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("No refresh token stored for this credential")]
    MissingRefreshToken,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Profile error: {0}")]
    ProfileError(String),

    #[error("Missing configuration: {0}")]
    ConfigError(String),
}

impl From<AuthError> for GactivityError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::StateMismatch | AuthError::MissingRefreshToken => {
                GactivityError::AuthError(err.to_string())
            }
            AuthError::ApiError { status, .. } if status == 400 || status == 401 => {
                GactivityError::AuthError(err.to_string())
            }
            AuthError::ConfigError(message) => GactivityError::ConfigError(message),
            other => external_service_error("Google OAuth", other),
        }
    }
}
