use std::fmt;
use thiserror::Error;

/// The base error type shared by every gactivity crate.
///
/// Domain crates keep their own error enums and implement
/// `From<DomainError> for GactivityError` so handlers can use `?` freely.
#[derive(Error, Debug)]
pub enum GactivityError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller has no valid Google credential
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error reading from or writing to the record store
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error returned by a Google API
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maps an error to the HTTP status code it should be reported with.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for GactivityError {
    fn status_code(&self) -> u16 {
        match self {
            GactivityError::HttpError(_) => 502,
            GactivityError::ParseError(_) => 400,
            GactivityError::ConfigError(_) => 500,
            GactivityError::AuthError(_) => 401,
            GactivityError::ValidationError(_) => 400,
            GactivityError::StorageError(_) => 500,
            GactivityError::ExternalServiceError { .. } => 502,
            GactivityError::NotFoundError(_) => 404,
            GactivityError::InternalError(_) => 500,
        }
    }
}

impl From<reqwest::Error> for GactivityError {
    fn from(err: reqwest::Error) -> Self {
        GactivityError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for GactivityError {
    fn from(err: serde_json::Error) -> Self {
        GactivityError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for GactivityError {
    fn from(err: std::io::Error) -> Self {
        GactivityError::InternalError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> GactivityError {
    GactivityError::ConfigError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> GactivityError {
    GactivityError::AuthError(message.to_string())
}

pub fn storage_error<T: fmt::Display>(message: T) -> GactivityError {
    GactivityError::StorageError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GactivityError {
    GactivityError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> GactivityError {
    GactivityError::InternalError(message.to_string())
}
