use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::ValidationResult;

/// Body returned for every unexpected failure. Internal details never leave the process.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported language code '{0}', only 'en' and 'es' are supported")]
    UnsupportedLanguage(String),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),
}

impl From<ConfigError> for ProviderError {
    fn from(err: ConfigError) -> Self {
        ProviderError::InvalidConfig(err.to_string())
    }
}

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(ValidationResult),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("internal error")]
    Internal,
}

impl From<FormatError> for ApiError {
    fn from(_: FormatError) -> Self {
        ApiError::Internal
    }
}

impl From<ProviderError> for ApiError {
    fn from(_: ProviderError) -> Self {
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(result) => (StatusCode::BAD_REQUEST, Json(result)).into_response(),
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(INTERNAL_SERVER_ERROR_MESSAGE),
            )
                .into_response(),
        }
    }
}
