//! Maps internal errors onto the HTTP status codes named in §6: quota
//! rejection is `402` with `{error, remaining}`, auth failure is `401`,
//! a missing feature service is `503` with `{error, status}`, everything
//! else bubbles up as `500` with `{error}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nebula_error::{ConfigError, DeploymentError, Error as CoreError, LifecycleError};
use serde::Serialize;
use serde_json::json;

pub enum ApiError {
    /// `401`.
    Unauthorized,
    /// `402`, `{error, remaining}`.
    QuotaExceeded { remaining: i64 },
    /// `404`.
    NotFound { resource: String },
    /// `503`, `{error, status: "service_unavailable"}`.
    ServiceUnavailable { feature: String },
    /// `400`: the request body or query failed validation.
    BadRequest { message: String },
    /// `500`.
    Internal { message: String },
}

impl ApiError {
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error, remaining, status) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_owned(), None, None),
            ApiError::QuotaExceeded { remaining } => (StatusCode::PAYMENT_REQUIRED, "execution limit exceeded".to_owned(), Some(*remaining), None),
            ApiError::NotFound { resource } => (StatusCode::NOT_FOUND, format!("{resource} not found"), None, None),
            ApiError::ServiceUnavailable { feature } => (StatusCode::SERVICE_UNAVAILABLE, format!("{feature} is not available"), None, Some("service_unavailable")),
            ApiError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone(), None, None),
            ApiError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone(), None, None),
        };
        (code, Json(ErrorBody { error: &error, remaining, status })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(ConfigError::UnknownModuleType { .. } | ConfigError::UnknownStepType { .. } | ConfigError::UnknownTriggerType { .. } | ConfigError::UnknownHandlerType { .. } | ConfigError::DuplicateName { .. } | ConfigError::UnresolvedReference { .. } | ConfigError::CyclicDependency { .. }) => {
                Self::BadRequest { message: err.to_string() }
            }
            CoreError::Lifecycle(LifecycleError::ServiceNotFound { service }) => Self::ServiceUnavailable { feature: service },
            CoreError::Deployment(DeploymentError::UnknownStrategy { .. } | DeploymentError::InvalidStrategyConfig { .. } | DeploymentError::NoPreviousVersion { .. }) => {
                Self::BadRequest { message: err.to_string() }
            }
            other => Self::Internal { message: other.to_string() },
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::BadRequest { message: err.to_string() }
    }
}

impl From<DeploymentError> for ApiError {
    fn from(err: DeploymentError) -> Self {
        match err {
            DeploymentError::UnknownStrategy { .. } | DeploymentError::InvalidStrategyConfig { .. } | DeploymentError::NoPreviousVersion { .. } => {
                Self::BadRequest { message: err.to_string() }
            }
            DeploymentError::HealthCheckFailed { .. } | DeploymentError::Cancelled { .. } => Self::Internal { message: err.to_string() },
        }
    }
}

impl From<serde_yaml::Error> for ApiError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::bad_request(format!("invalid yaml: {err}"))
    }
}

/// Shorthand for building a `{error}` JSON body and an arbitrary 2xx
/// status — used by handlers that need to return a specific success
/// status (`201 Created`) without going through `axum::Json`'s default
/// `200`.
#[must_use]
pub fn message(text: impl Into<String>) -> serde_json::Value {
    json!({ "message": text.into() })
}
