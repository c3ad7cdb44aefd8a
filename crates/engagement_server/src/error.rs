//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use engagement_core::ServiceError;
use log::error;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Core service failure.
    Service(ServiceError),
    /// Blocking task panicked or was cancelled by the runtime.
    TaskFailed(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) if err.is_storage_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Service(_) | Self::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Service(err) => err.code(),
            Self::TaskFailed(_) => "task_failed",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::TaskFailed(details) => write!(f, "request task failed: {details}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::TaskFailed(_) => None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(
            "event=api_error module=server status={} error_code={} error={}",
            status.as_u16(),
            self.code(),
            self
        );
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
