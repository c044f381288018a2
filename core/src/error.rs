//! Centralized error types for the recorder core.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error kinds using `thiserror`
//! - Maps each kind to an HTTP status code
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type for the recorder and records catalog.
///
/// Variant names are the error "kinds" the specification enumerates; the
/// HTTP layer maps each one to a status code via [`RecorderError::status_code`].
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum RecorderError {
    /// No scheduled instance matched the request within the search window.
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    /// The port pool has no free port to reserve.
    #[error("Recorder busy: no ports available")]
    RecorderBusy,

    /// The event exists but is not of the recordable variety.
    #[error("Bad event type: {0}")]
    BadEventType(String),

    /// The requested container format is not in the supported set.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The schedule service has no event with the given id.
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// No record exists under the resolved key.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// A record already exists under the resolved key.
    #[error("Record already exists: {0}")]
    RecordAlreadyExists(String),

    /// The remote schedule service could not be reached or returned an
    /// unexpected error.
    #[error("Schedule service unavailable: {0}")]
    ScheduleUnavailable(String),

    /// The object store could not be reached or returned an unexpected error.
    #[error("Object store unavailable: {0}")]
    ObjectStoreUnavailable(String),

    /// The pipeline failed to launch (neither stage started successfully).
    #[error("Pipeline launch failed: {0}")]
    PipelineLaunchFailed(String),

    /// The request was cancelled before it completed.
    #[error("Cancelled")]
    Cancelled,
}

impl RecorderError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InstanceNotFound(_) => "instance_not_found",
            Self::RecorderBusy => "recorder_busy",
            Self::BadEventType(_) => "bad_event_type",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::EventNotFound(_) => "event_not_found",
            Self::RecordNotFound(_) => "record_not_found",
            Self::RecordAlreadyExists(_) => "record_already_exists",
            Self::ScheduleUnavailable(_) => "schedule_unavailable",
            Self::ObjectStoreUnavailable(_) => "object_store_unavailable",
            Self::PipelineLaunchFailed(_) => "pipeline_launch_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Maps the error to its HTTP status code per the `/record` and
    /// `/records` contracts.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InstanceNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RecorderBusy => StatusCode::CONFLICT,
            Self::BadEventType(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::RecordNotFound(_) => StatusCode::NOT_FOUND,
            Self::RecordAlreadyExists(_) => StatusCode::CONFLICT,
            Self::ScheduleUnavailable(_) | Self::ObjectStoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::PipelineLaunchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type RecorderResult<T> = Result<T, RecorderError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for RecorderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_busy_maps_to_409() {
        let err = RecorderError::RecorderBusy;
        assert_eq!(err.code(), "recorder_busy");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn instance_not_found_maps_to_422() {
        let err = RecorderError::InstanceNotFound("abc".into());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn record_already_exists_maps_to_409() {
        let err = RecorderError::RecordAlreadyExists("abc/2025".into());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
