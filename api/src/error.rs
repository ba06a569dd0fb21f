//! Error types for the API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use appstate::RecognitionError;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types, each mapping to one HTTP status code.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - malformed or rejected input
    BadRequest(String),

    /// Internal server error (500)
    Internal(String),

    /// Service unavailable (503) - every upstream candidate failed;
    /// carries one detail string per failed candidate
    ServiceUnavailable {
        message: String,
        details: Vec<String>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            Self::Internal(msg) => write!(f, "Internal Error: {}", msg),
            Self::ServiceUnavailable { message, .. } => {
                write!(f, "Service Unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response body: `{"error": ..., "details": [...]}` with `details`
/// only present on candidate-exhaustion failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            Self::ServiceUnavailable { message, details } => {
                (StatusCode::SERVICE_UNAVAILABLE, message, Some(details))
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

/// Convert `appstate::RecognitionError` to `ApiError`.
///
/// This is the primary error mapping from the backend to the API layer;
/// it fixes the status code for every failure class in the taxonomy.
impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        match &err {
            RecognitionError::InvalidUpload { .. }
            | RecognitionError::UnsupportedFormat { .. }
            | RecognitionError::UnreadableImage { .. }
            | RecognitionError::NotConfigured
            | RecognitionError::InvalidCredentialInput { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            RecognitionError::AllCandidatesFailed { attempts } => ApiError::ServiceUnavailable {
                message: err.to_string(),
                details: attempts.iter().map(|a| a.to_string()).collect(),
            },
            RecognitionError::MalformedUpstreamJson { .. }
            | RecognitionError::CredentialStorage { .. } => ApiError::Internal(err.to_string()),
        }
    }
}
