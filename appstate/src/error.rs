//! Domain error types for the recognition backend.
//!
//! Every variant corresponds to one user-visible failure class; the API
//! layer maps these onto HTTP status codes. Per-candidate inference
//! failures are never surfaced individually — they accumulate into the
//! attempt log carried by [`RecognitionError::AllCandidatesFailed`].

use serde::Serialize;
use thiserror::Error;

/// One failed attempt against a single candidate model.
///
/// Ephemeral: exists only within one pipeline invocation, collected for
/// diagnostics when every candidate has been exhausted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAttempt {
    /// The model identifier that was tried.
    pub model: String,
    /// Error text describing why the attempt failed.
    pub error: String,
}

impl CandidateAttempt {
    pub fn new(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            error: error.into(),
        }
    }
}

impl std::fmt::Display for CandidateAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

/// Errors produced by the recognition backend (400/500/503 at the API layer).
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Missing or empty upload (400 Bad Request)
    #[error("Invalid upload: {reason}")]
    InvalidUpload { reason: String },

    /// Image decoded but is not JPEG/PNG (400 Bad Request)
    #[error("Unsupported image format '{detected}'. Use JPG/PNG.")]
    UnsupportedFormat { detected: String },

    /// Byte blob could not be decoded as an image (400 Bad Request)
    #[error("Invalid or unreadable image file: {reason}")]
    UnreadableImage { reason: String },

    /// No API credential configured (400 Bad Request)
    #[error("API key not configured. Please set it via /config.")]
    NotConfigured,

    /// Every candidate model failed (503 Service Unavailable)
    #[error("AI API Error: all candidate models failed")]
    AllCandidatesFailed { attempts: Vec<CandidateAttempt> },

    /// The winning candidate's text escaped per-candidate parsing
    /// (500 Internal Server Error)
    #[error("AI response from '{model}' was not valid JSON: {reason}")]
    MalformedUpstreamJson { model: String, reason: String },

    /// Empty secret on configure (400 Bad Request)
    #[error("Invalid credential: {reason}")]
    InvalidCredentialInput { reason: String },

    /// Credential file persistence failure (500 Internal Server Error)
    #[error("Failed to persist credential: {reason}")]
    CredentialStorage { reason: String },
}

impl RecognitionError {
    /// The ordered attempt log, when this error carries one.
    pub fn attempts(&self) -> &[CandidateAttempt] {
        match self {
            Self::AllCandidatesFailed { attempts } => attempts,
            _ => &[],
        }
    }
}
