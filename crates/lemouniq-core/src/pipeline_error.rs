//! Per-file pipeline failures.
//!
//! Every stage that runs against a single uploaded image returns
//! [`PipelineResult`]. The orchestrator never lets one of these escape the
//! request; it records the [`ErrorKind`] on the file instead.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("{service} unavailable: {message}")]
    ExternalServiceUnavailable {
        service: &'static str,
        message: String,
    },

    #[error("Mockup task {task_key} failed: {reason}")]
    TaskFailed { task_key: String, reason: String },

    #[error("Mockup task {task_key} did not finish after {attempts} polls")]
    TaskTimedOut { task_key: String, attempts: u32 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Persistence error: {0}")]
    Persistence(#[from] io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Serializable classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidImage,
    UnsupportedExtension,
    ExternalServiceUnavailable,
    TaskFailed,
    TaskTimedOut,
    Cancelled,
    PersistenceError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ErrorKind::InvalidImage => write!(f, "invalid_image"),
            ErrorKind::UnsupportedExtension => write!(f, "unsupported_extension"),
            ErrorKind::ExternalServiceUnavailable => write!(f, "external_service_unavailable"),
            ErrorKind::TaskFailed => write!(f, "task_failed"),
            ErrorKind::TaskTimedOut => write!(f, "task_timed_out"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::PersistenceError => write!(f, "persistence_error"),
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidImage(_) => ErrorKind::InvalidImage,
            PipelineError::UnsupportedExtension(_) => ErrorKind::UnsupportedExtension,
            PipelineError::ExternalServiceUnavailable { .. } => {
                ErrorKind::ExternalServiceUnavailable
            }
            PipelineError::TaskFailed { .. } => ErrorKind::TaskFailed,
            PipelineError::TaskTimedOut { .. } => ErrorKind::TaskTimedOut,
            PipelineError::Cancelled => ErrorKind::Cancelled,
            PipelineError::Persistence(_) => ErrorKind::PersistenceError,
        }
    }

    /// Shorthand for a failed call to a named external service.
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        PipelineError::ExternalServiceUnavailable {
            service,
            message: message.into(),
        }
    }
}
