//! Error types raised while fetching catalog pages.

use pokedex_core::{FetchFailure, FetchFailureKind};
use thiserror::Error;

/// Failure raised by a [`PageSource`](crate::PageSource).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built, sent, or read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The body was not a JSON array of records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Converts the error into the cloneable failure carried by world events.
    #[must_use]
    pub fn to_failure(&self) -> FetchFailure {
        let kind = match self {
            Self::Http(error) if error.is_decode() => FetchFailureKind::Decode,
            Self::Http(_) => FetchFailureKind::Transport,
            Self::Status { status, .. } => FetchFailureKind::Status { code: *status },
            Self::Json(_) => FetchFailureKind::Decode,
        };
        let message = match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        };
        FetchFailure::new(kind, message)
    }
}

impl From<FetchError> for FetchFailure {
    fn from(error: FetchError) -> Self {
        error.to_failure()
    }
}
