//! Error types for catalog and starred-repository operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while enumerating, reconciling, or starring repositories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StarsError {
    /// The operation needs an access token that has not been obtained.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Could not reach the API: {0}")]
    ProviderUnreachable(String),

    #[error("Unexpected response body: {0}")]
    MalformedResponse(String),

    /// A page past the first failed; the whole aggregate is discarded.
    #[error("Failed to fetch page {page} of starred repositories: {reason}")]
    PaginationFetchFailed { page: u32, reason: String },

    /// A single-shot request came back with an unexpected status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid repository identifier '{0}', expected owner/name")]
    InvalidRepo(String),
}

impl StarsError {
    pub(crate) fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<HttpError> for StarsError {
    fn from(err: HttpError) -> Self {
        Self::ProviderUnreachable(err.to_string())
    }
}
