//! Device flow error types.

use thiserror::Error;

use crate::http::HttpError;

/// Terminal failures of a device-flow attempt.
///
/// `authorization_pending` and `slow_down` never show up here: they are
/// ordinary polling states handled inside the poll loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    /// The request never completed (DNS, TLS, connection reset, ...).
    #[error("Could not reach the authorization server: {0}")]
    ProviderUnreachable(String),

    /// The server answered with a body we could not make sense of.
    #[error("Unexpected response from the authorization server: {0}")]
    MalformedResponse(String),

    /// The device code lifetime ran out. The user has to start over.
    #[error("Authorization expired. Please try again.")]
    Expired,

    /// The provider returned a non-recoverable OAuth error.
    #[error("Authorization failed ({error}): {description}")]
    Fatal {
        /// OAuth error code, e.g. `access_denied`.
        error: String,
        /// Human-readable description from the provider.
        description: String,
    },

    /// Polling was stopped by the caller. Not terminal: the session can be
    /// restarted.
    #[error("Polling was stopped before authorization completed.")]
    Cancelled,
}

impl OAuthError {
    /// Build a [`OAuthError::Fatal`] from a provider error code and optional description.
    pub fn fatal(error: impl Into<String>, description: Option<String>) -> Self {
        let error = error.into();
        let description = description.unwrap_or_else(|| error.clone());
        Self::Fatal { error, description }
    }

    /// Whether this error ends the attempt for good.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<HttpError> for OAuthError {
    fn from(err: HttpError) -> Self {
        Self::ProviderUnreachable(err.to_string())
    }
}
