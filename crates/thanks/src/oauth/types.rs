//! Wire types for the device authorization and token endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Response from the device code endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceGrant {
    /// The device verification code (sent back while polling).
    pub device_code: String,

    /// The code the user enters at the verification URL.
    pub user_code: String,

    /// The URL where the user enters the code.
    pub verification_uri: String,

    /// How long until the device code expires (in seconds).
    pub expires_in: u64,

    /// Minimum interval between polling requests (in seconds).
    pub interval: u64,
}

/// Successful access token response.
///
/// Held in memory only. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessToken {
    /// The OAuth access token.
    pub access_token: String,

    /// The granted scopes (comma or space separated).
    #[serde(default)]
    pub scope: String,

    /// The token type (usually "bearer").
    #[serde(default)]
    pub token_type: String,
}

impl AccessToken {
    /// Wrap an existing bearer token, e.g. one supplied through the environment.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            scope: String::new(),
            token_type: "bearer".to_string(),
        }
    }

    /// The value for an `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Error payload from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthReply {
    /// The error identifier.
    pub error: String,

    #[serde(default)]
    pub error_description: Option<String>,

    /// Link to the provider docs for this error.
    #[serde(default)]
    pub error_uri: Option<String>,

    /// New minimum polling interval, sent along with `slow_down`.
    #[serde(default)]
    pub interval: Option<u64>,
}

/// Classified [`AuthReply::error`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode<'a> {
    AuthorizationPending,
    SlowDown,
    ExpiredToken,
    Other(&'a str),
}

impl AuthReply {
    pub fn code(&self) -> AuthErrorCode<'_> {
        match self.error.as_str() {
            "authorization_pending" => AuthErrorCode::AuthorizationPending,
            "slow_down" => AuthErrorCode::SlowDown,
            "expired_token" => AuthErrorCode::ExpiredToken,
            other => AuthErrorCode::Other(other),
        }
    }
}

/// Decoded token endpoint response: either a token or an error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenReply {
    Granted(AccessToken),
    Rejected(AuthReply),
}

/// The endpoint does not tag its replies, so decoding checks for
/// `access_token` first and falls back to the error shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireTokenReply {
    Granted(AccessToken),
    Rejected(AuthReply),
}

impl TokenReply {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_slice::<WireTokenReply>(body)? {
            WireTokenReply::Granted(token) => Self::Granted(token),
            WireTokenReply::Rejected(reply) => Self::Rejected(reply),
        })
    }
}
