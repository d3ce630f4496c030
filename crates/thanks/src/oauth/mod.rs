//! GitHub OAuth Device Flow.
//!
//! # Device Flow Overview
//!
//! 1. Request a device code ([`DeviceAuthenticator::begin`])
//! 2. Display the user code and verification URL to the user
//! 3. User visits the URL and enters the code
//! 4. Poll until the user completes authorization ([`PollSession::run`])
//! 5. Receive an access token
//!
//! Polling is a sequential loop: wait one interval on the [`Ticker`], send
//! one token request, apply the reply to the [`PollState`]. The next wait
//! starts only after the reply is in, so ticks never overlap. `slow_down`
//! raises the interval to `max(server interval, current) + 5s`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use thanks::http::reqwest_transport::ReqwestTransport;
//! use thanks::oauth::{DeviceAuthenticator, DeviceFlowConfig};
//!
//! let transport = Arc::new(ReqwestTransport::new(reqwest::Client::new()));
//! let auth = DeviceAuthenticator::new(transport, DeviceFlowConfig::default());
//!
//! let grant = auth.begin("public_repo").await?;
//! println!("Go to {} and enter {}", grant.verification_uri, grant.user_code);
//!
//! let mut session = auth.poll(grant);
//! let stop = session.stop_handle(); // hand to the UI's close button
//! let token = session.run(None).await?;
//! ```

mod device;
mod error;
mod state;
mod ticker;
mod types;

pub use device::{
    DEVICE_CODE_GRANT_TYPE, DeviceAuthenticator, DeviceFlowConfig, PollCallback, PollSession,
    StopHandle,
};
pub use error::OAuthError;
pub use state::{
    PollEvent, PollState, PollStatus, SLOW_DOWN_MARGIN_SECS, TickOutcome, TickStart,
};
pub use ticker::{Ticker, TokioTicker};
pub use types::{AccessToken, AuthErrorCode, AuthReply, DeviceGrant, TokenReply};
