//! Device authorization flow driver.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::{HttpRequest, HttpTransport};
use crate::settings::{DEFAULT_CLIENT_ID, DEFAULT_DEVICE_CODE_URL, DEFAULT_TOKEN_URL};

use super::error::OAuthError;
use super::state::{PollEvent, PollState, TickOutcome, TickStart};
use super::ticker::{Ticker, TokioTicker};
use super::types::{AccessToken, AuthReply, DeviceGrant, TokenReply};

/// Grant type sent while polling the token endpoint.
pub const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Callback invoked with intermediate poll events.
pub type PollCallback = Box<dyn Fn(PollEvent) + Send + Sync>;

fn emit(on_event: Option<&PollCallback>, event: PollEvent) {
    if let Some(cb) = on_event {
        cb(event);
    }
}

/// Endpoints and client identity for the device flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFlowConfig {
    pub client_id: String,
    pub device_code_url: String,
    pub token_url: String,
}

impl Default for DeviceFlowConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Obtains an [`AccessToken`] through the OAuth device flow.
pub struct DeviceAuthenticator<T> {
    transport: Arc<T>,
    ticker: Arc<dyn Ticker>,
    config: DeviceFlowConfig,
}

impl<T: HttpTransport> DeviceAuthenticator<T> {
    pub fn new(transport: Arc<T>, config: DeviceFlowConfig) -> Self {
        Self {
            transport,
            ticker: Arc::new(TokioTicker),
            config,
        }
    }

    /// Replace the timer used between polls.
    #[must_use]
    pub fn with_ticker(mut self, ticker: Arc<dyn Ticker>) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn config(&self) -> &DeviceFlowConfig {
        &self.config
    }

    /// Request a device/user code pair for `scope`.
    ///
    /// The caller shows `verification_uri` and `user_code` to the user, then
    /// starts polling with [`DeviceAuthenticator::poll`].
    pub async fn begin(&self, scope: &str) -> Result<DeviceGrant, OAuthError> {
        let request = HttpRequest::post(&self.config.device_code_url)
            .header("Accept", "application/json")
            .form(&[("client_id", self.config.client_id.as_str()), ("scope", scope)]);

        let response = self.transport.send(request).await?;

        if let Ok(grant) = serde_json::from_slice::<DeviceGrant>(&response.body) {
            debug!(
                expires_in = grant.expires_in,
                interval = grant.interval,
                "Received device code"
            );
            return Ok(grant);
        }

        if let Ok(reply) = serde_json::from_slice::<AuthReply>(&response.body) {
            warn!(error = %reply.error, "Device code request rejected");
            return Err(OAuthError::fatal(reply.error, reply.error_description));
        }

        Err(OAuthError::MalformedResponse(format!(
            "device code endpoint returned HTTP {}: {}",
            response.status,
            response.body_snippet()
        )))
    }

    /// Prepare a polling session for `grant`. Nothing is sent until
    /// [`PollSession::run`] is awaited.
    pub fn poll(&self, grant: DeviceGrant) -> PollSession<'_, T> {
        PollSession {
            authenticator: self,
            state: PollState::new(&grant),
            grant,
            stop: CancellationToken::new(),
            outcome: None,
        }
    }

    /// One token request.
    async fn exchange(&self, grant: &DeviceGrant) -> Result<TokenReply, OAuthError> {
        let request = HttpRequest::post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("device_code", grant.device_code.as_str()),
                ("grant_type", DEVICE_CODE_GRANT_TYPE),
            ]);

        let response = self.transport.send(request).await?;

        TokenReply::from_slice(&response.body).map_err(|e| {
            OAuthError::MalformedResponse(format!(
                "token endpoint returned HTTP {} ({}): {}",
                response.status,
                e,
                response.body_snippet()
            ))
        })
    }
}

/// Stops a [`PollSession`] from another task.
///
/// Stopping is idempotent and a no-op once the session has finished.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A single authentication attempt: one grant, one [`PollState`].
pub struct PollSession<'a, T> {
    authenticator: &'a DeviceAuthenticator<T>,
    grant: DeviceGrant,
    state: PollState,
    stop: CancellationToken,
    outcome: Option<Result<AccessToken, OAuthError>>,
}

impl<T: HttpTransport> PollSession<'_, T> {
    pub fn grant(&self) -> &DeviceGrant {
        &self.grant
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Whether a terminal outcome has been reached.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop.clone(),
        }
    }

    /// Re-arm a stopped session. Polling resumes at the last known interval
    /// and remaining lifetime; handles returned earlier no longer apply.
    pub fn restart(&mut self) -> StopHandle {
        if self.outcome.is_none() && self.stop.is_cancelled() {
            debug!(
                interval = self.state.current_interval(),
                remaining_seconds = self.state.remaining_seconds(),
                "Restarting device flow polling"
            );
            self.stop = CancellationToken::new();
        }
        self.stop_handle()
    }

    /// Poll until the attempt reaches a terminal state or is stopped.
    ///
    /// Returns [`OAuthError::Cancelled`] when stopped; every other result is
    /// terminal and is returned again by later calls without further requests.
    pub async fn run(
        &mut self,
        on_event: Option<&PollCallback>,
    ) -> Result<AccessToken, OAuthError> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let stop = self.stop.clone();
        let result = tokio::select! {
            biased;
            _ = stop.cancelled() => Err(OAuthError::Cancelled),
            result = self.drive(&stop, on_event) => result,
        };

        match &result {
            Err(OAuthError::Cancelled) => {
                debug!(ticks = self.state.ticks(), "Device flow polling stopped");
                return result;
            }
            Ok(token) => info!(scope = %token.scope, "Device flow authorized"),
            Err(e) => warn!(error = %e, "Device flow failed"),
        }

        self.outcome = Some(result.clone());
        result
    }

    async fn drive(
        &mut self,
        stop: &CancellationToken,
        on_event: Option<&PollCallback>,
    ) -> Result<AccessToken, OAuthError> {
        loop {
            if stop.is_cancelled() {
                return Err(OAuthError::Cancelled);
            }

            self.authenticator.ticker.wait(self.state.interval()).await;

            if stop.is_cancelled() {
                return Err(OAuthError::Cancelled);
            }

            if self.state.begin_tick() == TickStart::Expired {
                return Err(OAuthError::Expired);
            }

            debug!(
                tick = self.state.ticks(),
                remaining_seconds = self.state.remaining_seconds(),
                "Polling token endpoint"
            );

            let reply = match self.authenticator.exchange(&self.grant).await {
                Ok(reply) => reply,
                Err(e) => {
                    self.state.fail();
                    return Err(e);
                }
            };

            match self.state.apply(reply) {
                TickOutcome::Continue(event) => emit(on_event, event),
                TickOutcome::Finished(result) => return result,
            }
        }
    }
}
