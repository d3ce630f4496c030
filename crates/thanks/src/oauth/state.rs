//! Poll state machine for the device flow.
//!
//! [`PollState`] holds everything the poll loop mutates. It is advanced by
//! two pure steps per tick, [`PollState::begin_tick`] and
//! [`PollState::apply`], so the transitions can be exercised without timers
//! or a network.

use std::time::Duration;

use super::error::OAuthError;
use super::types::{AccessToken, AuthErrorCode, DeviceGrant, TokenReply};

/// Seconds added on top of the server-suggested interval after `slow_down`.
pub const SLOW_DOWN_MARGIN_SECS: u64 = 5;

/// Where an attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    SlowDown,
    Success,
    Expired,
    FatalError,
}

impl PollStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Expired | Self::FatalError)
    }
}

/// Intermediate signals emitted between terminal states.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PollEvent {
    /// The user has not finished authorizing yet.
    Pending {
        /// Token requests issued so far in this attempt.
        ticks: u32,
        /// Seconds left on the device code.
        remaining_seconds: i64,
    },
    /// The server asked us to back off; `interval` is the new period.
    SlowDown { interval: Duration, ticks: u32 },
}

/// First half of a tick, decided before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStart {
    /// Time is up; no request is sent.
    Expired,
    /// Send a token request.
    Request,
}

/// Second half of a tick, after the token endpoint replied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep polling.
    Continue(PollEvent),
    /// The attempt is over.
    Finished(Result<AccessToken, OAuthError>),
}

/// Mutable state of one device-flow attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    remaining_seconds: i64,
    current_interval: u64,
    status: PollStatus,
    ticks: u32,
}

impl PollState {
    /// Fresh state for a grant. A zero interval is bumped to one second.
    pub fn new(grant: &DeviceGrant) -> Self {
        Self {
            remaining_seconds: i64::try_from(grant.expires_in).unwrap_or(i64::MAX),
            current_interval: grant.interval.max(1),
            status: PollStatus::Pending,
            ticks: 0,
        }
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    /// Current polling period in seconds.
    pub fn current_interval(&self) -> u64 {
        self.current_interval
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.current_interval)
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    /// Token requests issued so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Run the timer-fired part of a tick: expire, or charge one interval
    /// against the remaining lifetime and ask for a request.
    pub fn begin_tick(&mut self) -> TickStart {
        if self.remaining_seconds <= 0 {
            self.status = PollStatus::Expired;
            return TickStart::Expired;
        }

        self.remaining_seconds = self
            .remaining_seconds
            .saturating_sub(i64::try_from(self.current_interval).unwrap_or(i64::MAX));
        self.ticks += 1;
        TickStart::Request
    }

    /// Apply a token endpoint reply.
    pub fn apply(&mut self, reply: TokenReply) -> TickOutcome {
        let reply = match reply {
            TokenReply::Granted(token) => {
                self.status = PollStatus::Success;
                return TickOutcome::Finished(Ok(token));
            }
            TokenReply::Rejected(reply) => reply,
        };

        match reply.code() {
            AuthErrorCode::AuthorizationPending => {
                self.status = PollStatus::Pending;
                TickOutcome::Continue(PollEvent::Pending {
                    ticks: self.ticks,
                    remaining_seconds: self.remaining_seconds,
                })
            }
            AuthErrorCode::SlowDown => {
                let suggested = reply.interval.unwrap_or(0);
                self.current_interval = suggested
                    .max(self.current_interval)
                    .saturating_add(SLOW_DOWN_MARGIN_SECS);
                self.status = PollStatus::SlowDown;
                TickOutcome::Continue(PollEvent::SlowDown {
                    interval: self.interval(),
                    ticks: self.ticks,
                })
            }
            AuthErrorCode::ExpiredToken => {
                self.status = PollStatus::Expired;
                TickOutcome::Finished(Err(OAuthError::Expired))
            }
            AuthErrorCode::Other(code) => {
                self.status = PollStatus::FatalError;
                TickOutcome::Finished(Err(OAuthError::fatal(
                    code,
                    reply.error_description.clone(),
                )))
            }
        }
    }

    /// Record a failure that happened outside the OAuth protocol (transport
    /// or decoding). Always terminal.
    pub fn fail(&mut self) {
        self.status = PollStatus::FatalError;
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::AuthReply;
    use super::*;

    fn grant(interval: u64, expires_in: u64) -> DeviceGrant {
        DeviceGrant {
            device_code: "dc".to_string(),
            user_code: "ABCD-1234".to_string(),
            verification_uri: "https://github.com/login/device".to_string(),
            expires_in,
            interval,
        }
    }

    fn rejected(error: &str, interval: Option<u64>) -> TokenReply {
        TokenReply::Rejected(AuthReply {
            error: error.to_string(),
            error_description: None,
            error_uri: None,
            interval,
        })
    }

    #[test]
    fn new_state_starts_pending_at_grant_interval() {
        let state = PollState::new(&grant(5, 900));
        assert_eq!(state.status(), PollStatus::Pending);
        assert_eq!(state.current_interval(), 5);
        assert_eq!(state.remaining_seconds(), 900);
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn zero_interval_is_bumped() {
        let state = PollState::new(&grant(0, 900));
        assert_eq!(state.current_interval(), 1);
    }

    #[test]
    fn begin_tick_charges_the_current_interval() {
        let mut state = PollState::new(&grant(5, 15));
        assert_eq!(state.begin_tick(), TickStart::Request);
        assert_eq!(state.remaining_seconds(), 10);
        assert_eq!(state.ticks(), 1);
    }

    #[test]
    fn pending_keeps_interval() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        let outcome = state.apply(rejected("authorization_pending", None));
        assert_eq!(
            outcome,
            TickOutcome::Continue(PollEvent::Pending {
                ticks: 1,
                remaining_seconds: 895
            })
        );
        assert_eq!(state.current_interval(), 5);
        assert_eq!(state.status(), PollStatus::Pending);
    }

    #[test]
    fn slow_down_adds_margin_over_server_interval() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        state.apply(rejected("slow_down", Some(10)));
        assert_eq!(state.current_interval(), 15);
        assert_eq!(state.status(), PollStatus::SlowDown);
    }

    #[test]
    fn slow_down_without_server_interval_adds_margin_to_current() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        state.apply(rejected("slow_down", None));
        assert_eq!(state.current_interval(), 10);
    }

    #[test]
    fn slow_down_never_decreases_interval() {
        let mut state = PollState::new(&grant(5, 10_000));
        let suggestions = [Some(10), Some(3), None, Some(12), Some(1), Some(40), Some(2)];
        let mut previous = state.current_interval();

        for suggestion in suggestions {
            state.begin_tick();
            state.apply(rejected("slow_down", suggestion));
            assert!(state.current_interval() > previous);
            previous = state.current_interval();
        }
    }

    #[test]
    fn slow_down_does_not_reset_tick_count() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        state.apply(rejected("authorization_pending", None));
        state.begin_tick();
        state.apply(rejected("slow_down", Some(10)));
        state.begin_tick();
        assert_eq!(state.ticks(), 3);
        assert_eq!(state.remaining_seconds(), 900 - 5 - 5 - 15);
    }

    #[test]
    fn exhausted_lifetime_always_expires() {
        let histories: [&[&str]; 3] = [
            &[],
            &["authorization_pending", "authorization_pending"],
            &["slow_down", "authorization_pending", "slow_down"],
        ];

        for history in histories {
            let mut state = PollState::new(&grant(5, 20));
            for error in history {
                if state.begin_tick() == TickStart::Expired {
                    break;
                }
                state.apply(rejected(error, Some(5)));
            }
            while state.begin_tick() == TickStart::Request {
                state.apply(rejected("authorization_pending", None));
            }
            assert_eq!(state.status(), PollStatus::Expired);
            assert!(state.remaining_seconds() <= 0);
        }
    }

    #[test]
    fn granted_reply_is_success() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        let outcome = state.apply(TokenReply::Granted(AccessToken::bearer("t")));
        assert_eq!(
            outcome,
            TickOutcome::Finished(Ok(AccessToken::bearer("t")))
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn expired_token_reply_is_expired() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        let outcome = state.apply(rejected("expired_token", None));
        assert_eq!(outcome, TickOutcome::Finished(Err(OAuthError::Expired)));
        assert_eq!(state.status(), PollStatus::Expired);
    }

    #[test]
    fn other_errors_are_fatal_with_description() {
        let mut state = PollState::new(&grant(5, 900));
        state.begin_tick();
        let outcome = state.apply(TokenReply::Rejected(AuthReply {
            error: "access_denied".to_string(),
            error_description: Some("The authorization request was denied.".to_string()),
            error_uri: None,
            interval: None,
        }));

        assert_eq!(
            outcome,
            TickOutcome::Finished(Err(OAuthError::Fatal {
                error: "access_denied".to_string(),
                description: "The authorization request was denied.".to_string(),
            }))
        );
        assert_eq!(state.status(), PollStatus::FatalError);
    }
}
