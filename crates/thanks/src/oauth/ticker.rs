//! Timer seam for the poll loop.

use std::time::Duration;

use async_trait::async_trait;

/// Waits out one polling period.
///
/// The poll loop calls [`Ticker::wait`] once per tick and only after the
/// previous tick's request has resolved, so implementations never see
/// overlapping calls from the same session.
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn wait(&self, period: Duration);
}

/// Ticker backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn wait(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}
