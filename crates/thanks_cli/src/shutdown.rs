use console::Term;
use thanks::oauth::StopHandle;
use tokio::task::JoinHandle;

/// Stop a polling session when Ctrl+C is pressed.
///
/// Abort the returned handle once polling is over.
pub(crate) fn stop_on_ctrl_c(stop: StopHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }

        if Term::stdout().is_term() {
            eprintln!("\nCancelling authorization...");
        } else {
            tracing::warn!("Cancellation requested, stopping authorization");
        }
        stop.stop();
    })
}
