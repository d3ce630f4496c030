use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use console::style;
use thanks::http::reqwest_transport::ReqwestTransport;
use thanks::oauth::{AccessToken, DeviceAuthenticator, PollCallback, PollEvent};
use thanks::stars::{CatalogClient, ReconciledRepo, StarredSetAggregator, reconcile};

use crate::commands::vault::discover_known_identifiers;
use crate::config::Config;
use crate::shutdown::stop_on_ctrl_c;

/// Per-request timeout for all API calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) type Transport = Arc<ReqwestTransport>;

pub(crate) fn transport() -> Result<Transport, Box<dyn std::error::Error>> {
    Ok(Arc::new(ReqwestTransport::with_timeout(HTTP_TIMEOUT)?))
}

/// Resolve the vault from the flag, then config, then the current directory.
pub(crate) fn resolve_vault(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.vault.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Use the configured token, or run the device flow.
pub(crate) async fn obtain_token(
    config: &Config,
    transport: &Transport,
    is_tty: bool,
) -> Result<AccessToken, Box<dyn std::error::Error>> {
    if let Some(token) = config.github_token() {
        tracing::debug!("Using configured GitHub token");
        return Ok(AccessToken::bearer(token));
    }
    device_login(config, transport, is_tty).await
}

/// Run the OAuth device flow, showing the user code and following poll events.
pub(crate) async fn device_login(
    config: &Config,
    transport: &Transport,
    is_tty: bool,
) -> Result<AccessToken, Box<dyn std::error::Error>> {
    let auth = DeviceAuthenticator::new(Arc::clone(transport), config.settings.device_flow());
    let grant = auth.begin(&config.settings.scope).await?;

    if is_tty {
        println!("Please visit: {}", style(&grant.verification_uri).cyan());
        println!();
        println!("Your code: {}", style(&grant.user_code).bold());
        println!();
        println!(
            "Waiting for authorization (expires in {} seconds, Ctrl+C to cancel)...",
            grant.expires_in
        );
    } else {
        tracing::info!(
            verification_uri = %grant.verification_uri,
            user_code = %grant.user_code,
            "Please authorize the application"
        );
    }

    if let Err(e) = open::that(&grant.verification_uri) {
        tracing::debug!(error = %e, "Could not open browser");
    }

    let on_event: PollCallback = Box::new(move |event| match event {
        PollEvent::SlowDown { interval, .. } if is_tty => {
            println!(
                "{} GitHub asked us to slow down, polling every {}s",
                style("!").yellow(),
                interval.as_secs()
            );
        }
        PollEvent::SlowDown { interval, ticks } => {
            tracing::info!(interval_secs = interval.as_secs(), ticks, "Slowing down polling");
        }
        PollEvent::Pending {
            ticks,
            remaining_seconds,
        } => {
            tracing::debug!(ticks, remaining_seconds, "Authorization pending");
        }
        _ => {}
    });

    let mut session = auth.poll(grant);
    let ctrl_c = stop_on_ctrl_c(session.stop_handle());
    let result = session.run(Some(&on_event)).await;
    ctrl_c.abort();

    let token = result?;
    if is_tty {
        println!("{} Authorized with GitHub", style("✓").green().bold());
    }
    Ok(token)
}

/// Discover installed items, fetch catalogs and the starred set, and reconcile.
pub(crate) async fn load_reconciled(
    config: &Config,
    transport: &Transport,
    token: &AccessToken,
    vault: &Path,
    lookup_star_counts: bool,
) -> Result<Vec<ReconciledRepo>, Box<dyn std::error::Error>> {
    let known = discover_known_identifiers(vault)?;
    let settings = &config.settings;

    let catalogs = CatalogClient::new(Arc::clone(transport), settings.user_agent.as_str());
    let aggregator = StarredSetAggregator::new(Arc::clone(transport), settings.aggregator());

    let (candidates, starred) = tokio::try_join!(
        catalogs.fetch_candidates(
            &settings.plugin_catalog_url,
            &settings.theme_catalog_url,
            &known,
        ),
        aggregator.fetch_all_starred(Some(token)),
    )?;

    let mut reconciled = reconcile(&candidates, &starred);
    if lookup_star_counts {
        let resolved = aggregator
            .resolve_star_counts(Some(token), &mut reconciled)
            .await;
        tracing::debug!(resolved, "Resolved star counts for unstarred repositories");
    }
    Ok(reconciled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_flag_wins_over_config() {
        let config = Config {
            vault: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        assert_eq!(
            resolve_vault(Some(PathBuf::from("/from/flag")), &config),
            PathBuf::from("/from/flag")
        );
        assert_eq!(resolve_vault(None, &config), PathBuf::from("/from/config"));
        assert_eq!(resolve_vault(None, &Config::default()), PathBuf::from("."));
    }
}
