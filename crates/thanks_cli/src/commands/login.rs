//! Login command: run the OAuth device flow once.
//!
//! The token is held in memory only. `--print-token` writes it to stdout so
//! it can be exported as `THANKS_GITHUB_TOKEN` for later runs.

use console::{Term, style};
use thanks::stars::StarredSetAggregator;

use crate::commands::shared::{device_login, transport};
use crate::config::Config;

pub(crate) async fn handle_login(
    config: &Config,
    print_token: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();
    let transport = transport()?;

    let token = device_login(config, &transport, is_tty).await?;

    let aggregator = StarredSetAggregator::new(transport, config.settings.aggregator());
    let starred = aggregator.fetch_all_starred(Some(&token)).await?;

    if is_tty {
        println!(
            "You have starred {} repositories.",
            style(starred.len()).cyan()
        );
    } else {
        tracing::info!(starred = starred.len(), "GitHub authentication successful");
    }

    if print_token {
        println!("{}", token.access_token);
    } else if is_tty {
        println!();
        println!("Run with --print-token to export it as THANKS_GITHUB_TOKEN.");
    }

    Ok(())
}
