use std::path::PathBuf;

use console::Term;

use crate::commands::output::{OutputFormat, RepoRow};
use crate::commands::shared::{load_reconciled, obtain_token, resolve_vault, transport};
use crate::config::Config;

/// List installed plugins and themes with their starred state.
pub(crate) async fn handle_list(
    config: &Config,
    vault: Option<PathBuf>,
    output: OutputFormat,
    star_counts: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();
    let vault = resolve_vault(vault, config);
    let transport = transport()?;

    let token = obtain_token(config, &transport, is_tty).await?;
    let lookup = star_counts || config.settings.lookup_star_counts;
    let reconciled = load_reconciled(config, &transport, &token, &vault, lookup).await?;

    let rows: Vec<RepoRow> = reconciled.iter().map(RepoRow::from).collect();
    println!("{}", RepoRow::render(&rows, output)?);

    let unstarred = reconciled.iter().filter(|r| !r.is_starred).count();
    tracing::info!(
        total = reconciled.len(),
        unstarred,
        "Listed installed plugins and themes"
    );
    Ok(())
}
