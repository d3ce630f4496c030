use std::path::PathBuf;
use std::sync::Arc;

use console::{Term, style};
use thanks::stars::{ReconciledRepo, StarredSetAggregator};

use crate::commands::shared::{load_reconciled, obtain_token, resolve_vault, transport};
use crate::config::Config;

/// Star the repositories behind installed plugins and themes.
///
/// With no `repos`, every unstarred installed item is starred. Otherwise only
/// the named repositories are, and each must belong to an installed item.
pub(crate) async fn handle_star(
    config: &Config,
    vault: Option<PathBuf>,
    repos: Vec<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();
    let vault = resolve_vault(vault, config);
    let transport = transport()?;

    let token = obtain_token(config, &transport, is_tty).await?;
    let reconciled = load_reconciled(config, &transport, &token, &vault, false).await?;
    let targets = select_targets(&reconciled, &repos)?;

    if targets.is_empty() {
        if is_tty {
            println!("{} Everything installed is already starred", style("✓").green());
        } else {
            tracing::info!("Nothing to star");
        }
        return Ok(());
    }

    let aggregator = StarredSetAggregator::new(Arc::clone(&transport), config.settings.aggregator());
    let mut failed = 0usize;
    for entry in &targets {
        let repo = entry.candidate.repo();
        if dry_run {
            println!("Would star {} ({})", repo, entry.candidate.name());
            continue;
        }
        match aggregator.star_repo(Some(&token), repo).await {
            Ok(()) if is_tty => println!("{} Starred {}", style("★").yellow(), repo),
            Ok(()) => {}
            Err(e) => {
                failed += 1;
                if is_tty {
                    eprintln!("{} Failed to star {}: {}", style("✗").red(), repo, e);
                } else {
                    tracing::warn!(repo, error = %e, "Failed to star repository");
                }
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} repositories could not be starred", targets.len()).into());
    }
    Ok(())
}

/// Pick the unstarred entries to star.
fn select_targets<'a>(
    reconciled: &'a [ReconciledRepo],
    requested: &[String],
) -> Result<Vec<&'a ReconciledRepo>, String> {
    if requested.is_empty() {
        return Ok(reconciled.iter().filter(|r| !r.is_starred).collect());
    }

    let mut targets = Vec::new();
    for repo in requested {
        let entry = reconciled
            .iter()
            .find(|r| r.candidate.repo() == repo)
            .ok_or_else(|| format!("'{repo}' is not the repository of an installed plugin or theme"))?;
        if entry.is_starred {
            tracing::debug!(repo = %repo, "Already starred");
        } else {
            targets.push(entry);
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use thanks::stars::{
        KnownIdentifiers, RawPluginEntry, StarredMap, StarredRepo, reconcile, select_candidates,
    };

    use super::*;

    fn reconciled() -> Vec<ReconciledRepo> {
        let plugins = ["o/one", "o/two", "o/three"]
            .iter()
            .map(|repo| RawPluginEntry {
                id: repo.to_string(),
                name: repo.to_string(),
                author: String::new(),
                description: String::new(),
                repo: repo.to_string(),
            })
            .collect();
        let known = KnownIdentifiers::new(["o/one", "o/two", "o/three"], Vec::<String>::new());
        let candidates = select_candidates(plugins, Vec::new(), &known);

        let mut starred = StarredMap::new();
        starred.insert(
            "o/two".to_string(),
            StarredRepo {
                repo: "o/two".to_string(),
                star_count: 3,
            },
        );
        reconcile(&candidates, &starred)
    }

    fn repos(targets: &[&ReconciledRepo]) -> Vec<String> {
        targets
            .iter()
            .map(|r| r.candidate.repo().to_string())
            .collect()
    }

    #[test]
    fn no_request_targets_every_unstarred_entry() {
        let reconciled = reconciled();
        let targets = select_targets(&reconciled, &[]).unwrap();
        assert_eq!(repos(&targets), vec!["o/one", "o/three"]);
    }

    #[test]
    fn requested_repos_skip_already_starred() {
        let reconciled = reconciled();
        let requested = vec!["o/three".to_string(), "o/two".to_string()];
        let targets = select_targets(&reconciled, &requested).unwrap();
        assert_eq!(repos(&targets), vec!["o/three"]);
    }

    #[test]
    fn unknown_repo_is_rejected() {
        let reconciled = reconciled();
        let err = select_targets(&reconciled, &["x/unknown".to_string()]).unwrap_err();
        assert!(err.contains("x/unknown"));
    }
}
