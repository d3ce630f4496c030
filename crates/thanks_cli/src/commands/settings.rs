use std::path::PathBuf;

use console::style;
use thanks::settings::{Settings, SettingsStore};

use crate::config::{Config, TomlSettingsStore};

/// Print the effective settings as TOML.
pub(crate) fn handle_show(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", toml::to_string_pretty(&config.settings)?);
    Ok(())
}

/// Write the default settings to the config file.
pub(crate) fn handle_init(
    path: Option<PathBuf>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = path
        .or_else(Config::default_config_path)
        .ok_or("Could not determine config directory")?;

    let store = TomlSettingsStore::new(path);
    init_store(&store, force)?;
    println!(
        "{} Wrote default settings to {}",
        style("✓").green().bold(),
        store.path().display()
    );
    Ok(())
}

fn init_store(store: &TomlSettingsStore, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if store.path().exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )
        .into());
    }
    // Keep values from an existing file when overwriting.
    let settings = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Existing settings unreadable, starting from defaults");
        Settings::default()
    });
    store.save(&settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_defaults_and_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("config.toml"));

        init_store(&store, false).unwrap();
        assert_eq!(store.load().unwrap(), Settings::default());

        assert!(init_store(&store, false).is_err());
    }

    #[test]
    fn forced_init_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_concurrency = 7\n").unwrap();
        let store = TomlSettingsStore::new(&path);

        init_store(&store, true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("page_concurrency = 7"));
        assert!(content.contains("client_id"));
    }
}
