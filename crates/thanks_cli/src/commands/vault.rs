//! Discovery of installed plugins and themes in a vault.
//!
//! Plugins live in `<vault>/.obsidian/plugins/<dir>/manifest.json`; the
//! manifest `id` is what the community catalog lists. Themes live in
//! `<vault>/.obsidian/themes/<name>/`, where the directory name is the
//! catalog theme name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thanks::stars::KnownIdentifiers;

const CONFIG_DIR: &str = ".obsidian";

#[derive(Debug, Deserialize)]
struct PluginManifest {
    id: String,
}

/// Read the installed plugin IDs and theme names of `vault`.
pub(crate) fn discover_known_identifiers(vault: &Path) -> io::Result<KnownIdentifiers> {
    let config_dir = vault.join(CONFIG_DIR);
    if !config_dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a vault (no {CONFIG_DIR} directory)", vault.display()),
        ));
    }

    let plugin_ids = plugin_ids(&config_dir.join("plugins"))?;
    let theme_names = theme_names(&config_dir.join("themes"))?;
    tracing::debug!(
        plugins = plugin_ids.len(),
        themes = theme_names.len(),
        vault = %vault.display(),
        "Discovered installed items"
    );

    Ok(KnownIdentifiers::new(plugin_ids, theme_names))
}

fn plugin_ids(plugins_dir: &Path) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for dir in subdirectories(plugins_dir)? {
        let manifest_path = dir.join("manifest.json");
        let content = match fs::read_to_string(&manifest_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %manifest_path.display(), error = %e, "Skipping plugin without manifest");
                continue;
            }
        };
        match serde_json::from_str::<PluginManifest>(&content) {
            Ok(manifest) => ids.push(manifest.id),
            Err(e) => {
                tracing::warn!(path = %manifest_path.display(), error = %e, "Skipping unreadable plugin manifest");
            }
        }
    }
    ids.sort();
    Ok(ids)
}

fn theme_names(themes_dir: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = subdirectories(themes_dir)?
        .iter()
        .filter_map(|dir| dir.file_name())
        .filter_map(|name| name.to_str())
        .map(str::to_string)
        .collect();
    names.sort();
    Ok(names)
}

/// Immediate subdirectories of `dir`; a missing directory has none.
fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}
