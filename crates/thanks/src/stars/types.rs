//! Catalog, starred-repository, and reconciliation data types.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

/// Plugin entry as published in the community plugin catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPluginEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// `owner/name` on GitHub.
    pub repo: String,
}

/// Theme entry as published in the community theme catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawThemeEntry {
    pub name: String,
    #[serde(default)]
    pub author: String,
    /// `owner/name` on GitHub.
    pub repo: String,
    #[serde(default)]
    pub screenshot: String,
    #[serde(default)]
    pub modes: Vec<String>,
}

/// The parts of a catalog entry we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Plugin { name: String, id: String, repo: String },
    Theme { name: String, repo: String },
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Plugin { name, .. } | Self::Theme { name, .. } => name,
        }
    }

    pub fn repo(&self) -> &str {
        match self {
            Self::Plugin { repo, .. } | Self::Theme { repo, .. } => repo,
        }
    }

    /// The identifier matched against locally known items: plugin ID or theme name.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Plugin { id, .. } => id,
            Self::Theme { name, .. } => name,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Plugin { .. } => EntryKind::Plugin,
            Self::Theme { .. } => EntryKind::Theme,
        }
    }
}

impl From<RawPluginEntry> for CatalogEntry {
    fn from(raw: RawPluginEntry) -> Self {
        Self::Plugin {
            name: raw.name,
            id: raw.id,
            repo: raw.repo,
        }
    }
}

impl From<RawThemeEntry> for CatalogEntry {
    fn from(raw: RawThemeEntry) -> Self {
        Self::Theme {
            name: raw.name,
            repo: raw.repo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Plugin,
    Theme,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plugin => f.write_str("plugin"),
            Self::Theme => f.write_str("theme"),
        }
    }
}

/// A catalog entry whose identifier is installed locally.
///
/// Only [`crate::stars::select_candidates`] creates these, so anything
/// reconciled has passed the known-identifier filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate(CatalogEntry);

impl Candidate {
    pub(super) fn new(entry: CatalogEntry) -> Self {
        Self(entry)
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn repo(&self) -> &str {
        self.0.repo()
    }

    pub fn kind(&self) -> EntryKind {
        self.0.kind()
    }
}

/// Installed plugin IDs and theme names supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIdentifiers {
    plugin_ids: HashSet<String>,
    theme_names: HashSet<String>,
}

impl KnownIdentifiers {
    pub fn new<P, T>(plugin_ids: P, theme_names: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            plugin_ids: plugin_ids.into_iter().map(Into::into).collect(),
            theme_names: theme_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, entry: &CatalogEntry) -> bool {
        match entry {
            CatalogEntry::Plugin { id, .. } => self.plugin_ids.contains(id),
            CatalogEntry::Theme { name, .. } => self.theme_names.contains(name),
        }
    }

    pub fn plugin_count(&self) -> usize {
        self.plugin_ids.len()
    }

    pub fn theme_count(&self) -> usize {
        self.theme_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugin_ids.is_empty() && self.theme_names.is_empty()
    }
}

/// One repository the authenticated user has starred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredRepo {
    /// `owner/name`, exactly as the API reports it.
    pub repo: String,
    pub star_count: u64,
}

/// Starred repositories keyed by `owner/name` (case-sensitive).
pub type StarredMap = HashMap<String, StarredRepo>;

/// Star count of a repository, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StarCount {
    Known(u64),
    #[default]
    Unknown,
}

impl StarCount {
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for StarCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("?"),
        }
    }
}

/// A candidate joined with the user's starred state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledRepo {
    pub candidate: Candidate,
    pub is_starred: bool,
    pub star_count: StarCount,
}
