//! Community catalogs and candidate selection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{HttpRequest, HttpTransport};

use super::error::StarsError;
use super::types::{Candidate, CatalogEntry, KnownIdentifiers, RawPluginEntry, RawThemeEntry};

/// Keep the catalog entries whose identifier is known locally.
///
/// Output is plugins first, then themes, each in catalog order.
pub fn select_candidates(
    plugins: Vec<RawPluginEntry>,
    themes: Vec<RawThemeEntry>,
    known: &KnownIdentifiers,
) -> Vec<Candidate> {
    plugins
        .into_iter()
        .map(CatalogEntry::from)
        .chain(themes.into_iter().map(CatalogEntry::from))
        .filter(|entry| known.contains(entry))
        .map(Candidate::new)
        .collect()
}

/// Fetches the plugin and theme catalogs.
pub struct CatalogClient<T> {
    transport: Arc<T>,
    user_agent: String,
}

impl<T: HttpTransport> CatalogClient<T> {
    pub fn new(transport: Arc<T>, user_agent: impl Into<String>) -> Self {
        Self {
            transport,
            user_agent: user_agent.into(),
        }
    }

    pub async fn fetch_plugin_catalog(&self, url: &str) -> Result<Vec<RawPluginEntry>, StarsError> {
        self.fetch_json(url).await
    }

    pub async fn fetch_theme_catalog(&self, url: &str) -> Result<Vec<RawThemeEntry>, StarsError> {
        self.fetch_json(url).await
    }

    /// Fetch both catalogs concurrently and select the candidates.
    pub async fn fetch_candidates(
        &self,
        plugin_catalog_url: &str,
        theme_catalog_url: &str,
        known: &KnownIdentifiers,
    ) -> Result<Vec<Candidate>, StarsError> {
        let (plugins, themes) = tokio::try_join!(
            self.fetch_plugin_catalog(plugin_catalog_url),
            self.fetch_theme_catalog(theme_catalog_url),
        )?;

        let total = plugins.len() + themes.len();
        let candidates = select_candidates(plugins, themes, known);
        debug!(
            total,
            candidates = candidates.len(),
            "Selected installed catalog entries"
        );
        Ok(candidates)
    }

    async fn fetch_json<D: DeserializeOwned>(&self, url: &str) -> Result<D, StarsError> {
        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str());

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(StarsError::api(response.status, response.body_snippet()));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| StarsError::MalformedResponse(format!("{url}: {e}")))
    }
}
