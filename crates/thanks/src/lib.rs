//! Thanks - star the GitHub repositories behind your installed plugins and themes.
//!
//! The library has two halves:
//!
//! - [`oauth`] obtains a GitHub access token through the OAuth device flow.
//! - [`stars`] downloads the community catalogs, fetches every repository the
//!   user has starred, and reconciles the two.
//!
//! All network I/O goes through the [`http::HttpTransport`] trait. The
//! `reqwest` feature (on by default) provides a production transport.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use thanks::http::reqwest_transport::ReqwestTransport;
//! use thanks::stars::{CatalogClient, KnownIdentifiers, StarredSetAggregator, reconcile};
//! use thanks::{DeviceAuthenticator, Settings};
//!
//! let settings = Settings::default();
//! let transport = Arc::new(ReqwestTransport::new(reqwest::Client::new()));
//!
//! let auth = DeviceAuthenticator::new(Arc::clone(&transport), settings.device_flow());
//! let grant = auth.begin(&settings.scope).await?;
//! let token = auth.poll(grant).run(None).await?;
//!
//! let known = KnownIdentifiers::new(["dataview"], ["Minimal"]);
//! let candidates = CatalogClient::new(Arc::clone(&transport), &settings.user_agent)
//!     .fetch_candidates(&settings.plugin_catalog_url, &settings.theme_catalog_url, &known)
//!     .await?;
//!
//! let aggregator = StarredSetAggregator::new(transport, settings.aggregator());
//! let starred = aggregator.fetch_all_starred(Some(&token)).await?;
//! for entry in reconcile(&candidates, &starred) {
//!     println!("{} starred={} stars={}", entry.candidate.repo(), entry.is_starred, entry.star_count);
//! }
//! ```

pub mod http;
pub mod oauth;
pub mod settings;
pub mod stars;

pub use http::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use oauth::{AccessToken, DeviceAuthenticator, DeviceGrant, OAuthError, PollEvent, StopHandle};
pub use settings::{Settings, SettingsStore};
pub use stars::{ReconciledRepo, StarCount, StarredSetAggregator, StarsError};
