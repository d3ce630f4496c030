//! Starred-set aggregation and reconciliation.
//!
//! The flow is:
//!
//! 1. [`CatalogClient::fetch_candidates`] downloads the community plugin and
//!    theme catalogs and keeps the entries installed locally
//!    ([`select_candidates`]).
//! 2. [`StarredSetAggregator::fetch_all_starred`] walks every page of the
//!    user's starred repositories.
//! 3. [`reconcile`] joins the two, preserving catalog order.
//!
//! [`StarredSetAggregator::star_repo`] stars a single repository afterwards.

mod aggregator;
mod catalog;
mod error;
mod pagination;
mod reconcile;
mod types;

pub use aggregator::{
    AggregatorConfig, GITHUB_API_VERSION, MAX_STARRED_PAGES, StarredSetAggregator,
};
pub use catalog::{CatalogClient, select_candidates};
pub use error::StarsError;
pub use pagination::{LinkPagination, parse_link_header};
pub use reconcile::reconcile;
pub use types::{
    Candidate, CatalogEntry, EntryKind, KnownIdentifiers, RawPluginEntry, RawThemeEntry,
    ReconciledRepo, StarCount, StarredMap, StarredRepo,
};
