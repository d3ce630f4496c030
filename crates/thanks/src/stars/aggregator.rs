//! Starred-repository aggregation over the paginated GitHub REST API.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::oauth::AccessToken;
use crate::settings::{
    DEFAULT_API_BASE_URL, DEFAULT_PAGE_CONCURRENCY, DEFAULT_PER_PAGE, DEFAULT_USER_AGENT,
};

use super::error::StarsError;
use super::pagination::{LinkPagination, parse_link_header};
use super::types::{ReconciledRepo, StarCount, StarredMap, StarredRepo};

/// REST API version pinned on every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Upper bound on the page count a `Link` header may announce.
pub const MAX_STARRED_PAGES: u32 = 1_000;

/// Endpoint and fan-out settings for [`StarredSetAggregator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// API root without a trailing slash.
    pub api_base_url: String,
    pub per_page: u32,
    /// Maximum page requests in flight at once.
    pub page_concurrency: usize,
    pub user_agent: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// The fields we read from a repository object.
#[derive(Debug, Deserialize)]
struct RepoPayload {
    full_name: String,
    #[serde(default)]
    stargazers_count: u64,
}

impl From<RepoPayload> for StarredRepo {
    fn from(payload: RepoPayload) -> Self {
        Self {
            repo: payload.full_name,
            star_count: payload.stargazers_count,
        }
    }
}

/// One decoded page of `/user/starred`.
#[derive(Debug)]
struct StarredPage {
    repos: Vec<StarredRepo>,
    pagination: LinkPagination,
}

/// Fetches the complete set of repositories the user has starred.
pub struct StarredSetAggregator<T> {
    transport: Arc<T>,
    config: AggregatorConfig,
}

impl<T: HttpTransport + 'static> StarredSetAggregator<T> {
    pub fn new(transport: Arc<T>, config: AggregatorConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetch every page of `/user/starred` and merge them into one map.
    ///
    /// Page 1 is fetched first; its `Link` header decides how many more
    /// pages exist. Those are fetched concurrently, bounded by
    /// `page_concurrency`, and merged in ascending page order once all of
    /// them succeeded. A repository listed on two pages keeps the entry from
    /// the higher page.
    pub async fn fetch_all_starred(
        &self,
        token: Option<&AccessToken>,
    ) -> Result<StarredMap, StarsError> {
        let token = token.ok_or(StarsError::Unauthenticated)?;
        let authorization = token.authorization();

        let first = fetch_page(
            self.transport.as_ref(),
            self.starred_request(1, &authorization),
        )
        .await?;
        let total_pages = first.pagination.total_pages();
        debug!(
            page = 1,
            count = first.repos.len(),
            total_pages,
            "Fetched starred page"
        );
        if total_pages > MAX_STARRED_PAGES {
            return Err(StarsError::MalformedResponse(format!(
                "link header announces {total_pages} starred pages, limit is {MAX_STARRED_PAGES}"
            )));
        }

        let mut pages = vec![(1, first.repos)];
        if total_pages > 1 {
            pages.extend(self.fetch_remaining_pages(total_pages, &authorization).await?);
        }

        let starred = merge_pages(pages);
        info!(
            pages = total_pages,
            repos = starred.len(),
            "Fetched starred repositories"
        );
        Ok(starred)
    }

    /// Fan out pages `2..=last`. Results are taken as they complete; the
    /// first failure aborts every task that is still running and discards
    /// whatever was already fetched. Dropping the future aborts them too.
    async fn fetch_remaining_pages(
        &self,
        last_page: u32,
        authorization: &str,
    ) -> Result<Vec<(u32, Vec<StarredRepo>)>, StarsError> {
        let semaphore = Arc::new(Semaphore::new(self.config.page_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut task_pages = HashMap::new();

        for page in 2..=last_page {
            let task_semaphore = Arc::clone(&semaphore);
            let task_transport = Arc::clone(&self.transport);
            let request = self.starred_request(page, authorization);

            let handle = tasks.spawn(async move {
                let result = match task_semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_page(task_transport.as_ref(), request).await,
                    Err(e) => Err(StarsError::PaginationFetchFailed {
                        page,
                        reason: e.to_string(),
                    }),
                };
                (page, result)
            });
            task_pages.insert(handle.id(), page);
        }

        let mut pages = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (page, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    let page = task_pages.get(&e.id()).copied().unwrap_or_default();
                    let reason = e.to_string();
                    (page, Err(StarsError::PaginationFetchFailed { page, reason }))
                }
            };

            match result {
                Ok(fetched) => {
                    debug!(page, count = fetched.repos.len(), "Fetched starred page");
                    pages.push((page, fetched.repos));
                }
                Err(err) => {
                    tasks.abort_all();
                    warn!(page, error = %err, "Starred page failed, discarding partial results");
                    return Err(page_failure(page, err));
                }
            }
        }

        Ok(pages)
    }

    /// Star `owner/name` for the authenticated user.
    pub async fn star_repo(
        &self,
        token: Option<&AccessToken>,
        repo: &str,
    ) -> Result<(), StarsError> {
        let token = token.ok_or(StarsError::Unauthenticated)?;
        let (owner, name) = split_repo(repo)?;

        let url = format!("{}/user/starred/{owner}/{name}", self.base_url());
        let request = self
            .api_request(HttpRequest::put(url))
            .header("Authorization", token.authorization())
            .header("Content-Length", "0");

        let response = self.transport.send(request).await?;
        match response.status {
            401 => Err(StarsError::Unauthenticated),
            _ if response.is_success() => {
                info!(repo, "Starred repository");
                Ok(())
            }
            status => Err(StarsError::api(status, response.body_snippet())),
        }
    }

    /// Current stargazer count of `owner/name`. The token is optional; the
    /// endpoint is public but unauthenticated calls are rate limited harder.
    pub async fn repo_star_count(
        &self,
        token: Option<&AccessToken>,
        repo: &str,
    ) -> Result<u64, StarsError> {
        let (owner, name) = split_repo(repo)?;

        let url = format!("{}/repos/{owner}/{name}", self.base_url());
        let mut request = self.api_request(HttpRequest::get(url));
        if let Some(token) = token {
            request = request.header("Authorization", token.authorization());
        }

        let response = self.transport.send(request).await?;
        if response.status == 401 {
            return Err(StarsError::Unauthenticated);
        }
        if !response.is_success() {
            return Err(StarsError::api(response.status, response.body_snippet()));
        }

        let payload: RepoPayload = serde_json::from_slice(&response.body)
            .map_err(|e| StarsError::MalformedResponse(format!("{repo}: {e}")))?;
        Ok(payload.stargazers_count)
    }

    /// Fill in [`StarCount::Unknown`] entries by looking each repository up.
    ///
    /// Best effort: a failed lookup is logged and leaves the entry
    /// `Unknown`. Returns how many entries were resolved.
    pub async fn resolve_star_counts(
        &self,
        token: Option<&AccessToken>,
        repos: &mut [ReconciledRepo],
    ) -> usize {
        let mut resolved = 0;
        for entry in repos.iter_mut() {
            if entry.star_count != StarCount::Unknown {
                continue;
            }
            match self.repo_star_count(token, entry.candidate.repo()).await {
                Ok(count) => {
                    entry.star_count = StarCount::Known(count);
                    resolved += 1;
                }
                Err(e) => {
                    warn!(repo = entry.candidate.repo(), error = %e, "Star count lookup failed");
                }
            }
        }
        resolved
    }

    fn base_url(&self) -> &str {
        self.config.api_base_url.trim_end_matches('/')
    }

    fn api_request(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", self.config.user_agent.as_str())
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    fn starred_request(&self, page: u32, authorization: &str) -> HttpRequest {
        let url = format!(
            "{}/user/starred?per_page={}&page={page}",
            self.base_url(),
            self.config.per_page.max(1)
        );
        self.api_request(HttpRequest::get(url))
            .header("Authorization", authorization)
    }
}

async fn fetch_page<T: HttpTransport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<StarredPage, StarsError> {
    let response = transport.send(request).await?;
    decode_page(response)
}

fn decode_page(response: HttpResponse) -> Result<StarredPage, StarsError> {
    if response.status == 401 {
        return Err(StarsError::Unauthenticated);
    }
    if !response.is_success() {
        return Err(StarsError::api(response.status, response.body_snippet()));
    }

    let pagination = response
        .header("link")
        .map(parse_link_header)
        .unwrap_or_default();
    let payload: Vec<RepoPayload> = serde_json::from_slice(&response.body)
        .map_err(|e| StarsError::MalformedResponse(e.to_string()))?;

    Ok(StarredPage {
        repos: payload.into_iter().map(StarredRepo::from).collect(),
        pagination,
    })
}

/// Errors on fan-out pages are reported against the page, except a
/// rejected token which stays `Unauthenticated`.
fn page_failure(page: u32, err: StarsError) -> StarsError {
    match err {
        StarsError::Unauthenticated | StarsError::PaginationFetchFailed { .. } => err,
        other => StarsError::PaginationFetchFailed {
            page,
            reason: other.to_string(),
        },
    }
}

fn merge_pages(mut pages: Vec<(u32, Vec<StarredRepo>)>) -> StarredMap {
    pages.sort_by_key(|(page, _)| *page);

    let mut starred = StarredMap::new();
    for (_, repos) in pages {
        for repo in repos {
            starred.insert(repo.repo.clone(), repo);
        }
    }
    starred
}

/// Split `owner/name`, rejecting anything else.
fn split_repo(repo: &str) -> Result<(&str, &str), StarsError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(StarsError::InvalidRepo(repo.to_string())),
    }
}
