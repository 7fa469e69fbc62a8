use futures::FutureExt;

use crate::github::{ApiError, FetchOutcome, GitHubClient};
use crate::services::aggregate;
use crate::services::fan_out::FanOutDispatcher;
use crate::types::{
    LanguageBreakdown, ListingResponse, MAX_PAGE_COUNT, PageRequest, RateLimitStatus,
    RepositorySummary, Username, View, ViewPayload, page_count,
};

/// Repositories requested per upstream page
pub const DEFAULT_PAGE_SIZE: u32 = 16;

/// Largest page GitHub serves for repository listings
pub const MAX_PAGE_SIZE: u32 = 100;

/// Turns one inbound listing request into upstream fan-out and a single response
#[derive(Debug, Clone)]
pub struct ListingService {
    github_client: GitHubClient,
    dispatcher: FanOutDispatcher,
    page_size: u32,
}

impl ListingService {
    /// Creates a new ListingService
    ///
    /// # Arguments
    ///
    /// * `github_client` - Client used when a request carries no token of its own
    /// * `dispatcher` - Fan-out bound shared by the page and language phases
    /// * `page_size` - Clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(github_client: GitHubClient, dispatcher: FanOutDispatcher, page_size: u32) -> Self {
        Self {
            github_client,
            dispatcher,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn dispatcher(&self) -> &FanOutDispatcher {
        &self.dispatcher
    }

    /// Per-request client; an absent or empty token falls back to the configured one
    fn client_for(&self, token: Option<String>) -> FetchOutcome<GitHubClient> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.github_client.with_token(Some(token)),
            None => Ok(self.github_client.clone()),
        }
    }

    /// Builds the requested view of `username`'s repositories.
    ///
    /// Any upstream failure, in any phase, fails the whole request.
    pub async fn handle(
        &self,
        username: &Username,
        token: Option<String>,
        view: View,
    ) -> FetchOutcome<ListingResponse> {
        let client = self.client_for(token)?;
        let start_time = std::time::Instant::now();
        tracing::info!(
            "Listing {} for {} (authenticated: {})",
            view,
            username,
            client.is_authenticated()
        );

        let total_repositories = client.fetch_user_repository_count(username).await?;
        let pages = self
            .fetch_all_pages(&client, username, total_repositories)
            .await?;

        let payload = match view {
            View::Repositories => ViewPayload::Repositories(aggregate::repositories_view(pages)),
            View::Languages => {
                let breakdowns = self.fetch_all_languages(&client, username, &pages).await?;
                ViewPayload::Languages(aggregate::languages_view(breakdowns))
            }
            View::Stars => ViewPayload::Stars(aggregate::stars_view(&pages)),
        };

        tracing::info!(
            "Listed {} for {} in {:?}",
            view,
            username,
            start_time.elapsed()
        );
        Ok(ListingResponse::new(username.clone(), payload))
    }

    /// Fetches every page needed to cover `total_repositories`, in page order
    async fn fetch_all_pages(
        &self,
        client: &GitHubClient,
        username: &Username,
        total_repositories: u64,
    ) -> FetchOutcome<Vec<Vec<RepositorySummary>>> {
        let pages = page_count(total_repositories, self.page_size);
        if pages > MAX_PAGE_COUNT {
            tracing::warn!(
                "{} reports {} repositories, more than {} pages of {}",
                username,
                total_repositories,
                MAX_PAGE_COUNT,
                self.page_size
            );
            return Err(ApiError::Decode(format!(
                "implausible public_repos count {} for {}",
                total_repositories, username
            )));
        }
        tracing::debug!(
            "{} has {} repositories across {} pages",
            username,
            total_repositories,
            pages
        );

        self.dispatcher
            .dispatch(
                "repository pages",
                PageRequest::covering(username, total_repositories, self.page_size)
                    .map(move |page| async move { client.fetch_repository_page(&page).await }),
            )
            .boxed()
            .await
    }

    /// One languages lookup per repository, after all pages have joined
    async fn fetch_all_languages(
        &self,
        client: &GitHubClient,
        username: &Username,
        pages: &[Vec<RepositorySummary>],
    ) -> FetchOutcome<Vec<LanguageBreakdown>> {
        let repository_names = aggregate::repository_names(pages);
        self.dispatcher
            .dispatch(
                "repository languages",
                repository_names
                    .iter()
                    .map(|name| client.fetch_repository_languages(username, name)),
            )
            .boxed()
            .await
    }

    /// Passes through the caller's current rate-limit window
    pub async fn current_limits(&self, token: Option<String>) -> FetchOutcome<RateLimitStatus> {
        let client = self.client_for(token)?;
        client.fetch_rate_limit().await
    }
}
