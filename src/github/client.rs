use crate::github::error::{ApiError, FetchOutcome};
use crate::github::rest_types::{LanguagesResponse, RateLimitResponse, RepositoryNode, UserNode};
use crate::types::{LanguageBreakdown, PageRequest, RateLimitStatus, RepositorySummary, Username};

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Public GitHub REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Media type pinning the v3 REST format
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CLIENT_USER_AGENT: &str = concat!("github-listing-api/", env!("CARGO_PKG_VERSION"));

/// Thin client over the GitHub REST v3 API.
///
/// Cloning is cheap: the underlying connection pool is shared. A client is
/// bound to at most one token; use [`GitHubClient::with_token`] to derive a
/// client for a single inbound request.
#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_base_url: String,
    authorization: Option<HeaderValue>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base_url", &self.api_base_url)
            .field("authenticated", &self.authorization.is_some())
            .finish()
    }
}

/// Builds the `Authorization` value for a token; empty tokens mean none.
///
/// Fails when the token cannot travel as a header value (control characters).
fn authorization_header(token: Option<String>) -> FetchOutcome<Option<HeaderValue>> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let mut value = HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
        warn!("GitHub token is not a valid header value, rejecting request");
        ApiError::Unauthorized
    })?;
    value.set_sensitive(true);
    Ok(Some(value))
}

impl GitHubClient {
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        Self::with_base_url(token, timeout, DEFAULT_API_BASE_URL)
    }

    /// Creates a client against an arbitrary REST base URL (GitHub Enterprise, test stubs)
    pub fn with_base_url(
        token: Option<String>,
        timeout: Option<Duration>,
        api_base_url: &str,
    ) -> Result<Self> {
        let parsed = Url::parse(api_base_url)
            .with_context(|| format!("Invalid GitHub API base URL: {}", api_base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "GitHub API base URL must be http or https, got {}",
                parsed.scheme()
            );
        }

        let timeout_duration = timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let connection_timeout = if timeout_duration < Duration::from_secs(10) {
            std::cmp::max(timeout_duration, Duration::from_secs(1))
        } else {
            Duration::from_secs(30)
        };
        let request_timeout = std::cmp::max(timeout_duration, Duration::from_secs(1));

        let authorization = authorization_header(token)
            .map_err(|_| anyhow::anyhow!("GitHub token is not a valid header value"))?;

        let client = reqwest::Client::builder()
            .connect_timeout(connection_timeout)
            .timeout(request_timeout)
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    /// Same connection pool and base URL, different credentials.
    ///
    /// A token that cannot be sent is rejected as [`ApiError::Unauthorized`]
    /// rather than silently dropped.
    pub fn with_token(&self, token: Option<String>) -> FetchOutcome<Self> {
        Ok(Self {
            client: self.client.clone(),
            api_base_url: self.api_base_url.clone(),
            authorization: authorization_header(token)?,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authorization.is_some()
    }

    /// Headers sent with every upstream request.
    ///
    /// `Authorization` is only present when the client carries a token.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }
        headers
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Issues one GET and decodes a 2xx JSON body.
    ///
    /// No retries: a non-success status is classified and returned at once.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> FetchOutcome<T> {
        let start_time = std::time::Instant::now();
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(url).headers(self.request_headers());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                warn!("GitHub request to {} failed: {}", url, e);
                ApiError::from_reqwest_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "GitHub request to {} returned {} after {:?}",
                url,
                status,
                start_time.elapsed()
            );
            return Err(ApiError::from_status(status));
        }

        let body = response.json::<T>().await.map_err(|e| {
            warn!("Failed to read GitHub response from {}: {}", url, e);
            ApiError::from_reqwest_error(e)
        })?;

        debug!("GET {} completed in {:?}", url, start_time.elapsed());
        Ok(body)
    }

    /// Reads `public_repos` from the user's profile
    pub async fn fetch_user_repository_count(&self, username: &Username) -> FetchOutcome<u64> {
        let url = self.endpoint(&format!(
            "/users/{}",
            urlencoding::encode(username.as_str())
        ));
        let user: UserNode = self.get_json(&url, &[]).await?;
        debug!(
            "User {} has {} public repositories",
            user.login.as_deref().unwrap_or(username.as_str()),
            user.public_repos
        );
        Ok(user.public_repos)
    }

    /// Fetches one page of the user's repository listing.
    ///
    /// A page past the end yields an empty list, not an error.
    pub async fn fetch_repository_page(
        &self,
        page: &PageRequest,
    ) -> FetchOutcome<Vec<RepositorySummary>> {
        let url = self.endpoint(&format!(
            "/users/{}/repos",
            urlencoding::encode(page.username.as_str())
        ));
        let query = [
            ("page", page.page_index.to_string()),
            ("per_page", page.page_size.to_string()),
        ];
        let nodes: Vec<RepositoryNode> = self.get_json(&url, &query).await?;
        Ok(nodes.into_iter().map(RepositorySummary::from).collect())
    }

    /// Fetches the bytes-per-language breakdown of one repository
    pub async fn fetch_repository_languages(
        &self,
        owner: &Username,
        repository_name: &str,
    ) -> FetchOutcome<LanguageBreakdown> {
        let url = self.endpoint(&format!(
            "/repos/{}/{}/languages",
            urlencoding::encode(owner.as_str()),
            urlencoding::encode(repository_name)
        ));
        let languages: LanguagesResponse = self.get_json(&url, &[]).await?;
        Ok(LanguageBreakdown::new(languages))
    }

    /// Fetches the caller's core rate-limit window
    pub async fn fetch_rate_limit(&self) -> FetchOutcome<RateLimitStatus> {
        let url = self.endpoint("/rate_limit");
        let response: RateLimitResponse = self.get_json(&url, &[]).await?;
        Ok(response.rate)
    }
}
