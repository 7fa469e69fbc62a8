//! Repository listing domain types

use serde::{Deserialize, Serialize};

/// GitHub login name wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn new<T: Into<String>>(username: T) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name and star count of one repository, as listed on a repositories page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    #[serde(rename = "repository_name")]
    pub name: String,
    pub stargazers_count: u64,
}

impl RepositorySummary {
    pub fn new<T: Into<String>>(name: T, stargazers_count: u64) -> Self {
        Self {
            name: name.into(),
            stargazers_count,
        }
    }
}

/// One page of a user's repository listing to request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub username: Username,
    /// 1-based
    pub page_index: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(username: Username, page_index: u32, page_size: u32) -> Self {
        Self {
            username,
            page_index,
            page_size,
        }
    }

    /// Yields one request per page needed to cover `total_repositories`, lazily.
    ///
    /// A user with no repositories still gets a single (empty) page request.
    pub fn covering(
        username: &Username,
        total_repositories: u64,
        page_size: u32,
    ) -> impl Iterator<Item = Self> + use<> {
        let username = username.clone();
        (1..=page_count(total_repositories, page_size))
            .map(move |page_index| Self::new(username.clone(), page_index, page_size))
    }
}

/// Most pages a single listing may span before the reported count is rejected
pub const MAX_PAGE_COUNT: u32 = 10_000;

/// Number of pages of `page_size` needed to list `total_repositories`, never less than one
pub fn page_count(total_repositories: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_repositories.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
