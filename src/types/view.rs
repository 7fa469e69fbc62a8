//! Listing views and their response documents

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{AggregatedLanguages, RepositorySummary, Username};

/// The three derived views over a user's repositories
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum View {
    Repositories,
    Languages,
    Stars,
}

/// View-specific part of a listing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewPayload {
    #[serde(rename = "user_repositories")]
    Repositories(Vec<RepositorySummary>),
    #[serde(rename = "languages_used")]
    Languages(AggregatedLanguages),
    #[serde(rename = "repositories_all_stars")]
    Stars(u64),
}

/// `{"username": ..., <view key>: <result>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResponse {
    pub username: Username,
    #[serde(flatten)]
    pub payload: ViewPayload,
}

impl ListingResponse {
    pub fn new(username: Username, payload: ViewPayload) -> Self {
        Self { username, payload }
    }
}
