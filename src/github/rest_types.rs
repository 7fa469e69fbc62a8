//! Response payloads of the GitHub REST v3 endpoints this crate reads
//!
//! Only the fields the listing views need are declared; everything else in
//! the upstream documents is ignored on deserialization.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{RateLimitStatus, RepositorySummary};

/// `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserNode {
    pub login: Option<String>,
    pub public_repos: u64,
}

/// One element of `GET /users/{username}/repos`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryNode {
    pub name: String,
    pub stargazers_count: u64,
}

impl From<RepositoryNode> for RepositorySummary {
    fn from(node: RepositoryNode) -> Self {
        RepositorySummary::new(node.name, node.stargazers_count)
    }
}

/// `GET /repos/{owner}/{repo}/languages`
///
/// GitHub returns a JSON object keyed by language name. Key order is kept
/// because it feeds the tie-break order of the aggregated ranking.
pub type LanguagesResponse = IndexMap<String, u64>;

/// `GET /rate_limit`
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResponse {
    pub rate: RateLimitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_node_ignores_unknown_fields() {
        let json = r#"[
            {"id": 1, "name": "a", "full_name": "u/a", "stargazers_count": 3, "fork": false},
            {"id": 2, "name": "b", "stargazers_count": 0, "language": null}
        ]"#;
        let nodes: Vec<RepositoryNode> = serde_json::from_str(json).unwrap();
        let summaries: Vec<RepositorySummary> = nodes.into_iter().map(Into::into).collect();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "a");
        assert_eq!(summaries[0].stargazers_count, 3);
        assert_eq!(summaries[1].name, "b");
    }

    #[test]
    fn test_languages_response_keeps_key_order() {
        let json = r#"{"Shell": 10, "Rust": 500, "C": 10}"#;
        let languages: LanguagesResponse = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = languages.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Shell", "Rust", "C"]);
    }
}
