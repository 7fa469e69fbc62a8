use serde::{Deserialize, Serialize};

/// The caller's core rate-limit window as reported by GitHub.
///
/// Fields GitHub adds beyond the four documented ones (e.g. `resource`) are
/// carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    /// Unix epoch seconds at which the window resets
    pub reset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
