//! Failure taxonomy for upstream GitHub REST calls
//!
//! Every non-success response is classified exactly once, at the point the
//! status line is read. Callers never see a partially-read success.

use reqwest::StatusCode;

/// Result of a single upstream fetch
pub type FetchOutcome<T> = std::result::Result<T, ApiError>;

/// Classification of upstream API failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 from upstream (bad or missing token)
    Unauthorized,
    /// 500 from upstream, usually quota exhaustion or overload
    RateLimitOrServerError,
    /// Any other non-2xx status, including 404 for unknown users
    Generic(u16),
    /// The request never produced a status line (connect error, timeout)
    Transport(String),
    /// A 2xx response whose body did not match the expected shape
    Decode(String),
}

impl ApiError {
    /// Classify a non-success upstream status code
    pub fn from_status(status: StatusCode) -> Self {
        let code = status.as_u16();
        let result = match code {
            401 => Self::Unauthorized,
            500 => Self::RateLimitOrServerError,
            _ => Self::Generic(code),
        };

        match &result {
            Self::Unauthorized => {
                tracing::warn!("GitHub API rejected credentials (401)");
            }
            Self::RateLimitOrServerError => {
                tracing::warn!("GitHub API server error (500) - check remaining api limits");
            }
            _ => {
                tracing::warn!("GitHub API returned non-success status {}", code);
            }
        }
        result
    }

    pub fn from_reqwest_error(error: reqwest::Error) -> Self {
        tracing::debug!("Raw reqwest error: {:?}", error);

        if let Some(status) = error.status() {
            return Self::from_status(status);
        }
        if error.is_decode() {
            return Self::Decode(format!("Failed to decode GitHub API response: {}", error));
        }
        if error.is_timeout() {
            return Self::Transport(format!("GitHub API request timed out: {}", error));
        }
        Self::Transport(format!("GitHub API request failed: {}", error))
    }

    /// Upstream status code this failure relays, if it came from a status line
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimitOrServerError => Some(500),
            Self::Generic(code) => Some(*code),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Unauthorized- make sure to provide valid token."),
            Self::RateLimitOrServerError => {
                write!(f, "Internal Server Error - check remaining api limits.")
            }
            Self::Generic(code) => write!(f, "GitHub API returned status {}", code),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
