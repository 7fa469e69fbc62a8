//! Server configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! the token environment variable, then command-line overrides applied by the
//! binary. The result is validated once at startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::github::GitHubClient;
use crate::github::client::DEFAULT_API_BASE_URL;
use crate::services::fan_out::DEFAULT_MAX_CONCURRENCY;
use crate::services::listing::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::services::{FanOutDispatcher, ListingService};

/// Environment variable holding the token used when a request carries none
pub const TOKEN_ENV_VAR: &str = "GITHUB_LISTING_API_GITHUB_TOKEN";

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to
    pub address: String,
    /// GitHub REST base URL
    pub api_base_url: String,
    /// Repositories per upstream page
    pub page_size: u32,
    /// Upper bound on concurrently in-flight upstream requests per fan-out batch.
    /// Directly controls how fast a single request can drain the caller's rate limit.
    pub max_concurrency: usize,
    /// Timeout applied to each upstream request
    pub request_timeout_secs: u64,
    /// Token used for requests that do not pass `?token=`
    pub default_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    IoError(String),
    /// Config file is not valid TOML for [`ServerConfig`]
    ParseError(String),
    /// A field holds a value the server cannot run with
    InvalidValue { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "Failed to read config: {}", msg),
            Self::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid config value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Loads the config file, falling back to defaults.
    ///
    /// An explicit `path` must exist. Without one, the file at
    /// [`default_config_path`] is used only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    tracing::debug!("Loading config from {}", default_path.display());
                    Self::from_file(&default_path)?
                }
                _ => Self::default(),
            },
        };
        Ok(config)
    }

    /// Overrides `default_token` with [`TOKEN_ENV_VAR`] when it is set and non-empty
    pub fn with_env_token(mut self) -> Self {
        if let Some(token) = std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()) {
            self.default_token = Some(token);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        match url::Url::parse(&self.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "api_base_url",
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    field: "api_base_url",
                    reason: e.to_string(),
                });
            }
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "address",
                reason: e.to_string(),
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn build_listing_service(&self) -> anyhow::Result<ListingService> {
        self.validate()?;
        let github_client = GitHubClient::with_base_url(
            self.default_token.clone(),
            Some(self.request_timeout()),
            &self.api_base_url,
        )?;
        Ok(ListingService::new(
            github_client,
            FanOutDispatcher::new(self.max_concurrency),
            self.page_size,
        ))
    }
}

/// `<platform config dir>/github-listing-api/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("github-listing-api").join(CONFIG_FILE_NAME))
}
