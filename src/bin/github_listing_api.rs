use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt};

use github_listing_api::config::ServerConfig;
use github_listing_api::transport::HttpServerApp;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "GitHub Listing API - read-only aggregation of a GitHub user's repositories, languages and stars"
)]
#[command(
    long_about = "GitHub Listing API serves JSON views over a GitHub user's public repositories: the repository list with star counts, languages used ranked by size in bytes, the total star count, and the caller's current GitHub rate limits. Every view is computed from concurrent upstream requests on each call; nothing is cached."
)]
struct Cli {
    /// Path to a TOML config file (default: <config dir>/github-listing-api/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(short, long)]
    address: Option<String>,

    /// Enable debug logging for troubleshooting and development
    #[arg(short, long)]
    debug: bool,

    /// GitHub personal access token used when a request has no ?token= (overrides GITHUB_LISTING_API_GITHUB_TOKEN environment variable)
    #[arg(short = 't', long)]
    github_token: Option<String>,

    /// GitHub REST base URL, e.g. for GitHub Enterprise
    #[arg(long)]
    api_base_url: Option<String>,

    /// Repositories requested per upstream page (1-100)
    #[arg(long)]
    page_size: Option<u32>,

    /// Maximum concurrent upstream requests per fan-out batch
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Timeout in seconds for each upstream request
    #[arg(long)]
    request_timeout: Option<u64>,
}

impl Cli {
    fn apply_overrides(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(github_token) = self.github_token {
            config.default_token = Some(github_token);
        }
        if let Some(api_base_url) = self.api_base_url {
            config.api_base_url = api_base_url;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.max_concurrency = max_concurrency;
        }
        if let Some(request_timeout) = self.request_timeout {
            config.request_timeout_secs = request_timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},{}", level, env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false)) // Disable ANSI color codes
        .init();

    let config = ServerConfig::load(cli.config.as_deref())?.with_env_token();
    let config = cli.apply_overrides(config);
    config.validate()?;

    HttpServerApp::new(config).serve().await
}
