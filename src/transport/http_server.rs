use crate::config::ServerConfig;
use crate::transport::routes::router;
use anyhow::{Context, Result};
use std::future::Future;
use tokio::net::TcpListener;

pub struct HttpServerApp {
    config: ServerConfig,
}

impl HttpServerApp {
    /// Creates a new HTTP server application instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Fully merged server configuration
    ///
    /// # Returns
    ///
    /// Returns a new HttpServerApp instance.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Binds the configured address and serves until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The server fails to bind to the configured address
    /// - The server encounters an error during operation
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        self.serve_listener(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await
    }

    /// Serves on an already bound listener until `shutdown` resolves
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listing_service = self.config.build_listing_service()?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            "github-listing-api listening on http://{} (upstream {}, page size {}, max concurrency {})",
            local_addr,
            self.config.api_base_url,
            listing_service.page_size(),
            listing_service.dispatcher().max_concurrency()
        );
        if self.config.default_token.is_some() {
            tracing::info!("Using default GitHub token for requests without ?token=");
        }

        axum::serve(listener, router(listing_service))
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        tracing::info!("github-listing-api shut down");
        Ok(())
    }
}
