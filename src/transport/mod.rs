//! HTTP surface of the listing API

/// Server bootstrap: bind, serve, graceful shutdown
pub mod http_server;

/// Route table, handlers and error rendering
pub mod routes;

pub use http_server::HttpServerApp;
pub use routes::router;
