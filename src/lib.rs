/// Server configuration: defaults, TOML file, environment
pub mod config;

/// GitHub REST client, wire types and failure taxonomy
pub mod github;

/// Listing pipeline: fan-out dispatcher, aggregation and request orchestration
pub mod services;

/// HTTP routes and server bootstrap
pub mod transport;

/// Core type definitions and domain models used throughout the library
pub mod types;
