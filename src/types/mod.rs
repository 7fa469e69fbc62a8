//! Core type definitions for the listing API
//!
//! Everything here is request scoped: built while serving one inbound
//! request and dropped once the response is written.

pub mod language;
pub mod rate_limit;
pub mod repository;
pub mod view;

pub use language::*;
pub use rate_limit::*;
pub use repository::*;
pub use view::*;
