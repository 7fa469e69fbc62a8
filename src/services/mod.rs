//! Listing pipeline: fan-out over upstream pages and repositories, then aggregation

pub mod aggregate;
pub mod fan_out;
pub mod listing;

pub use fan_out::FanOutDispatcher;
pub use listing::ListingService;
