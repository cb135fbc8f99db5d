//! Dashboard statistics and plan-gated analytics over the scan log.
//!
//! Basic event counts are available on every plan. Time-ranged analytics with
//! per-day buckets require `Plan::analytics_enabled`.

mod error;
mod service;
mod store;
mod types;


pub use error::AnalyticsError;
pub use service::AnalyticsService;
pub use store::AnalyticsStore;
pub use types::{Analytics, DailyBucket, EventCounts, TimeRange, VenueStats};
