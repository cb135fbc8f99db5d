//! Core business rules for RestoBoost.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the store traits each module defines; the
//! `restoboost-db` crate implements them.
//!
//! # Modules
//!
//! - `plan` - Plan policy: the single source of feature gates and limits
//! - `slug` - URL-safe venue identifiers
//! - `review` - Scan intake, rating routing, feedback capture and alerts
//! - `billing` - Checkout and subscription reconciliation from webhook events
//! - `venue` - Venue, staff and logo management
//! - `analytics` - Dashboard statistics and time-ranged analytics
//! - `storage` - Logo object storage
//! - `secret` - Constant-time shared-secret comparison

pub mod account;
pub mod analytics;
pub mod billing;
pub mod plan;
pub mod review;
pub mod secret;
pub mod slug;
pub mod storage;
pub mod store;
pub mod task;
pub mod venue;

#[cfg(test)]
pub(crate) mod testing;

pub use store::StoreError;
