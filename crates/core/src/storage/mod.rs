//! Logo storage using Apache OpenDAL.
//!
//! Supported backends:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! Logos are written under `logos/{venue_id}/` and served from a public base URL.
//! Deletion goes through the public URL, so only keys this storage issued are touched.

mod config;
mod error;
mod service;

pub use config::{LOGO_MIME_TYPES, StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredObject};
