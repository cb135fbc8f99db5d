//! Shared types, errors, configuration and outbound clients for RestoBoost.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management
//! - Auth token validation, SMTP email and billing provider clients

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod stripe;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, AuthConfig, BillingConfig, EmailConfig, StorageSettings};
pub use email::{EmailError, EmailMessage, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
pub use stripe::{CheckoutRequest, CheckoutSession, StripeClient, StripeError};
