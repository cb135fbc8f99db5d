//! Request guards.

pub mod auth;

pub use auth::{AuthUser, admin_middleware, auth_middleware};
