//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the public review flow, owner dashboard, billing and cron
//! - Authentication, admin and cron-secret guards
//! - HTTP mapping of [`AppError`]

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use restoboost_core::analytics::AnalyticsService;
use restoboost_core::billing::{BillingService, BillingSettings};
use restoboost_core::review::{FeedbackService, ScanService};
use restoboost_core::storage::{StorageConfig, StorageService};
use restoboost_core::venue::VenueService;
use restoboost_db::PgStore;
use restoboost_shared::{AppConfig, AppError, AuthConfig, EmailService, JwtService, StripeClient};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Datastore.
    pub store: Arc<PgStore>,
    /// Bearer token validation.
    pub jwt_service: Arc<JwtService>,
    /// Admin identities.
    pub auth: Arc<AuthConfig>,
    /// Scan intake.
    pub scans: Arc<ScanService<PgStore>>,
    /// Rating submission.
    pub feedback: Arc<FeedbackService<PgStore, EmailService>>,
    /// Venue, staff and logo management.
    pub venues: Arc<VenueService<PgStore>>,
    /// Dashboard statistics.
    pub analytics: Arc<AnalyticsService<PgStore>>,
    /// Checkout, webhooks and plan overrides.
    pub billing: Arc<BillingService<PgStore, StripeClient>>,
    /// Bearer secret of the scheduled reset, `None` when disabled.
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    /// Wires every service over one connection pool.
    ///
    /// Logo storage that fails to initialize is disabled with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the analytics timezone is unknown.
    pub fn new(config: &AppConfig, db: DatabaseConnection) -> Result<Self, AppError> {
        let store = Arc::new(PgStore::new(db));

        let storage = match StorageService::from_config(StorageConfig::from_settings(&config.storage))
        {
            Ok(storage) => {
                tracing::info!(provider = storage.provider_name(), "logo storage ready");
                Some(Arc::new(storage))
            }
            Err(e) => {
                tracing::warn!(error = %e, "logo storage disabled");
                None
            }
        };

        let email = Arc::new(EmailService::new(config.email.clone()));
        let stripe = Arc::new(StripeClient::new(&config.billing));
        let public_url = config.server.public_url.as_str();

        Ok(Self {
            jwt_service: Arc::new(JwtService::new(&config.auth)),
            auth: Arc::new(config.auth.clone()),
            scans: Arc::new(ScanService::new(Arc::clone(&store))),
            feedback: Arc::new(FeedbackService::new(Arc::clone(&store), email)),
            venues: Arc::new(VenueService::new(Arc::clone(&store), storage, public_url)),
            analytics: Arc::new(AnalyticsService::with_timezone_name(
                Arc::clone(&store),
                &config.analytics.timezone,
            )?),
            billing: Arc::new(BillingService::new(
                Arc::clone(&store),
                stripe,
                BillingSettings::from_config(&config.billing, public_url),
            )),
            cron_secret: config
                .cron
                .reset_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Arc::from),
            store,
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
