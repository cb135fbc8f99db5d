//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{admin_middleware, auth_middleware},
};

pub mod account;
pub mod admin;
pub mod billing;
pub mod cron;
pub mod health;
pub mod reporting;
pub mod review;
pub mod venues;

/// Creates the API router, applying the auth and admin guards.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Order matters: the admin guard reads claims the auth layer inserts.
    let admin_routes = admin::routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let protected_routes = Router::new()
        .merge(account::routes())
        .merge(venues::routes())
        .merge(reporting::routes())
        .merge(billing::checkout_routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(review::routes())
        .merge(billing::webhook_routes())
        .merge(cron::routes())
        .merge(protected_routes)
        .merge(admin_routes)
}
