//! The signed-in owner's account.

use axum::{Json, Router, extract::State, routing::{get, post}};
use serde::Serialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use restoboost_core::account::Account;
use restoboost_core::plan::Features;
use restoboost_core::venue::Bootstrap;
use restoboost_shared::AppError;

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/bootstrap", post(bootstrap))
}

/// Account with the feature gates of its plan.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Account.
    #[serde(flatten)]
    pub account: Account,
    /// Feature gates of the effective plan.
    pub features: Features,
}

/// GET `/me`
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let account = state.venues.account(auth.account_id()).await?;
    Ok(Json(MeResponse {
        features: account.plan().features(),
        account,
    }))
}

/// POST `/me/bootstrap`
///
/// Called by the dashboard after sign-up. Safe to repeat.
async fn bootstrap(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Bootstrap>> {
    let Some(email) = auth.email() else {
        return Err(ApiError(AppError::Validation(
            "token carries no email".to_string(),
        )));
    };
    Ok(Json(
        state.venues.bootstrap(auth.account_id(), email).await?,
    ))
}
