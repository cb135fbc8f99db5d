//! Subscription checkout and the billing provider's webhook.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use restoboost_core::billing::ReconcileOutcome;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Checkout route (requires auth middleware to be applied externally).
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/billing/checkout", post(checkout))
}

/// Webhook route, authenticated by signature.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/billing/webhook", post(webhook))
}

/// Request body for starting a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    /// Price to subscribe to.
    pub price_id: String,
}

/// Hosted checkout page.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Where to send the owner.
    pub url: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Always true once the signature verified.
    pub received: bool,
    /// What reconciliation did.
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

/// POST `/billing/checkout`
async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<Json<CheckoutResponse>> {
    let account = state.venues.account(auth.account_id()).await?;
    let url = state.billing.start_checkout(&account, &body.price_id).await?;
    Ok(Json(CheckoutResponse { url }))
}

/// POST `/billing/webhook`
///
/// The raw body is verified before parsing. Events matching no account are
/// acknowledged so the provider stops retrying.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = state
        .billing
        .handle_webhook(&body, signature, Utc::now())
        .await?;

    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
