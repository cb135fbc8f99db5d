//! Administrative plan override.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use restoboost_core::account::Account;
use restoboost_core::plan::{Plan, SubscriptionStatus};
use restoboost_shared::AppError;

/// Creates the admin routes (requires auth and admin middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/plan", post(override_plan))
}

/// Request body for a plan override.
#[derive(Debug, Deserialize, Validate)]
pub struct OverridePlanRequest {
    /// Target account's email.
    #[validate(email)]
    pub email: String,
    /// Plan to set.
    pub plan: Plan,
    /// Status to set. Derived from the plan when absent.
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
}

/// POST `/admin/plan`
async fn override_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<OverridePlanRequest>,
) -> ApiResult<Json<Account>> {
    body.validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))?;

    tracing::info!(
        admin = ?auth.email(),
        target = %body.email,
        plan = %body.plan,
        "plan override requested"
    );
    let account = state
        .billing
        .override_plan(&body.email, body.plan, body.status)
        .await?;
    Ok(Json(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{admin_middleware, auth_middleware};
    use crate::test_support::{ADMIN_EMAIL, body_json, test_state, token_for};
    use axum::{
        body::Body,
        http::{
            Request, StatusCode,
            header::{AUTHORIZATION, CONTENT_TYPE},
        },
        middleware::from_fn_with_state,
    };
    use restoboost_shared::types::AccountId;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        routes()
            .layer(from_fn_with_state(state.clone(), admin_middleware))
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    fn override_request(token: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/admin/plan")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"owner@resto.fr","plan":"pro"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_non_admin_is_unauthorized() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), "owner@resto.fr");

        let response = app(state).oneshot(override_request(&token)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_admin_email_matches_case_insensitively() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), &ADMIN_EMAIL.to_uppercase());

        let response = app(state).oneshot(override_request(&token)).await.unwrap();

        // Passes the guard and fails at the disconnected datastore.
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), ADMIN_EMAIL);

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/plan")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"not-an-email","plan":"pro"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_request_parses_plan_and_status() {
        let body: OverridePlanRequest = serde_json::from_str(
            r#"{"email":"a@b.fr","plan":"enterprise","status":"past_due"}"#,
        )
        .unwrap();
        assert_eq!(body.plan, Plan::Enterprise);
        assert_eq!(body.status, Some(SubscriptionStatus::PastDue));
    }
}
