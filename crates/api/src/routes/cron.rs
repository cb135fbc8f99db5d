//! Scheduled jobs triggered by an external cron.

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
};
use restoboost_core::secret::secret_matches;
use restoboost_shared::AppError;

/// Creates the cron routes, authenticated by the shared reset secret.
pub fn routes() -> Router<AppState> {
    Router::new().route("/cron/reset-scans", get(reset_scans).post(reset_scans))
}

/// Result of the monthly reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Venues whose counter was non-zero.
    pub venues_reset: u64,
    /// When the reset ran.
    pub reset_at: DateTime<Utc>,
}

fn authorize(
    expected: Option<&str>,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        tracing::warn!("scan reset called but no reset secret is configured");
        return Err(ApiError(AppError::Unauthorized(
            "scheduled reset is disabled".to_string(),
        )));
    };
    match header {
        Ok(TypedHeader(Authorization(bearer))) if secret_matches(expected, bearer.token()) => {
            Ok(())
        }
        _ => {
            tracing::warn!("scan reset refused: bad or missing secret");
            Err(ApiError(AppError::Unauthorized(
                "invalid cron secret".to_string(),
            )))
        }
    }
}

/// GET or POST `/cron/reset-scans`
///
/// Zeroes every venue's monthly counter. Idempotent.
async fn reset_scans(
    State(state): State<AppState>,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> ApiResult<Json<ResetResponse>> {
    authorize(state.cron_secret.as_deref(), header)?;

    let venues_reset = state.store.reset_monthly_scans().await?;
    Ok(Json(ResetResponse {
        venues_reset,
        reset_at: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CRON_SECRET, body_json, test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
    };
    use rstest::rstest;
    use tower::ServiceExt;

    fn request(method: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri("/cron/reset-scans");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer wrong"))]
    #[case(Some("Bearer cron-secret-and-more"))]
    #[case(Some("Basic Y3Jvbjpjcm9u"))]
    #[tokio::test]
    async fn test_bad_secret_is_unauthorized(#[case] auth: Option<&str>) {
        let (state, _dir) = test_state();
        let response = routes()
            .with_state(state)
            .oneshot(request("POST", auth))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unset_secret_disables_endpoint() {
        let (mut state, _dir) = test_state();
        state.cron_secret = None;

        let response = routes()
            .with_state(state)
            .oneshot(request("GET", Some(&format!("Bearer {CRON_SECRET}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("GET")]
    #[case("POST")]
    #[tokio::test]
    async fn test_valid_secret_reaches_datastore(#[case] method: &str) {
        let (state, _dir) = test_state();
        let response = routes()
            .with_state(state)
            .oneshot(request(method, Some(&format!("Bearer {CRON_SECRET}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
