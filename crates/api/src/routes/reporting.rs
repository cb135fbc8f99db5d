//! Dashboard reporting: captured feedback, basic stats and analytics.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use restoboost_core::analytics::{Analytics, TimeRange, VenueStats};
use restoboost_core::review::FeedbackRecord;
use restoboost_shared::types::{PageRequest, PageResponse, VenueId};

/// Creates the reporting routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues/{venue_id}/feedback", get(list_feedback))
        .route("/venues/{venue_id}/stats", get(stats))
        .route("/venues/{venue_id}/analytics", get(analytics))
}

/// Query parameters for analytics.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// Window, `7d`, `30d`, `90d` or `all`. Defaults to `30d`.
    #[serde(default)]
    pub range: TimeRange,
}

/// GET `/venues/{venue_id}/feedback`
async fn list_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<FeedbackRecord>>> {
    let page = state
        .analytics
        .feedback(auth.account_id(), venue_id, &page)
        .await?;
    Ok(Json(page))
}

/// GET `/venues/{venue_id}/stats`
///
/// Available on every plan.
async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
) -> ApiResult<Json<VenueStats>> {
    Ok(Json(state.analytics.stats(auth.account_id(), venue_id).await?))
}

/// GET `/venues/{venue_id}/analytics?range=30d`
async fn analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<Analytics>> {
    let analytics = state
        .analytics
        .analytics(auth.account_id(), venue_id, query.range, Utc::now())
        .await?;
    Ok(Json(analytics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth_middleware;
    use crate::test_support::{test_state, token_for};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
        middleware::from_fn_with_state,
    };
    use restoboost_shared::types::AccountId;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_range_is_rejected() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), "owner@resto.fr");
        let app = Router::new()
            .merge(routes())
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/venues/{}/analytics?range=1y", VenueId::new()))
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_analytics_query_defaults_to_thirty_days() {
        let query: AnalyticsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.range, TimeRange::Last30Days);
    }
}
