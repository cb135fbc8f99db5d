//! Public review flow: QR scans and rating submissions.
//!
//! Both endpoints are anonymous.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
};
use restoboost_core::review::{RatingOutcome, RatingSubmission, ScanOutcome};
use restoboost_shared::AppError;
use restoboost_shared::types::{StaffMemberId, VenueId};

/// Creates the review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/review/{venue}", get(scan))
        .route("/review/{venue}/rating", post(submit_rating))
}

/// Query string of a scanned QR code.
#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    /// Staff member the QR code belongs to. Unparseable values are ignored.
    pub staff_id: Option<String>,
}

/// Rating form body.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Stars, 1 to 5.
    pub rating: i64,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional email for a reply.
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// GET `/review/{slug}`
///
/// 303 to the maps page when a free venue is over its cap, otherwise the form payload.
async fn scan(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ScanQuery>,
) -> ApiResult<Response> {
    let staff_id = query
        .staff_id
        .as_deref()
        .and_then(|s| s.parse::<StaffMemberId>().ok());

    match state.scans.intake(&slug, staff_id).await? {
        ScanOutcome::NotFound => Err(ApiError(AppError::NotFound(format!(
            "no venue at '{slug}'"
        )))),
        ScanOutcome::RedirectedCapExceeded { url } => Ok(Redirect::to(&url).into_response()),
        ScanOutcome::FormServed(form) => Ok(Json(form).into_response()),
    }
}

/// POST `/review/{venue_id}/rating`
async fn submit_rating(
    State(state): State<AppState>,
    Path(venue_id): Path<VenueId>,
    Json(body): Json<RatingRequest>,
) -> ApiResult<Json<RatingOutcome>> {
    let outcome = state
        .feedback
        .submit(RatingSubmission {
            venue_id,
            rating: body.rating,
            comment: body.comment,
            contact_email: body.contact_email,
        })
        .await?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, test_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use tower::ServiceExt;

    fn rating_request(venue: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/review/{venue}/rating"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_out_of_range_rating_rejected_before_lookup() {
        let (state, _dir) = test_state();
        let app = routes().with_state(state);

        let response = app
            .oneshot(rating_request(&VenueId::new().to_string(), r#"{"rating":6}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rating_for_malformed_venue_id_is_rejected() {
        let (state, _dir) = test_state();
        let app = routes().with_state(state);

        let response = app
            .oneshot(rating_request("not-a-uuid", r#"{"rating":5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scan_with_datastore_down_is_bad_gateway() {
        let (state, _dir) = test_state();
        let app = routes().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/review/le-bistrot?staff_id=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"], "UPSTREAM_UNAVAILABLE");
    }
}
