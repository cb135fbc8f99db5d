//! Venue, staff and logo management for the signed-in owner.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use restoboost_core::venue::{StaffEntry, Venue, VenueSettings};
use restoboost_shared::AppError;
use restoboost_shared::types::{StaffMemberId, VenueId};

/// Request body cap of the logo route. The configured logo limit applies on top.
const LOGO_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Multipart field carrying the logo file.
const LOGO_FIELD: &str = "logo";

/// Creates the venue routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues", get(list_venues).post(create_venue))
        .route(
            "/venues/{venue_id}",
            put(update_venue).delete(delete_venue),
        )
        .route(
            "/venues/{venue_id}/logo",
            put(upload_logo)
                .delete(remove_logo)
                .layer(DefaultBodyLimit::max(LOGO_BODY_LIMIT)),
        )
        .route("/venues/{venue_id}/staff", get(list_staff).post(add_staff))
        .route(
            "/venues/{venue_id}/staff/{staff_id}",
            delete(remove_staff),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a venue.
#[derive(Debug, Deserialize)]
pub struct CreateVenueRequest {
    /// Venue name.
    pub name: String,
    /// Public review page.
    #[serde(default)]
    pub maps_url: Option<String>,
}

/// Request body for updating venue settings.
#[derive(Debug, Deserialize)]
pub struct UpdateVenueRequest {
    /// Venue name.
    pub name: String,
    /// Public slug.
    pub slug: String,
    /// Public review page. Blank clears it.
    #[serde(default)]
    pub maps_url: Option<String>,
}

/// Request body for adding a staff member.
#[derive(Debug, Deserialize)]
pub struct AddStaffRequest {
    /// Staff member name.
    pub name: String,
}

/// A venue with its public review URL.
#[derive(Debug, Serialize)]
pub struct VenueResponse {
    /// Venue.
    #[serde(flatten)]
    pub venue: Venue,
    /// URL encoded in the venue's QR code.
    pub review_url: String,
}

fn venue_response(state: &AppState, venue: Venue) -> VenueResponse {
    VenueResponse {
        review_url: state.venues.review_url(&venue),
        venue,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/venues`
async fn list_venues(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<VenueResponse>>> {
    let venues = state.venues.list_venues(auth.account_id()).await?;
    Ok(Json(
        venues
            .into_iter()
            .map(|v| venue_response(&state, v))
            .collect(),
    ))
}

/// POST `/venues`
async fn create_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateVenueRequest>,
) -> ApiResult<(StatusCode, Json<VenueResponse>)> {
    let venue = state
        .venues
        .create_venue(auth.account_id(), &body.name, body.maps_url.as_deref())
        .await?;
    info!(account_id = %auth.account_id(), venue_id = %venue.id, slug = %venue.slug, "venue created");
    Ok((StatusCode::CREATED, Json(venue_response(&state, venue))))
}

/// PUT `/venues/{venue_id}`
async fn update_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
    Json(body): Json<UpdateVenueRequest>,
) -> ApiResult<Json<VenueResponse>> {
    let venue = state
        .venues
        .update_settings(
            auth.account_id(),
            venue_id,
            VenueSettings {
                name: body.name,
                slug: body.slug,
                maps_url: body.maps_url,
            },
        )
        .await?;
    Ok(Json(venue_response(&state, venue)))
}

/// DELETE `/venues/{venue_id}`
async fn delete_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
) -> ApiResult<StatusCode> {
    state.venues.delete_venue(auth.account_id(), venue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/venues/{venue_id}/logo`
///
/// Multipart body with the image in the `logo` field.
async fn upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
    mut multipart: Multipart,
) -> ApiResult<Json<VenueResponse>> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ApiError(AppError::Validation(format!("invalid multipart body: {e}")))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(LOGO_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(invalid)?;

        let venue = state
            .venues
            .upload_logo(auth.account_id(), venue_id, &content_type, data.to_vec())
            .await?;
        return Ok(Json(venue_response(&state, venue)));
    }

    Err(ApiError(AppError::Validation(format!(
        "multipart field '{LOGO_FIELD}' is required"
    ))))
}

/// DELETE `/venues/{venue_id}/logo`
async fn remove_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
) -> ApiResult<Json<VenueResponse>> {
    let venue = state.venues.remove_logo(auth.account_id(), venue_id).await?;
    Ok(Json(venue_response(&state, venue)))
}

/// GET `/venues/{venue_id}/staff`
async fn list_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
) -> ApiResult<Json<Vec<StaffEntry>>> {
    let staff = state.venues.list_staff(auth.account_id(), venue_id).await?;
    Ok(Json(staff))
}

/// POST `/venues/{venue_id}/staff`
async fn add_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<VenueId>,
    Json(body): Json<AddStaffRequest>,
) -> ApiResult<(StatusCode, Json<StaffEntry>)> {
    let entry = state
        .venues
        .add_staff(auth.account_id(), venue_id, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE `/venues/{venue_id}/staff/{staff_id}`
async fn remove_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((venue_id, staff_id)): Path<(VenueId, StaffMemberId)>,
) -> ApiResult<StatusCode> {
    state
        .venues
        .remove_staff(auth.account_id(), venue_id, staff_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth_middleware;
    use crate::test_support::{body_json, test_state, token_for};
    use axum::{
        body::Body,
        http::{
            Request,
            header::{AUTHORIZATION, CONTENT_TYPE},
        },
        middleware::from_fn_with_state,
    };
    use restoboost_shared::types::AccountId;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .merge(routes())
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_list_venues_no_auth() {
        let (state, _dir) = test_state();
        let response = app(state)
            .oneshot(Request::builder().uri("/venues").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logo_upload_requires_multipart() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), "owner@resto.fr");

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/venues/{}/logo", VenueId::new()))
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logo_upload_without_logo_field() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), "owner@resto.fr");
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"other\"\r\n\r\n\
                    value\r\n\
                    --XBOUNDARY--\r\n";

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/venues/{}/logo", VenueId::new()))
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_venue_with_datastore_down() {
        let (state, _dir) = test_state();
        let token = token_for(&state, AccountId::new(), "owner@resto.fr");

        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/venues")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Le Bistrot"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
