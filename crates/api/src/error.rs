//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use restoboost_core::StoreError;
use restoboost_core::analytics::AnalyticsError;
use restoboost_core::billing::BillingError;
use restoboost_core::review::ReviewError;
use restoboost_core::venue::VenueError;
use restoboost_shared::AppError;

/// Error returned by handlers, rendered as `{"error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            AppError::Internal(detail) => {
                error!(error = %detail, "internal error");
                "An error occurred"
            }
            AppError::UpstreamUnavailable(detail) => {
                error!(error = %detail, "upstream collaborator failed");
                "A dependent service is unavailable"
            }
            other => other.message(),
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

macro_rules! via_app_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

via_app_error!(
    StoreError,
    VenueError,
    ReviewError,
    AnalyticsError,
    BillingError,
);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[rstest]
    #[case(AppError::NotFound("venue not found".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::QuotaExceeded("limit".into()), StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED")]
    #[case(AppError::SignatureInvalid("bad".into()), StatusCode::BAD_REQUEST, "SIGNATURE_INVALID")]
    #[case(AppError::Conflict("taken".into()), StatusCode::CONFLICT, "CONFLICT")]
    #[tokio::test]
    async fn test_status_and_code(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let (actual, body) = render(err).await;
        assert_eq!(actual, status);
        assert_eq!(body["error"], code);
    }

    #[tokio::test]
    async fn test_message_is_passed_through() {
        let (_, body) = render(AppError::Forbidden("upgrade to pro".into())).await;
        assert_eq!(body["message"], "upgrade to pro");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(AppError::Internal("connection string leaked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An error occurred");

        let (status, body) =
            render(AppError::UpstreamUnavailable("smtp password wrong".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["message"].as_str().unwrap().contains("smtp"));
    }

    #[tokio::test]
    async fn test_core_errors_convert() {
        let err: ApiError = VenueError::InvalidSlug.into();
        assert_eq!(err.0.status_code(), 400);

        let err: ApiError = StoreError::UniqueViolation("venues_slug_key".into()).into();
        assert_eq!(err.0.status_code(), 409);
    }
}
