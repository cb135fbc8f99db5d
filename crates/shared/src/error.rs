//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller lacks the required session or admin identity.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Action is not available to the caller, typically a plan gate.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A plan limit was hit.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Conflict (e.g., duplicate slug).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Billing webhook failed signature verification.
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Datastore, email, billing or storage collaborator failure.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::SignatureInvalid(_) => 400,
            Self::Conflict(_) => 409,
            Self::QuotaExceeded(_) => 402,
            Self::UpstreamUnavailable(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::Conflict(_) => "CONFLICT",
            Self::SignatureInvalid(_) => "SIGNATURE_INVALID",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::QuotaExceeded(m)
            | Self::Conflict(m)
            | Self::SignatureInvalid(m)
            | Self::UpstreamUnavailable(m)
            | Self::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::QuotaExceeded(String::new()), 402, "QUOTA_EXCEEDED")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::SignatureInvalid(String::new()), 400, "SIGNATURE_INVALID")]
    #[case(AppError::UpstreamUnavailable(String::new()), 502, "UPSTREAM_UNAVAILABLE")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(
        #[case] error: AppError,
        #[case] status: u16,
        #[case] code: &'static str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::QuotaExceeded("msg".into()).to_string(),
            "Quota exceeded: msg"
        );
        assert_eq!(
            AppError::SignatureInvalid("msg".into()).to_string(),
            "Invalid signature: msg"
        );
        assert_eq!(
            AppError::UpstreamUnavailable("msg".into()).to_string(),
            "Upstream unavailable: msg"
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        assert_eq!(AppError::NotFound("venue".into()).message(), "venue");
    }
}
