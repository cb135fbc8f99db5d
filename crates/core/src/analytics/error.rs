//! Analytics errors.

use restoboost_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Analytics errors.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The caller has no account row.
    #[error("account not found")]
    AccountNotFound,

    /// The venue does not exist or belongs to another account.
    #[error("venue not found")]
    VenueNotFound,

    /// The plan does not include advanced analytics.
    #[error("analytics are available on the pro and enterprise plans")]
    Locked,

    /// Reporting timezone is not a known IANA name.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Unknown time range.
    #[error("unknown time range: {0}")]
    InvalidRange(String),

    /// Datastore failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::AccountNotFound | AnalyticsError::VenueNotFound => {
                Self::NotFound(err.to_string())
            }
            AnalyticsError::Locked => Self::Forbidden(err.to_string()),
            AnalyticsError::InvalidRange(_) => Self::Validation(err.to_string()),
            AnalyticsError::UnknownTimezone(_) => Self::Internal(err.to_string()),
            AnalyticsError::Store(e) => e.into(),
        }
    }
}
