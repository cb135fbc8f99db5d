//! Review-flow errors.

use restoboost_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Longest accepted feedback comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Scan intake and rating errors.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Venue does not exist.
    #[error("venue not found")]
    VenueNotFound,

    /// Rating outside `1..=5`.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    /// Positive rating on a venue without a maps URL.
    #[error("maps link not configured")]
    MapsUrlMissing,

    /// Comment longer than [`MAX_COMMENT_CHARS`].
    #[error("comment exceeds {MAX_COMMENT_CHARS} characters")]
    CommentTooLong,

    /// Contact email is not an address.
    #[error("invalid contact email")]
    InvalidContactEmail,

    /// A must-succeed write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::VenueNotFound | ReviewError::MapsUrlMissing => {
                Self::NotFound(err.to_string())
            }
            ReviewError::InvalidRating(_)
            | ReviewError::CommentTooLong
            | ReviewError::InvalidContactEmail => Self::Validation(err.to_string()),
            ReviewError::Store(e) => e.into(),
        }
    }
}
