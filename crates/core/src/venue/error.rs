//! Venue management errors.

use restoboost_shared::AppError;
use thiserror::Error;

use crate::plan::Plan;
use crate::slug::SlugError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Venue, staff and logo management errors.
#[derive(Debug, Error)]
pub enum VenueError {
    /// Caller has no account row yet.
    #[error("account not found")]
    AccountNotFound,

    /// Venue does not exist or belongs to another account.
    #[error("venue not found")]
    NotFound,

    /// Staff member does not exist at this venue.
    #[error("staff member not found")]
    StaffNotFound,

    /// Venue limit of the plan reached.
    #[error("the {plan} plan allows {max} venue(s)")]
    QuotaExceeded {
        /// Current plan.
        plan: Plan,
        /// Venue limit.
        max: u32,
    },

    /// Feature not included in the plan.
    #[error("{0}")]
    FeatureLocked(&'static str),

    /// Name blank or too long.
    #[error("name must be between 1 and {max} characters")]
    InvalidName {
        /// Character limit.
        max: usize,
    },

    /// Slug does not match the allowed pattern.
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidSlug,

    /// Slug used by another venue.
    #[error("slug '{0}' is already taken")]
    SlugTaken(String),

    /// Maps URL is not an absolute http(s) URL.
    #[error("maps url must be an absolute http or https url")]
    InvalidMapsUrl,

    /// Slug generation failed.
    #[error(transparent)]
    Slug(#[from] SlugError),

    /// Logo storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Datastore failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<VenueError> for AppError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::AccountNotFound | VenueError::NotFound | VenueError::StaffNotFound => {
                Self::NotFound(err.to_string())
            }
            VenueError::QuotaExceeded { .. } => Self::QuotaExceeded(err.to_string()),
            VenueError::FeatureLocked(_) => Self::Forbidden(err.to_string()),
            VenueError::InvalidName { .. }
            | VenueError::InvalidSlug
            | VenueError::InvalidMapsUrl => Self::Validation(err.to_string()),
            VenueError::SlugTaken(_) => Self::Conflict(err.to_string()),
            VenueError::Slug(e) => e.into(),
            VenueError::Storage(e) => e.into(),
            VenueError::Store(e) => e.into(),
        }
    }
}
