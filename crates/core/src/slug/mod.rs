//! Slug generation for venue review URLs.
//!
//! A slug is derived from the venue name and made unique by appending `-1`, `-2`, …
//! The lookup is a pre-check only. Two concurrent creations with the same base can
//! both see a free slug; the unique constraint on `venues.slug` rejects the loser,
//! which surfaces as [`StoreError::UniqueViolation`](crate::store::StoreError).

mod normalize;

#[cfg(test)]
mod normalize_props;

pub use normalize::{FALLBACK_SLUG, MAX_SLUG_LEN, is_valid_slug, slugify};

use restoboost_shared::{AppError, types::VenueId};
use thiserror::Error;

use crate::store::StoreError;

/// Suffixes tried before giving up on a base slug.
pub const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Slug generation errors.
#[derive(Debug, Error)]
pub enum SlugError {
    /// Every suffix up to the attempt limit is taken.
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted {
        /// Base slug that collided.
        base: String,
        /// Suffixes tried.
        attempts: u32,
    },

    /// Lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SlugError> for AppError {
    fn from(err: SlugError) -> Self {
        match err {
            SlugError::Exhausted { .. } => Self::Conflict(err.to_string()),
            SlugError::Store(e) => e.into(),
        }
    }
}

/// Exact-match lookup over every venue slug, across all tenants.
pub trait SlugLookup: Send + Sync {
    /// Returns true if a venue other than `except` already uses `slug`.
    fn slug_taken(
        &self,
        slug: &str,
        except: Option<VenueId>,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;
}

/// Derives a slug from `name` that no other venue uses.
///
/// # Errors
///
/// Returns [`SlugError::Exhausted`] when `base` through `base-100` are all taken, or
/// the lookup error.
pub async fn generate_unique_slug<L: SlugLookup>(
    lookup: &L,
    name: &str,
) -> Result<String, SlugError> {
    let base = slugify(name);

    if !lookup.slug_taken(&base, None).await? {
        return Ok(base);
    }

    for suffix in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{base}-{suffix}");
        if !lookup.slug_taken(&candidate, None).await? {
            tracing::debug!(base = %base, slug = %candidate, "slug collision resolved");
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted {
        base,
        attempts: MAX_SLUG_ATTEMPTS,
    })
}
