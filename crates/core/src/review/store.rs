//! Persistence used by the anonymous review flow.

use restoboost_shared::types::{StaffMemberId, VenueId};

use super::types::{FeedbackRecord, NewFeedback, ScanEventKind};
use crate::store::StoreError;
use crate::venue::Venue;

/// Datastore access for scans and ratings.
///
/// Guests are anonymous, so implementations run with elevated access.
/// Counter updates must be atomic increments in the datastore.
pub trait ReviewStore: Send + Sync {
    /// Find a venue by slug.
    fn find_venue_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Venue>, StoreError>> + Send;

    /// Find a venue by ID.
    fn find_venue(
        &self,
        id: VenueId,
    ) -> impl std::future::Future<Output = Result<Option<Venue>, StoreError>> + Send;

    /// Atomically add one to `scans_this_month`. Returns the new count.
    fn increment_scans(
        &self,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<u32, StoreError>> + Send;

    /// Append a scan log entry.
    fn record_event(
        &self,
        venue_id: VenueId,
        kind: ScanEventKind,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Atomically add one to a staff member's `total_scans`, matching only staff of
    /// `venue_id`. Returns false if no such staff member exists.
    fn increment_staff_scans(
        &self,
        staff_id: StaffMemberId,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Persist captured feedback.
    fn insert_feedback(
        &self,
        feedback: NewFeedback,
    ) -> impl std::future::Future<Output = Result<FeedbackRecord, StoreError>> + Send;
}
