//! Read access to the scan log and captured feedback.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use restoboost_shared::types::{PageRequest, VenueId};

use super::types::{DailyBucket, EventCounts};
use crate::review::FeedbackRecord;
use crate::store::StoreError;

/// Reporting queries. Callers check venue ownership first.
pub trait AnalyticsStore: Send + Sync {
    /// Event counts per kind over the venue's whole history.
    fn count_events(
        &self,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<EventCounts, StoreError>> + Send;

    /// Event counts per local calendar day in `tz`, oldest first, for events at
    /// or after `since` (the whole history when `None`). Days without events are
    /// absent.
    fn daily_counts(
        &self,
        venue_id: VenueId,
        since: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> impl std::future::Future<Output = Result<Vec<DailyBucket>, StoreError>> + Send;

    /// One page of feedback, newest first, with the total count.
    fn list_feedback(
        &self,
        venue_id: VenueId,
        page: &PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<FeedbackRecord>, u64), StoreError>>
    + Send;
}
