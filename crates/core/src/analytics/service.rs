//! Owner-facing reporting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use restoboost_shared::types::{AccountId, PageRequest, PageResponse, VenueId};

use super::error::AnalyticsError;
use super::store::AnalyticsStore;
use super::types::{Analytics, TimeRange, VenueStats};
use crate::account::AccountStore;
use crate::review::FeedbackRecord;
use crate::venue::{Venue, VenueStore};

/// Statistics, analytics and the feedback inbox.
pub struct AnalyticsService<S> {
    store: Arc<S>,
    timezone: Tz,
}

impl<S: AnalyticsStore + VenueStore + AccountStore> AnalyticsService<S> {
    /// Create a new analytics service reporting in `timezone`.
    #[must_use]
    pub const fn new(store: Arc<S>, timezone: Tz) -> Self {
        Self { store, timezone }
    }

    /// Create a service from an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::UnknownTimezone`] for an unknown name.
    pub fn with_timezone_name(store: Arc<S>, timezone: &str) -> Result<Self, AnalyticsError> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| AnalyticsError::UnknownTimezone(timezone.to_string()))?;
        Ok(Self::new(store, tz))
    }

    async fn owned(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Venue, AnalyticsError> {
        self.store
            .find_owned_venue(account_id, venue_id)
            .await?
            .ok_or(AnalyticsError::VenueNotFound)
    }

    /// Event counts and the monthly scan counter.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::VenueNotFound`] unless the caller owns the venue.
    pub async fn stats(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<VenueStats, AnalyticsError> {
        let venue = self.owned(account_id, venue_id).await?;
        let totals = self.store.count_events(venue_id).await?;
        Ok(VenueStats {
            venue_id,
            scans_this_month: venue.scans_this_month,
            totals,
        })
    }

    /// Time-ranged analytics with daily buckets.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Locked`] on the free plan or a not-found error.
    pub async fn analytics(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Analytics, AnalyticsError> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or(AnalyticsError::AccountNotFound)?;
        if !account.plan().analytics_enabled() {
            return Err(AnalyticsError::Locked);
        }
        self.owned(account_id, venue_id).await?;

        let daily = self
            .store
            .daily_counts(venue_id, range.since(now), self.timezone)
            .await?;
        tracing::debug!(
            venue_id = %venue_id,
            range = %range,
            days = daily.len(),
            "analytics computed"
        );
        Ok(Analytics::from_daily(range, daily))
    }

    /// Captured feedback, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::VenueNotFound`] unless the caller owns the venue.
    pub async fn feedback(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        page: &PageRequest,
    ) -> Result<PageResponse<FeedbackRecord>, AnalyticsError> {
        self.owned(account_id, venue_id).await?;
        let page = page.normalized();
        let (items, total) = self.store.list_feedback(venue_id, &page).await?;
        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }
}
