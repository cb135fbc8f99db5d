//! Scan intake: what happens when a guest opens a QR code.

use std::sync::Arc;

use restoboost_shared::types::{AccountId, StaffMemberId};

use super::error::ReviewError;
use super::store::ReviewStore;
use super::types::{RatingForm, ScanEventKind, ScanOutcome};
use crate::account::AccountStore;
use crate::plan::Plan;
use crate::task::{best_effort, critical};

/// Resolves an account's plan, treating a missing account as free.
async fn resolve_plan<S: AccountStore>(
    store: &S,
    account_id: AccountId,
) -> Result<Plan, ReviewError> {
    let account = store.find_account(account_id).await?;
    Ok(account.map_or_else(
        || {
            tracing::warn!(account_id = %account_id, "venue owner has no account row, using free plan");
            Plan::Free
        },
        |a| a.plan(),
    ))
}

/// Handles QR scans.
pub struct ScanService<S> {
    store: Arc<S>,
}

impl<S: ReviewStore + AccountStore> ScanService<S> {
    /// Create a new scan service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Processes one scan of `slug`, optionally attributed to a staff member.
    ///
    /// The monthly counter is incremented and a `scan` event logged for every scan of
    /// an existing venue, including scans redirected past the free cap. Staff
    /// attribution is best effort and ignored on plans without staff tracking.
    ///
    /// # Errors
    ///
    /// Returns an error if the venue lookup, the counter increment or the event log
    /// fails.
    pub async fn intake(
        &self,
        slug: &str,
        staff_id: Option<StaffMemberId>,
    ) -> Result<ScanOutcome, ReviewError> {
        let Some(venue) = self.store.find_venue_by_slug(slug).await? else {
            tracing::debug!(slug, "scan for unknown slug");
            return Ok(ScanOutcome::NotFound);
        };

        let plan = resolve_plan(self.store.as_ref(), venue.account_id).await?;

        let scans = critical("increment_scans", self.store.increment_scans(venue.id))
            .run()
            .await?;

        critical(
            "record_scan_event",
            self.store.record_event(venue.id, ScanEventKind::Scan),
        )
        .run()
        .await?;

        if plan.monthly_scan_cap().is_exceeded_by(scans) {
            if let Some(url) = venue.maps_url {
                tracing::info!(venue_id = %venue.id, scans, "monthly scan cap exceeded, redirecting");
                return Ok(ScanOutcome::RedirectedCapExceeded { url });
            }
            tracing::debug!(venue_id = %venue.id, scans, "scan cap exceeded without maps url, serving form");
        }

        let staff_id = match staff_id {
            Some(staff_id) if plan.staff_tracking_enabled() => {
                let matched = best_effort(
                    "increment_staff_scans",
                    self.store.increment_staff_scans(staff_id, venue.id),
                )
                .run()
                .await
                .unwrap_or(false);
                if !matched {
                    tracing::debug!(venue_id = %venue.id, staff_id = %staff_id, "staff id not attributed");
                }
                matched.then_some(staff_id)
            }
            _ => None,
        };

        Ok(ScanOutcome::FormServed(RatingForm {
            venue_id: venue.id,
            name: venue.name,
            logo_url: venue.logo_url,
            show_branding: plan.branding_visible(),
            staff_id,
        }))
    }
}
