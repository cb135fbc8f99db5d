//! Owner-scoped persistence for venues and staff.

use restoboost_shared::types::{AccountId, StaffMemberId, VenueId};

use super::types::{NewVenue, StaffMember, Venue, VenueSettings};
use crate::slug::SlugLookup;
use crate::store::StoreError;

/// Datastore access on behalf of an authenticated owner.
///
/// Every method takes the caller's account and only sees that account's rows.
pub trait VenueStore: SlugLookup {
    /// Number of venues the account owns.
    fn count_venues(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Venues of the account, oldest first.
    fn list_venues(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<Venue>, StoreError>> + Send;

    /// One venue, if the account owns it.
    fn find_owned_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<Option<Venue>, StoreError>> + Send;

    /// Insert a venue. The slug constraint and quota trigger may reject it.
    fn insert_venue(
        &self,
        venue: NewVenue,
    ) -> impl std::future::Future<Output = Result<Venue, StoreError>> + Send;

    /// Overwrite name, slug and maps URL.
    fn update_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        settings: VenueSettings,
    ) -> impl std::future::Future<Output = Result<Option<Venue>, StoreError>> + Send;

    /// Set or clear the logo URL.
    fn set_logo_url(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        logo_url: Option<String>,
    ) -> impl std::future::Future<Output = Result<Option<Venue>, StoreError>> + Send;

    /// Delete a venue with its staff, events and feedback.
    fn delete_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Staff of a venue, most scans first.
    fn list_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> impl std::future::Future<Output = Result<Vec<StaffMember>, StoreError>> + Send;

    /// Add a staff member.
    fn insert_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        name: &str,
    ) -> impl std::future::Future<Output = Result<StaffMember, StoreError>> + Send;

    /// Remove a staff member of the venue.
    fn delete_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        staff_id: StaffMemberId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;
}
