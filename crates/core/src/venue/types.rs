//! Venue and staff records.

use chrono::{DateTime, Utc};
use restoboost_shared::types::{AccountId, StaffMemberId, VenueId};
use serde::Serialize;

/// A reviewable restaurant location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    /// Venue ID.
    pub id: VenueId,
    /// Owning account.
    pub account_id: AccountId,
    /// Display name.
    pub name: String,
    /// Globally unique URL identifier.
    pub slug: String,
    /// Public review page the happy path redirects to.
    pub maps_url: Option<String>,
    /// Public URL of the uploaded logo.
    pub logo_url: Option<String>,
    /// Scans since the last monthly reset.
    pub scans_this_month: u32,
    /// When the venue was created.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    /// Owning account.
    pub account_id: AccountId,
    /// Display name.
    pub name: String,
    /// Slug, already checked for uniqueness.
    pub slug: String,
    /// Maps URL.
    pub maps_url: Option<String>,
}

/// Editable venue settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueSettings {
    /// Display name.
    pub name: String,
    /// New slug.
    pub slug: String,
    /// Maps URL. Blank clears it.
    pub maps_url: Option<String>,
}

/// A per-venue QR attribution target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffMember {
    /// Staff member ID.
    pub id: StaffMemberId,
    /// Venue the staff member works at.
    pub venue_id: VenueId,
    /// Display name.
    pub name: String,
    /// Scans attributed to this staff member.
    pub total_scans: u32,
    /// When the staff member was added.
    pub created_at: DateTime<Utc>,
}
