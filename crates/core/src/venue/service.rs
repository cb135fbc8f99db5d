//! Venue, staff and logo management for authenticated owners.

use std::sync::Arc;

use restoboost_shared::types::{AccountId, StaffMemberId, VenueId};
use serde::Serialize;
use validator::ValidateUrl;

use super::error::VenueError;
use super::store::VenueStore;
use super::types::{NewVenue, StaffMember, Venue, VenueSettings};
use crate::account::{Account, AccountStore};
use crate::slug::{SlugLookup, generate_unique_slug, is_valid_slug};
use crate::storage::{StorageError, StorageService};
use crate::task::best_effort;

/// Longest venue or staff name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// Name of the venue created at sign-up.
pub const DEFAULT_VENUE_NAME: &str = "Mon Restaurant";

/// A staff member with their personal QR target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffEntry {
    /// Staff member.
    #[serde(flatten)]
    pub staff: StaffMember,
    /// Review URL attributing scans to this staff member.
    pub qr_url: String,
}

/// Result of bootstrapping a freshly signed-up account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bootstrap {
    /// The account.
    pub account: Account,
    /// Its venues, including the default one when it was just created.
    pub venues: Vec<Venue>,
}

/// Venue management.
pub struct VenueService<S> {
    store: Arc<S>,
    storage: Option<Arc<StorageService>>,
    public_url: String,
}

impl<S: VenueStore + AccountStore> VenueService<S> {
    /// Create a new venue service.
    #[must_use]
    pub fn new(store: Arc<S>, storage: Option<Arc<StorageService>>, public_url: &str) -> Self {
        Self {
            store,
            storage,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public review URL of a venue.
    #[must_use]
    pub fn review_url(&self, venue: &Venue) -> String {
        format!("{}/review/{}", self.public_url, venue.slug)
    }

    /// Review URL attributing scans to `staff`.
    #[must_use]
    pub fn staff_qr_url(&self, venue: &Venue, staff: &StaffMember) -> String {
        format!("{}?staff_id={}", self.review_url(venue), staff.id)
    }

    /// Loads the caller's account.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::AccountNotFound`] if the account was never bootstrapped.
    pub async fn account(&self, account_id: AccountId) -> Result<Account, VenueError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or(VenueError::AccountNotFound)
    }

    async fn owned(&self, account_id: AccountId, venue_id: VenueId) -> Result<Venue, VenueError> {
        self.store
            .find_owned_venue(account_id, venue_id)
            .await?
            .ok_or(VenueError::NotFound)
    }

    /// Creates the account row and the default venue after sign-up. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns an error if a datastore call or slug generation fails.
    pub async fn bootstrap(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<Bootstrap, VenueError> {
        let account = self.store.upsert_account(account_id, email).await?;

        if self.store.count_venues(account_id).await? == 0 {
            let slug = generate_unique_slug(self.store.as_ref(), DEFAULT_VENUE_NAME).await?;
            let venue = self
                .store
                .insert_venue(NewVenue {
                    account_id,
                    name: DEFAULT_VENUE_NAME.to_string(),
                    slug,
                    maps_url: None,
                })
                .await?;
            tracing::info!(account_id = %account_id, venue_id = %venue.id, "default venue created");
        }

        Ok(Bootstrap {
            venues: self.store.list_venues(account_id).await?,
            account,
        })
    }

    /// Lists the caller's venues.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore call fails.
    pub async fn list_venues(&self, account_id: AccountId) -> Result<Vec<Venue>, VenueError> {
        Ok(self.store.list_venues(account_id).await?)
    }

    /// Loads one of the caller's venues.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::NotFound`] unless the caller owns the venue.
    pub async fn get_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Venue, VenueError> {
        self.owned(account_id, venue_id).await
    }

    /// Creates a venue with a generated slug.
    ///
    /// The count check is a pre-check. The datastore trigger is authoritative under
    /// concurrent creation.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::QuotaExceeded`] at the plan limit, a validation error for
    /// bad input, or a datastore error.
    pub async fn create_venue(
        &self,
        account_id: AccountId,
        name: &str,
        maps_url: Option<&str>,
    ) -> Result<Venue, VenueError> {
        let name = validate_name(name)?;
        let maps_url = normalize_maps_url(maps_url)?;
        let account = self.account(account_id).await?;
        let plan = account.plan();

        let owned = self.store.count_venues(account_id).await?;
        if owned >= u64::from(plan.max_venues()) {
            return Err(VenueError::QuotaExceeded {
                plan,
                max: plan.max_venues(),
            });
        }

        let slug = generate_unique_slug(self.store.as_ref(), &name).await?;
        let venue = self
            .store
            .insert_venue(NewVenue {
                account_id,
                name,
                slug,
                maps_url,
            })
            .await?;

        tracing::info!(account_id = %account_id, venue_id = %venue.id, slug = %venue.slug, "venue created");
        Ok(venue)
    }

    /// Updates name, slug and maps URL.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::NotFound`] unless the caller owns the venue,
    /// [`VenueError::SlugTaken`] if another venue uses the slug, or a validation error.
    pub async fn update_settings(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        settings: VenueSettings,
    ) -> Result<Venue, VenueError> {
        let name = validate_name(&settings.name)?;
        let slug = settings.slug.trim().to_string();
        if !is_valid_slug(&slug) {
            return Err(VenueError::InvalidSlug);
        }
        let maps_url = normalize_maps_url(settings.maps_url.as_deref())?;

        self.owned(account_id, venue_id).await?;
        if self.store.slug_taken(&slug, Some(venue_id)).await? {
            return Err(VenueError::SlugTaken(slug));
        }

        self.store
            .update_venue(account_id, venue_id, VenueSettings { name, slug, maps_url })
            .await?
            .ok_or(VenueError::NotFound)
    }

    /// Deletes a venue and, best effort, its logo.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::NotFound`] unless the caller owns the venue.
    pub async fn delete_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<(), VenueError> {
        let venue = self.owned(account_id, venue_id).await?;
        if !self.store.delete_venue(account_id, venue_id).await? {
            return Err(VenueError::NotFound);
        }
        if let Some(url) = venue.logo_url {
            self.delete_logo_best_effort(&url).await;
        }
        tracing::info!(account_id = %account_id, venue_id = %venue_id, "venue deleted");
        Ok(())
    }

    /// Staff of a venue with their QR URLs, most scans first.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::NotFound`] unless the caller owns the venue.
    pub async fn list_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Vec<StaffEntry>, VenueError> {
        let venue = self.owned(account_id, venue_id).await?;
        let staff = self.store.list_staff(account_id, venue_id).await?;
        Ok(staff
            .into_iter()
            .map(|staff| StaffEntry {
                qr_url: self.staff_qr_url(&venue, &staff),
                staff,
            })
            .collect())
    }

    async fn require_staff_tracking(&self, account_id: AccountId) -> Result<(), VenueError> {
        if self.account(account_id).await?.plan().staff_tracking_enabled() {
            Ok(())
        } else {
            Err(VenueError::FeatureLocked(
                "staff tracking is available on the pro and enterprise plans",
            ))
        }
    }

    /// Adds a staff member.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::FeatureLocked`] on the free plan, [`VenueError::NotFound`]
    /// unless the caller owns the venue, or a validation error.
    pub async fn add_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        name: &str,
    ) -> Result<StaffEntry, VenueError> {
        let name = validate_name(name)?;
        self.require_staff_tracking(account_id).await?;
        let venue = self.owned(account_id, venue_id).await?;

        let staff = self.store.insert_staff(account_id, venue_id, &name).await?;
        tracing::info!(venue_id = %venue_id, staff_id = %staff.id, "staff member added");
        Ok(StaffEntry {
            qr_url: self.staff_qr_url(&venue, &staff),
            staff,
        })
    }

    /// Removes a staff member.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::FeatureLocked`] on the free plan or a not-found error.
    pub async fn remove_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        staff_id: StaffMemberId,
    ) -> Result<(), VenueError> {
        self.require_staff_tracking(account_id).await?;
        self.owned(account_id, venue_id).await?;

        if self.store.delete_staff(account_id, venue_id, staff_id).await? {
            Ok(())
        } else {
            Err(VenueError::StaffNotFound)
        }
    }

    fn storage(&self) -> Result<&StorageService, VenueError> {
        self.storage
            .as_deref()
            .ok_or_else(|| StorageError::configuration("logo storage is not configured").into())
    }

    async fn delete_logo_best_effort(&self, url: &str) {
        if let Some(storage) = self.storage.as_deref() {
            best_effort("delete_old_logo", storage.delete_by_url(url))
                .run()
                .await;
        }
    }

    /// Replaces the venue logo. The previous file is deleted best effort.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::FeatureLocked`] below the enterprise plan, a validation
    /// error for the file, or a storage or datastore error.
    pub async fn upload_logo(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<Venue, VenueError> {
        if !self.account(account_id).await?.plan().logo_upload_enabled() {
            return Err(VenueError::FeatureLocked(
                "custom logos are available on the enterprise plan",
            ));
        }
        let venue = self.owned(account_id, venue_id).await?;
        let storage = self.storage()?;

        let stored = storage.upload_logo(venue_id, content_type, data).await?;
        let updated = self
            .store
            .set_logo_url(account_id, venue_id, Some(stored.url))
            .await?
            .ok_or(VenueError::NotFound)?;

        if let Some(old) = venue.logo_url {
            self.delete_logo_best_effort(&old).await;
        }
        Ok(updated)
    }

    /// Clears the venue logo and deletes the file best effort.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError::NotFound`] unless the caller owns the venue.
    pub async fn remove_logo(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Venue, VenueError> {
        let venue = self.owned(account_id, venue_id).await?;
        let updated = self
            .store
            .set_logo_url(account_id, venue_id, None)
            .await?
            .ok_or(VenueError::NotFound)?;
        if let Some(old) = venue.logo_url {
            self.delete_logo_best_effort(&old).await;
        }
        Ok(updated)
    }
}

fn validate_name(name: &str) -> Result<String, VenueError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(VenueError::InvalidName { max: MAX_NAME_CHARS });
    }
    Ok(name.to_string())
}

/// Blank becomes `None`; anything else must be an absolute http(s) URL.
fn normalize_maps_url(url: Option<&str>) -> Result<Option<String>, VenueError> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    let web = url.starts_with("https://") || url.starts_with("http://");
    if !web || !url.validate_url() || url.chars().any(char::is_whitespace) {
        return Err(VenueError::InvalidMapsUrl);
    }
    Ok(Some(url.to_string()))
}
