//! Venue and staff persistence. Owner-scoped calls run under RLS.

use chrono::Utc;
use restoboost_core::StoreError;
use restoboost_core::slug::SlugLookup;
use restoboost_core::venue::{NewVenue, StaffMember, Venue, VenueSettings, VenueStore};
use restoboost_shared::types::{AccountId, StaffMemberId, VenueId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use super::{PgStore, store_error};
use crate::entities::{staff_members, venues};
use crate::rls::RlsConnection;

impl PgStore {
    async fn owner_scope(&self, account_id: AccountId) -> Result<RlsConnection, StoreError> {
        RlsConnection::new(&self.db, account_id)
            .await
            .map_err(store_error)
    }

    async fn update_owned(
        &self,
        account_id: AccountId,
        row: venues::ActiveModel,
    ) -> Result<Option<Venue>, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let result = venues::Entity::update(row)
            .filter(venues::Column::AccountId.eq(account_id.into_inner()))
            .exec(rls.transaction())
            .await;

        let updated = match result {
            Ok(model) => Some(Venue::from(model)),
            Err(DbErr::RecordNotUpdated) => None,
            Err(e) => return Err(store_error(e)),
        };
        rls.commit().await.map_err(store_error)?;
        Ok(updated)
    }
}

impl SlugLookup for PgStore {
    async fn slug_taken(&self, slug: &str, except: Option<VenueId>) -> Result<bool, StoreError> {
        let mut query = venues::Entity::find().filter(venues::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(venues::Column::Id.ne(id.into_inner()));
        }
        let count = query.count(&self.db).await.map_err(store_error)?;
        Ok(count > 0)
    }
}

impl VenueStore for PgStore {
    async fn count_venues(&self, account_id: AccountId) -> Result<u64, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let count = venues::Entity::find()
            .filter(venues::Column::AccountId.eq(account_id.into_inner()))
            .count(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(count)
    }

    async fn list_venues(&self, account_id: AccountId) -> Result<Vec<Venue>, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let models = venues::Entity::find()
            .filter(venues::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(venues::Column::CreatedAt)
            .all(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(models.into_iter().map(Venue::from).collect())
    }

    async fn find_owned_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Option<Venue>, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let model = venues::Entity::find_by_id(venue_id.into_inner())
            .filter(venues::Column::AccountId.eq(account_id.into_inner()))
            .one(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(model.map(Venue::from))
    }

    async fn insert_venue(&self, venue: NewVenue) -> Result<Venue, StoreError> {
        let now = Utc::now().into();
        let rls = self.owner_scope(venue.account_id).await?;
        let model = venues::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(venue.account_id.into_inner()),
            name: Set(venue.name),
            slug: Set(venue.slug),
            maps_url: Set(venue.maps_url),
            logo_url: Set(None),
            scans_this_month: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(rls.transaction())
        .await
        .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(model.into())
    }

    async fn update_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        settings: VenueSettings,
    ) -> Result<Option<Venue>, StoreError> {
        let row = venues::ActiveModel {
            id: Set(venue_id.into_inner()),
            name: Set(settings.name),
            slug: Set(settings.slug),
            maps_url: Set(settings.maps_url),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.update_owned(account_id, row).await
    }

    async fn set_logo_url(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        logo_url: Option<String>,
    ) -> Result<Option<Venue>, StoreError> {
        let row = venues::ActiveModel {
            id: Set(venue_id.into_inner()),
            logo_url: Set(logo_url),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.update_owned(account_id, row).await
    }

    async fn delete_venue(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<bool, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let result = venues::Entity::delete_many()
            .filter(venues::Column::Id.eq(venue_id.into_inner()))
            .filter(venues::Column::AccountId.eq(account_id.into_inner()))
            .exec(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
    ) -> Result<Vec<StaffMember>, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let models = staff_members::Entity::find()
            .filter(staff_members::Column::VenueId.eq(venue_id.into_inner()))
            .order_by_desc(staff_members::Column::TotalScans)
            .order_by_asc(staff_members::Column::CreatedAt)
            .all(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(models.into_iter().map(StaffMember::from).collect())
    }

    async fn insert_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        name: &str,
    ) -> Result<StaffMember, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let model = staff_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            venue_id: Set(venue_id.into_inner()),
            name: Set(name.to_string()),
            total_scans: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(rls.transaction())
        .await
        .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(model.into())
    }

    async fn delete_staff(
        &self,
        account_id: AccountId,
        venue_id: VenueId,
        staff_id: StaffMemberId,
    ) -> Result<bool, StoreError> {
        let rls = self.owner_scope(account_id).await?;
        let result = staff_members::Entity::delete_many()
            .filter(staff_members::Column::Id.eq(staff_id.into_inner()))
            .filter(staff_members::Column::VenueId.eq(venue_id.into_inner()))
            .exec(rls.transaction())
            .await
            .map_err(store_error)?;
        rls.commit().await.map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }
}
