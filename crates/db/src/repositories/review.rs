//! Scan and rating persistence. Guests are anonymous, so every call is elevated.

use chrono::Utc;
use restoboost_core::StoreError;
use restoboost_core::review::{FeedbackRecord, NewFeedback, ReviewStore, ScanEventKind};
use restoboost_core::venue::Venue;
use restoboost_shared::types::{StaffMemberId, VenueId};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{PgStore, feedback_from_db, kind_to_db, store_error};
use crate::entities::{feedback, scan_events, staff_members, venues};

impl ReviewStore for PgStore {
    async fn find_venue_by_slug(&self, slug: &str) -> Result<Option<Venue>, StoreError> {
        let model = venues::Entity::find()
            .filter(venues::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Venue::from))
    }

    async fn find_venue(&self, id: VenueId) -> Result<Option<Venue>, StoreError> {
        let model = venues::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Venue::from))
    }

    async fn increment_scans(&self, venue_id: VenueId) -> Result<u32, StoreError> {
        let updated = venues::Entity::update_many()
            .col_expr(
                venues::Column::ScansThisMonth,
                Expr::col(venues::Column::ScansThisMonth).add(1),
            )
            .filter(venues::Column::Id.eq(venue_id.into_inner()))
            .exec_with_returning(&self.db)
            .await
            .map_err(store_error)?;

        updated
            .into_iter()
            .next()
            .map(|model| Venue::from(model).scans_this_month)
            .ok_or_else(|| StoreError::unavailable(format!("venue {venue_id} vanished")))
    }

    async fn record_event(
        &self,
        venue_id: VenueId,
        kind: ScanEventKind,
    ) -> Result<(), StoreError> {
        let row = scan_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            venue_id: Set(venue_id.into_inner()),
            kind: Set(kind_to_db(kind)),
            created_at: Set(Utc::now().into()),
        };
        scan_events::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn increment_staff_scans(
        &self,
        staff_id: StaffMemberId,
        venue_id: VenueId,
    ) -> Result<bool, StoreError> {
        let result = staff_members::Entity::update_many()
            .col_expr(
                staff_members::Column::TotalScans,
                Expr::col(staff_members::Column::TotalScans).add(1),
            )
            .filter(staff_members::Column::Id.eq(staff_id.into_inner()))
            .filter(staff_members::Column::VenueId.eq(venue_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_feedback(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let model = feedback::ActiveModel {
            id: Set(Uuid::new_v4()),
            venue_id: Set(new.venue_id.into_inner()),
            rating: Set(i16::from(new.rating.value())),
            comment: Set(new.comment),
            contact_email: Set(new.contact_email),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(store_error)?;
        feedback_from_db(model)
    }
}
