//! Store implementations backed by PostgreSQL.
//!
//! [`PgStore`] implements every persistence trait of `restoboost-core`.
//! Owner-scoped venue and staff operations run through [`RlsConnection`];
//! everything else uses the pool directly with elevated access.
//!
//! [`RlsConnection`]: crate::rls::RlsConnection

mod account;
mod analytics;
mod maintenance;
mod review;
mod venue;

use chrono::Utc;
use restoboost_core::StoreError;
use restoboost_core::account::Account;
use restoboost_core::plan::{Plan, PlanState, SubscriptionStatus};
use restoboost_core::review::{FeedbackRecord, Rating, ScanEventKind};
use restoboost_core::venue::{StaffMember, Venue};
use restoboost_shared::types::{AccountId, FeedbackId, StaffMemberId, VenueId};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};

use crate::entities::{accounts, feedback, sea_orm_active_enums as db_enums, staff_members, venues};
use crate::migration::VENUE_QUOTA_MARKER;

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    /// Creates a new store over a connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Maps a driver error onto the core taxonomy.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        return StoreError::UniqueViolation(msg);
    }
    let msg = err.to_string();
    if msg.contains(VENUE_QUOTA_MARKER) {
        return StoreError::QuotaViolation(msg);
    }
    tracing::error!(error = %msg, "database error");
    StoreError::Unavailable(msg)
}

fn count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

pub(crate) const fn plan_from_db(plan: db_enums::PlanType) -> Plan {
    match plan {
        db_enums::PlanType::Free => Plan::Free,
        db_enums::PlanType::Pro => Plan::Pro,
        db_enums::PlanType::Enterprise => Plan::Enterprise,
    }
}

pub(crate) const fn plan_to_db(plan: Plan) -> db_enums::PlanType {
    match plan {
        Plan::Free => db_enums::PlanType::Free,
        Plan::Pro => db_enums::PlanType::Pro,
        Plan::Enterprise => db_enums::PlanType::Enterprise,
    }
}

pub(crate) const fn status_from_db(status: db_enums::SubscriptionStatus) -> SubscriptionStatus {
    match status {
        db_enums::SubscriptionStatus::Free => SubscriptionStatus::Free,
        db_enums::SubscriptionStatus::Active => SubscriptionStatus::Active,
        db_enums::SubscriptionStatus::Canceled => SubscriptionStatus::Canceled,
        db_enums::SubscriptionStatus::PastDue => SubscriptionStatus::PastDue,
    }
}

pub(crate) const fn status_to_db(status: SubscriptionStatus) -> db_enums::SubscriptionStatus {
    match status {
        SubscriptionStatus::Free => db_enums::SubscriptionStatus::Free,
        SubscriptionStatus::Active => db_enums::SubscriptionStatus::Active,
        SubscriptionStatus::Canceled => db_enums::SubscriptionStatus::Canceled,
        SubscriptionStatus::PastDue => db_enums::SubscriptionStatus::PastDue,
    }
}

pub(crate) const fn kind_from_db(kind: db_enums::ScanEventKind) -> ScanEventKind {
    match kind {
        db_enums::ScanEventKind::Scan => ScanEventKind::Scan,
        db_enums::ScanEventKind::PositiveRedirect => ScanEventKind::PositiveRedirect,
        db_enums::ScanEventKind::NegativeFeedback => ScanEventKind::NegativeFeedback,
    }
}

pub(crate) const fn kind_to_db(kind: ScanEventKind) -> db_enums::ScanEventKind {
    match kind {
        ScanEventKind::Scan => db_enums::ScanEventKind::Scan,
        ScanEventKind::PositiveRedirect => db_enums::ScanEventKind::PositiveRedirect,
        ScanEventKind::NegativeFeedback => db_enums::ScanEventKind::NegativeFeedback,
    }
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            email: model.email,
            plan_state: PlanState::new(
                plan_from_db(model.plan),
                status_from_db(model.subscription_status),
            ),
            billing_customer_id: model.billing_customer_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<venues::Model> for Venue {
    fn from(model: venues::Model) -> Self {
        Self {
            id: VenueId::from_uuid(model.id),
            account_id: AccountId::from_uuid(model.account_id),
            name: model.name,
            slug: model.slug,
            maps_url: model.maps_url,
            logo_url: model.logo_url,
            scans_this_month: count(model.scans_this_month),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<staff_members::Model> for StaffMember {
    fn from(model: staff_members::Model) -> Self {
        Self {
            id: StaffMemberId::from_uuid(model.id),
            venue_id: VenueId::from_uuid(model.venue_id),
            name: model.name,
            total_scans: count(model.total_scans),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

pub(crate) fn feedback_from_db(model: feedback::Model) -> Result<FeedbackRecord, StoreError> {
    let rating = Rating::new(i64::from(model.rating))
        .map_err(|e| StoreError::unavailable(format!("stored feedback {}: {e}", model.id)))?;
    Ok(FeedbackRecord {
        id: FeedbackId::from_uuid(model.id),
        venue_id: VenueId::from_uuid(model.venue_id),
        rating,
        comment: model.comment,
        contact_email: model.contact_email,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
