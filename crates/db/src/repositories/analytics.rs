//! Reporting queries over the scan log and feedback.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use restoboost_core::StoreError;
use restoboost_core::analytics::{AnalyticsStore, DailyBucket, EventCounts};
use restoboost_core::review::{FeedbackRecord, ScanEventKind};
use restoboost_shared::types::{PageRequest, VenueId};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::{PgStore, feedback_from_db, kind_from_db, store_error};
use crate::entities::{feedback, scan_events, sea_orm_active_enums as db_enums};

fn set_count(counts: &mut EventCounts, kind: ScanEventKind, n: i64) {
    let n = u64::try_from(n).unwrap_or_default();
    match kind {
        ScanEventKind::Scan => counts.scans = n,
        ScanEventKind::PositiveRedirect => counts.positive_redirects = n,
        ScanEventKind::NegativeFeedback => counts.negative_feedback = n,
    }
}

impl AnalyticsStore for PgStore {
    async fn count_events(&self, venue_id: VenueId) -> Result<EventCounts, StoreError> {
        let rows: Vec<(db_enums::ScanEventKind, i64)> = scan_events::Entity::find()
            .select_only()
            .column(scan_events::Column::Kind)
            .column_as(Expr::col(scan_events::Column::Id).count(), "count")
            .filter(scan_events::Column::VenueId.eq(venue_id.into_inner()))
            .group_by(scan_events::Column::Kind)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let mut counts = EventCounts::default();
        for (kind, n) in rows {
            set_count(&mut counts, kind_from_db(kind), n);
        }
        Ok(counts)
    }

    async fn daily_counts(
        &self,
        venue_id: VenueId,
        since: Option<DateTime<Utc>>,
        tz: Tz,
    ) -> Result<Vec<DailyBucket>, StoreError> {
        // `Tz::name` is an IANA identifier from a closed set, never request text.
        let day = Expr::cust(format!(
            "(\"created_at\" AT TIME ZONE '{}')::date",
            tz.name()
        ));

        let mut query = scan_events::Entity::find()
            .select_only()
            .column_as(day.clone(), "day")
            .column(scan_events::Column::Kind)
            .column_as(Expr::col(scan_events::Column::Id).count(), "count")
            .filter(scan_events::Column::VenueId.eq(venue_id.into_inner()));
        if let Some(since) = since {
            query = query.filter(scan_events::Column::CreatedAt.gte(since));
        }

        let rows: Vec<(NaiveDate, db_enums::ScanEventKind, i64)> = query
            .group_by(day.clone())
            .group_by(scan_events::Column::Kind)
            .order_by_asc(day)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let mut daily: Vec<DailyBucket> = Vec::new();
        for (date, kind, n) in rows {
            if daily.last().is_none_or(|bucket| bucket.date != date) {
                daily.push(DailyBucket {
                    date,
                    counts: EventCounts::default(),
                });
            }
            if let Some(bucket) = daily.last_mut() {
                set_count(&mut bucket.counts, kind_from_db(kind), n);
            }
        }
        Ok(daily)
    }

    async fn list_feedback(
        &self,
        venue_id: VenueId,
        page: &PageRequest,
    ) -> Result<(Vec<FeedbackRecord>, u64), StoreError> {
        let paginator = feedback::Entity::find()
            .filter(feedback::Column::VenueId.eq(venue_id.into_inner()))
            .order_by_desc(feedback::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await.map_err(store_error)?;
        let models = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await
            .map_err(store_error)?;

        let records = models
            .into_iter()
            .map(feedback_from_db)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }
}
