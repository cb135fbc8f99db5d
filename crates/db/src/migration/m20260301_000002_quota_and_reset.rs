//! Venue quota trigger and the monthly scan reset function.
//!
//! The trigger is the authoritative venue-count check. It locks the owning
//! account row so concurrent inserts for one account are serialized.

use restoboost_core::plan::{ENTERPRISE_MAX_VENUES, STANDARD_MAX_VENUES};
use sea_orm_migration::prelude::*;

/// Prefix of the exception raised by the quota trigger.
pub const VENUE_QUOTA_MARKER: &str = "venue_quota_exceeded";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(&venue_quota_sql()).await?;
        db.execute_unprepared(RESET_MONTHLY_SCANS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

/// Limits are rendered from the plan policy constants.
fn venue_quota_sql() -> String {
    format!(
        r"
CREATE OR REPLACE FUNCTION enforce_venue_quota()
RETURNS TRIGGER
LANGUAGE plpgsql
SECURITY DEFINER
SET search_path = public
AS $$
DECLARE
    v_plan plan_type;
    v_limit INTEGER;
    v_count INTEGER;
BEGIN
    SELECT plan INTO v_plan FROM accounts WHERE id = NEW.account_id FOR UPDATE;

    v_limit := CASE v_plan WHEN 'enterprise' THEN {enterprise} ELSE {standard} END;

    SELECT COUNT(*) INTO v_count FROM venues WHERE account_id = NEW.account_id;

    IF v_count >= v_limit THEN
        RAISE EXCEPTION '{marker}: plan % allows % venue(s)', COALESCE(v_plan, 'free'), v_limit;
    END IF;

    RETURN NEW;
END;
$$;

CREATE TRIGGER trg_enforce_venue_quota
    BEFORE INSERT ON venues
    FOR EACH ROW EXECUTE FUNCTION enforce_venue_quota();
",
        enterprise = ENTERPRISE_MAX_VENUES,
        standard = STANDARD_MAX_VENUES,
        marker = VENUE_QUOTA_MARKER,
    )
}

const RESET_MONTHLY_SCANS_SQL: &str = r"
CREATE OR REPLACE FUNCTION reset_monthly_scans()
RETURNS BIGINT
LANGUAGE plpgsql
AS $$
DECLARE
    v_reset BIGINT;
BEGIN
    UPDATE venues SET scans_this_month = 0, updated_at = now()
    WHERE scans_this_month <> 0;
    GET DIAGNOSTICS v_reset = ROW_COUNT;
    RETURN v_reset;
END;
$$;
";

const DROP_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_enforce_venue_quota ON venues;
DROP FUNCTION IF EXISTS enforce_venue_quota();
DROP FUNCTION IF EXISTS reset_monthly_scans();
";
