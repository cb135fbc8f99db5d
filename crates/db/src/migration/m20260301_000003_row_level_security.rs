//! Row-level security for owner-scoped access.
//!
//! Dashboard queries switch to the `restoboost_tenant` role and set
//! `app.current_account_id` (see `rls.rs`). Policies only target that role, so
//! the connecting role keeps elevated access for the anonymous review flow,
//! billing webhooks and the scheduled reset.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(TENANT_ROLE_SQL).await?;
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_RLS_SQL).await?;
        Ok(())
    }
}

const TENANT_ROLE_SQL: &str = r"
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'restoboost_tenant') THEN
        CREATE ROLE restoboost_tenant NOLOGIN;
    END IF;
END
$$;

GRANT restoboost_tenant TO CURRENT_USER;
GRANT SELECT, INSERT, UPDATE, DELETE
    ON accounts, venues, staff_members, scan_events, feedback
    TO restoboost_tenant;
";

const RLS_SQL: &str = r"
ALTER TABLE accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE venues ENABLE ROW LEVEL SECURITY;
ALTER TABLE staff_members ENABLE ROW LEVEL SECURITY;
ALTER TABLE scan_events ENABLE ROW LEVEL SECURITY;
ALTER TABLE feedback ENABLE ROW LEVEL SECURITY;

CREATE POLICY owner_isolation ON accounts TO restoboost_tenant
    USING (id = current_setting('app.current_account_id', true)::UUID);

CREATE POLICY owner_isolation ON venues TO restoboost_tenant
    USING (account_id = current_setting('app.current_account_id', true)::UUID)
    WITH CHECK (account_id = current_setting('app.current_account_id', true)::UUID);

CREATE POLICY owner_isolation ON staff_members TO restoboost_tenant
    USING (venue_id IN (
        SELECT id FROM venues
        WHERE account_id = current_setting('app.current_account_id', true)::UUID
    ));

CREATE POLICY owner_isolation ON scan_events TO restoboost_tenant
    USING (venue_id IN (
        SELECT id FROM venues
        WHERE account_id = current_setting('app.current_account_id', true)::UUID
    ));

CREATE POLICY owner_isolation ON feedback TO restoboost_tenant
    USING (venue_id IN (
        SELECT id FROM venues
        WHERE account_id = current_setting('app.current_account_id', true)::UUID
    ));
";

const DROP_RLS_SQL: &str = r"
DROP POLICY IF EXISTS owner_isolation ON feedback;
DROP POLICY IF EXISTS owner_isolation ON scan_events;
DROP POLICY IF EXISTS owner_isolation ON staff_members;
DROP POLICY IF EXISTS owner_isolation ON venues;
DROP POLICY IF EXISTS owner_isolation ON accounts;

ALTER TABLE feedback DISABLE ROW LEVEL SECURITY;
ALTER TABLE scan_events DISABLE ROW LEVEL SECURITY;
ALTER TABLE staff_members DISABLE ROW LEVEL SECURITY;
ALTER TABLE venues DISABLE ROW LEVEL SECURITY;
ALTER TABLE accounts DISABLE ROW LEVEL SECURITY;

REVOKE ALL ON accounts, venues, staff_members, scan_events, feedback FROM restoboost_tenant;
";
