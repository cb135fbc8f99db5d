//! Initial database migration.
//!
//! Creates enums, tables and indexes for accounts, venues, staff, the scan log
//! and captured feedback.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(VENUES_SQL).await?;
        db.execute_unprepared(STAFF_MEMBERS_SQL).await?;
        db.execute_unprepared(SCAN_EVENTS_SQL).await?;
        db.execute_unprepared(FEEDBACK_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE plan_type AS ENUM ('free', 'pro', 'enterprise');

CREATE TYPE subscription_status AS ENUM ('free', 'active', 'canceled', 'past_due');

CREATE TYPE scan_event_kind AS ENUM ('scan', 'positive_redirect', 'negative_feedback');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    plan plan_type NOT NULL DEFAULT 'free',
    subscription_status subscription_status NOT NULL DEFAULT 'free',
    billing_customer_id VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- free and canceled subscriptions never carry a paid plan
    CONSTRAINT chk_unpaid_plan_is_free CHECK (
        subscription_status NOT IN ('free', 'canceled') OR plan = 'free'
    )
);

CREATE INDEX idx_accounts_email ON accounts (lower(email));
CREATE INDEX idx_accounts_billing_customer ON accounts (billing_customer_id)
    WHERE billing_customer_id IS NOT NULL;
";

const VENUES_SQL: &str = r"
CREATE TABLE venues (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    slug VARCHAR(100) NOT NULL,
    maps_url TEXT,
    logo_url TEXT,
    scans_this_month INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT venues_slug_key UNIQUE (slug),
    CONSTRAINT chk_slug_format CHECK (slug ~ '^[a-z0-9]+(-[a-z0-9]+)*$'),
    CONSTRAINT chk_scans_non_negative CHECK (scans_this_month >= 0)
);

CREATE INDEX idx_venues_account ON venues(account_id);
";

const STAFF_MEMBERS_SQL: &str = r"
CREATE TABLE staff_members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    venue_id UUID NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    total_scans INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_staff_members_venue ON staff_members(venue_id);
";

const SCAN_EVENTS_SQL: &str = r"
CREATE TABLE scan_events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    venue_id UUID NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    kind scan_event_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_scan_events_venue_time ON scan_events(venue_id, created_at);
";

const FEEDBACK_SQL: &str = r"
CREATE TABLE feedback (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    venue_id UUID NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    rating SMALLINT NOT NULL,
    comment TEXT,
    contact_email VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_rating_range CHECK (rating BETWEEN 1 AND 5)
);

CREATE INDEX idx_feedback_venue_time ON feedback(venue_id, created_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS feedback CASCADE;
DROP TABLE IF EXISTS scan_events CASCADE;
DROP TABLE IF EXISTS staff_members CASCADE;
DROP TABLE IF EXISTS venues CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS scan_event_kind CASCADE;
DROP TYPE IF EXISTS subscription_status CASCADE;
DROP TYPE IF EXISTS plan_type CASCADE;
";
