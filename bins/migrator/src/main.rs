//! Database migration runner for RestoBoost.
//!
//! Reads `DATABASE_URL` (or `-u <url>`). The connecting role owns the schema and
//! becomes a member of the restricted tenant role the RLS policies target.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use restoboost_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing.
    cli::run_cli(Migrator).await;
}
