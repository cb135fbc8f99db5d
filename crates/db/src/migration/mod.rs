//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_initial;
mod m20260301_000002_quota_and_reset;
mod m20260301_000003_row_level_security;

pub use m20260301_000002_quota_and_reset::VENUE_QUOTA_MARKER;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_initial::Migration),
            Box::new(m20260301_000002_quota_and_reset::Migration),
            Box::new(m20260301_000003_row_level_security::Migration),
        ]
    }
}
