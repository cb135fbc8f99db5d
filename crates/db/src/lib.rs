//! Database layer with `SeaORM` entities, migrations and store implementations.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations, including the venue quota trigger and RLS policies
//! - [`PgStore`], implementing every persistence trait of `restoboost-core`

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::PgStore;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
