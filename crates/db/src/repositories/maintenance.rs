//! Scheduled maintenance.

use restoboost_core::StoreError;
use sea_orm::{ConnectionTrait, DbBackend, Statement};

use super::{PgStore, store_error};

impl PgStore {
    /// Zeroes every venue's monthly scan counter. Returns the number of venues reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset function fails.
    pub async fn reset_monthly_scans(&self) -> Result<u64, StoreError> {
        let row = self
            .db
            .query_one(Statement::from_string(
                DbBackend::Postgres,
                "SELECT reset_monthly_scans() AS reset",
            ))
            .await
            .map_err(store_error)?;

        let reset = match row {
            Some(row) => row.try_get::<i64>("", "reset").map_err(store_error)?,
            None => 0,
        };
        let reset = u64::try_from(reset).unwrap_or_default();
        tracing::info!(venues = reset, "monthly scan counters reset");
        Ok(reset)
    }

    /// Checks that the database answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(store_error)
    }
}
