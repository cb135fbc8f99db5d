//! Row-Level Security (RLS) context for owner-scoped queries.
//!
//! Dashboard operations run inside a transaction that switches to the
//! `restoboost_tenant` role and sets `app.current_account_id`, so the policies
//! created by the RLS migration hide every row the account does not own.
//!
//! # Usage
//!
//! ```ignore
//! use restoboost_db::rls::RlsConnection;
//!
//! let rls = RlsConnection::new(&db, account_id).await?;
//! let venues = venues::Entity::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use restoboost_shared::types::AccountId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// Role the owner-scoped policies apply to.
pub const TENANT_ROLE: &str = "restoboost_tenant";

/// A transaction restricted to one account's rows.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction restricted to `account_id`.
    ///
    /// `SET LOCAL` scopes both the role and the setting to this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context
    /// cannot be set.
    pub async fn new(db: &DatabaseConnection, account_id: AccountId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&context_sql(account_id)).await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

/// `AccountId` is a UUID, so interpolation cannot inject SQL.
fn context_sql(account_id: AccountId) -> String {
    format!("SET LOCAL ROLE {TENANT_ROLE}; SET LOCAL app.current_account_id = '{account_id}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_context_sql_format() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            context_sql(AccountId::from_uuid(id)),
            "SET LOCAL ROLE restoboost_tenant; \
             SET LOCAL app.current_account_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
