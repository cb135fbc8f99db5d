//! Accounts: the billing identity behind every venue.

use chrono::{DateTime, Utc};
use restoboost_shared::types::AccountId;
use serde::Serialize;

use crate::plan::{Plan, PlanState};
use crate::store::StoreError;

/// A tenant's billing identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account ID, shared with the auth provider's user id.
    pub id: AccountId,
    /// Owner email.
    pub email: String,
    /// Plan and subscription status.
    pub plan_state: PlanState,
    /// Billing provider customer id, known after the first checkout.
    pub billing_customer_id: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Effective plan.
    #[must_use]
    pub const fn plan(&self) -> Plan {
        self.plan_state.plan()
    }
}

/// Persistence for accounts.
///
/// Lookups by customer id or email run with elevated access since billing events
/// arrive without a session.
pub trait AccountStore: Send + Sync {
    /// Find an account by ID.
    fn find_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Find the account linked to a billing customer.
    fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Find an account by email, case-insensitively.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Insert the account if missing. An existing row keeps its plan state.
    fn upsert_account(
        &self,
        id: AccountId,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Account, StoreError>> + Send;

    /// Overwrite the plan state. Returns `None` if the account does not exist.
    fn save_plan_state(
        &self,
        id: AccountId,
        state: PlanState,
    ) -> impl std::future::Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Remember the billing customer id for later joins.
    fn link_customer(
        &self,
        id: AccountId,
        customer_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
