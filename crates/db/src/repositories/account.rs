//! Account persistence.

use chrono::Utc;
use restoboost_core::StoreError;
use restoboost_core::account::{Account, AccountStore};
use restoboost_core::plan::PlanState;
use restoboost_shared::types::AccountId;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};

use super::{PgStore, plan_to_db, status_to_db, store_error};
use crate::entities::{accounts, sea_orm_active_enums as db_enums};

impl AccountStore for PgStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Account::from))
    }

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::BillingCustomerId.eq(customer_id))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(accounts::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Account::from))
    }

    async fn upsert_account(&self, id: AccountId, email: &str) -> Result<Account, StoreError> {
        let now = Utc::now().into();
        let row = accounts::ActiveModel {
            id: Set(id.into_inner()),
            email: Set(email.to_string()),
            plan: Set(db_enums::PlanType::Free),
            subscription_status: Set(db_enums::SubscriptionStatus::Free),
            billing_customer_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        accounts::Entity::insert(row)
            .on_conflict(OnConflict::column(accounts::Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        self.find_account(id)
            .await?
            .ok_or_else(|| StoreError::unavailable("account vanished after upsert"))
    }

    async fn save_plan_state(
        &self,
        id: AccountId,
        state: PlanState,
    ) -> Result<Option<Account>, StoreError> {
        let result = accounts::ActiveModel {
            id: Set(id.into_inner()),
            plan: Set(plan_to_db(state.plan())),
            subscription_status: Set(status_to_db(state.status())),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await;

        match result {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    async fn link_customer(&self, id: AccountId, customer_id: &str) -> Result<(), StoreError> {
        accounts::Entity::update_many()
            .col_expr(accounts::Column::BillingCustomerId, Expr::value(customer_id))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
