//! Checkout, webhook reconciliation and administrative plan overrides.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use restoboost_shared::types::AccountId;
use restoboost_shared::{BillingConfig, CheckoutRequest, CheckoutSession, StripeClient, StripeError};
use serde::Serialize;

use super::error::BillingError;
use super::event::BillingEvent;
use super::reconcile::Transition;
use super::signature::verify_signature;
use crate::account::{Account, AccountStore};
use crate::plan::{Plan, PlanState, SubscriptionStatus};
use crate::task::{best_effort, critical};

/// The billing provider calls the core makes.
pub trait BillingProvider: Send + Sync {
    /// Creates a hosted checkout session.
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> impl std::future::Future<Output = Result<CheckoutSession, StripeError>> + Send;

    /// Resolves a customer's email. Deleted customers resolve to `None`.
    fn customer_email(
        &self,
        customer_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StripeError>> + Send;
}

impl BillingProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        Self::create_checkout_session(self, request).await
    }

    async fn customer_email(&self, customer_id: &str) -> Result<Option<String>, StripeError> {
        Self::customer_email(self, customer_id).await
    }
}

/// Billing settings the service needs.
#[derive(Debug, Clone)]
pub struct BillingSettings {
    /// Webhook signing secret.
    pub webhook_secret: String,
    /// Accepted clock skew for signatures, in seconds.
    pub signature_tolerance_secs: i64,
    /// Price that buys the enterprise tier. Every other price buys pro.
    pub enterprise_price_id: String,
    /// Public site URL for success and cancel redirects.
    pub public_url: String,
}

impl BillingSettings {
    /// Builds settings from configuration.
    #[must_use]
    pub fn from_config(billing: &BillingConfig, public_url: &str) -> Self {
        Self {
            webhook_secret: billing.webhook_secret.clone(),
            signature_tolerance_secs: billing.signature_tolerance_secs,
            enterprise_price_id: billing.enterprise_price_id.clone(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Result of handling one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Account state written.
    Applied {
        /// Account updated.
        account_id: AccountId,
        /// State after the write.
        state: PlanState,
    },
    /// No account matched the event.
    Unmatched,
    /// Event type or status has no effect.
    Ignored,
}

/// Billing lifecycle handling.
pub struct BillingService<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    settings: BillingSettings,
}

impl<S: AccountStore, P: BillingProvider> BillingService<S, P> {
    /// Create a new billing service.
    #[must_use]
    pub const fn new(store: Arc<S>, provider: Arc<P>, settings: BillingSettings) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Tier a price buys.
    #[must_use]
    pub fn plan_for_price(&self, price_id: &str) -> Plan {
        if !self.settings.enterprise_price_id.is_empty()
            && price_id == self.settings.enterprise_price_id
        {
            Plan::Enterprise
        } else {
            Plan::Pro
        }
    }

    /// Starts a hosted checkout for `account` and returns the redirect URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is blank or the provider call fails.
    pub async fn start_checkout(
        &self,
        account: &Account,
        price_id: &str,
    ) -> Result<String, BillingError> {
        let price_id = price_id.trim();
        if price_id.is_empty() {
            return Err(BillingError::MissingPriceId);
        }

        let plan = self.plan_for_price(price_id);
        let account_id = account.id.to_string();
        let success_url = format!("{}/dashboard/billing?success=true", self.settings.public_url);
        let cancel_url = format!("{}/dashboard/billing?canceled=true", self.settings.public_url);
        let customer_email = Some(account.email.as_str()).filter(|e| !e.is_empty());

        let session = self
            .provider
            .create_checkout_session(&CheckoutRequest {
                price_id,
                customer_email,
                account_id: &account_id,
                plan: plan.as_str(),
                success_url: &success_url,
                cancel_url: &cancel_url,
            })
            .await?;

        tracing::info!(account_id = %account.id, plan = %plan, session_id = %session.id, "checkout session created");
        session.url.ok_or(BillingError::Provider(StripeError::MissingField("url")))
    }

    /// Verifies, parses and applies one webhook delivery.
    ///
    /// Each event is an upsert of the fields it describes, computed from the state
    /// read just before the write. Concurrent deliveries for one account race and
    /// the last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::SignatureInvalid`] before any processing if the
    /// signature does not verify, or an error if the body is malformed or a
    /// lookup or write fails.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, BillingError> {
        let Some(signature) = signature else {
            tracing::warn!("billing webhook without signature header");
            return Err(BillingError::SignatureInvalid("missing signature header"));
        };
        verify_signature(
            payload,
            signature,
            &self.settings.webhook_secret,
            self.settings.signature_tolerance_secs,
            now,
        )
        .inspect_err(|e| tracing::warn!(reason = %e, "billing webhook rejected"))?;

        let event = BillingEvent::parse(payload)?;
        self.reconcile(&event).await
    }

    /// Applies an already verified event.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup or the account write fails.
    pub async fn reconcile(&self, event: &BillingEvent) -> Result<ReconcileOutcome, BillingError> {
        let transition = Transition::for_event(event);
        if transition == Transition::None {
            tracing::info!(?event, "billing event ignored");
            return Ok(ReconcileOutcome::Ignored);
        }

        let Some(account) = self.resolve_account(event).await? else {
            tracing::warn!(customer_id = ?event.customer_id(), "billing event matches no account");
            return Ok(ReconcileOutcome::Unmatched);
        };

        if let BillingEvent::CheckoutCompleted {
            customer_id: Some(customer_id),
            ..
        } = event
            && account.billing_customer_id.as_deref() != Some(customer_id.as_str())
        {
            best_effort("link_customer", self.store.link_customer(account.id, customer_id))
                .run()
                .await;
        }

        let state = transition.apply(account.plan_state);
        let saved = critical("save_plan_state", self.store.save_plan_state(account.id, state))
            .run()
            .await?;
        if saved.is_none() {
            tracing::warn!(account_id = %account.id, "account deleted before billing update");
            return Ok(ReconcileOutcome::Unmatched);
        }

        tracing::info!(
            account_id = %account.id,
            plan = %state.plan(),
            status = %state.status(),
            "subscription reconciled"
        );
        Ok(ReconcileOutcome::Applied {
            account_id: account.id,
            state,
        })
    }

    async fn resolve_account(&self, event: &BillingEvent) -> Result<Option<Account>, BillingError> {
        if let BillingEvent::CheckoutCompleted {
            account_id,
            customer_email,
            ..
        } = event
        {
            if let Some(id) = account_id
                && let Some(account) = self.store.find_account(*id).await?
            {
                return Ok(Some(account));
            }
            return match customer_email {
                Some(email) => Ok(self.store.find_by_email(email).await?),
                None => Ok(None),
            };
        }

        let Some(customer_id) = event.customer_id() else {
            return Ok(None);
        };
        if let Some(account) = self.store.find_by_customer_id(customer_id).await? {
            return Ok(Some(account));
        }

        match self.provider.customer_email(customer_id).await? {
            Some(email) => {
                tracing::debug!(customer_id, "falling back to email join");
                Ok(self.store.find_by_email(&email).await?)
            }
            None => Ok(None),
        }
    }

    /// Sets an account's plan by email on behalf of an administrator.
    ///
    /// Without a status, the free plan gets status free and paid plans get active.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::AccountNotFound`] if no account has this email.
    pub async fn override_plan(
        &self,
        email: &str,
        plan: Plan,
        status: Option<SubscriptionStatus>,
    ) -> Result<Account, BillingError> {
        let email = email.trim();
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| BillingError::AccountNotFound(email.to_string()))?;

        let state = override_state(plan, status);
        let updated = self
            .store
            .save_plan_state(account.id, state)
            .await?
            .ok_or_else(|| BillingError::AccountNotFound(email.to_string()))?;

        tracing::info!(
            account_id = %account.id,
            plan = %state.plan(),
            status = %state.status(),
            "plan overridden by administrator"
        );
        Ok(updated)
    }
}

/// State an administrator override produces.
#[must_use]
pub const fn override_state(plan: Plan, status: Option<SubscriptionStatus>) -> PlanState {
    let status = match (status, plan) {
        (Some(status), _) => status,
        (None, Plan::Free) => SubscriptionStatus::Free,
        (None, Plan::Pro | Plan::Enterprise) => SubscriptionStatus::Active,
    };
    PlanState::new(plan, status)
}
