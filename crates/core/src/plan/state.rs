//! The (plan, status) pair stored on an account.

use serde::{Deserialize, Serialize};

use super::Plan;

/// Billing status of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Never subscribed.
    #[default]
    Free,
    /// Paying.
    Active,
    /// Subscription ended.
    Canceled,
    /// Last payment failed. Keeps the paid plan until the provider cancels.
    PastDue,
}

impl SubscriptionStatus {
    /// Returns the stored name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::PastDue => "past_due",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "active" => Ok(Self::Active),
            "canceled" => Ok(Self::Canceled),
            "past_due" => Ok(Self::PastDue),
            other => Err(format!("unknown subscription status '{other}'")),
        }
    }
}

/// Plan and status of an account, kept consistent.
///
/// Canceled and free statuses always carry the free plan. This is the only way the
/// pair is built, so reconciliation and admin overrides cannot store a contradiction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanState {
    plan: Plan,
    status: SubscriptionStatus,
}

impl PlanState {
    /// Builds a state, downgrading to free when the status requires it.
    #[must_use]
    pub const fn new(plan: Plan, status: SubscriptionStatus) -> Self {
        let plan = match status {
            SubscriptionStatus::Canceled | SubscriptionStatus::Free => Plan::Free,
            SubscriptionStatus::Active | SubscriptionStatus::PastDue => plan,
        };
        Self { plan, status }
    }

    /// A paying subscription on `plan`.
    #[must_use]
    pub const fn active(plan: Plan) -> Self {
        Self::new(plan, SubscriptionStatus::Active)
    }

    /// An ended subscription.
    #[must_use]
    pub const fn canceled() -> Self {
        Self::new(Plan::Free, SubscriptionStatus::Canceled)
    }

    /// Effective plan.
    #[must_use]
    pub const fn plan(self) -> Plan {
        self.plan
    }

    /// Billing status.
    #[must_use]
    pub const fn status(self) -> SubscriptionStatus {
        self.status
    }

    /// Same plan with a new status.
    #[must_use]
    pub const fn with_status(self, status: SubscriptionStatus) -> Self {
        Self::new(self.plan, status)
    }
}
