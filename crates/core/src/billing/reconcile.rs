//! Pure state transitions applied to an account's plan state.

use super::event::{BillingEvent, ProviderStatus};
use crate::plan::{Plan, PlanState, SubscriptionStatus};

/// Effect of one event on the (plan, status) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Paid checkout: active on the purchased tier.
    Activate(Plan),
    /// Status change that keeps the current plan.
    SetStatus(SubscriptionStatus),
    /// Subscription ended: canceled and free.
    Cancel,
    /// No change.
    None,
}

impl Transition {
    /// Maps an event to its transition.
    #[must_use]
    pub fn for_event(event: &BillingEvent) -> Self {
        match event {
            BillingEvent::CheckoutCompleted { plan, .. } => Self::Activate(*plan),
            BillingEvent::SubscriptionChanged { status, .. } => match status {
                ProviderStatus::Canceled => Self::Cancel,
                ProviderStatus::PastDue => Self::SetStatus(SubscriptionStatus::PastDue),
                ProviderStatus::Active => Self::SetStatus(SubscriptionStatus::Active),
                ProviderStatus::Other(_) => Self::None,
            },
            BillingEvent::PaymentFailed { .. } => Self::SetStatus(SubscriptionStatus::PastDue),
            BillingEvent::PaymentSucceeded { .. } => Self::SetStatus(SubscriptionStatus::Active),
            BillingEvent::Unhandled { .. } => Self::None,
        }
    }

    /// Applies the transition to the state read just before writing.
    #[must_use]
    pub const fn apply(self, current: PlanState) -> PlanState {
        match self {
            Self::Activate(plan) => PlanState::active(plan),
            Self::SetStatus(status) => current.with_status(status),
            Self::Cancel => PlanState::canceled(),
            Self::None => current,
        }
    }
}
