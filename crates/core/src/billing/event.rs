//! Billing provider events, reduced to what reconciliation needs.

use std::collections::HashMap;

use restoboost_shared::types::AccountId;
use serde::Deserialize;

use super::error::BillingError;
use crate::plan::Plan;

/// Subscription status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    /// `active` or `trialing`.
    Active,
    /// `past_due`.
    PastDue,
    /// `canceled`, `unpaid` or `incomplete_expired`.
    Canceled,
    /// Anything else (`incomplete`, `paused`, …). Leaves the account untouched.
    Other(String),
}

impl ProviderStatus {
    fn parse(status: &str) -> Self {
        match status {
            "active" | "trialing" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" | "unpaid" | "incomplete_expired" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A verified billing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// `checkout.session.completed`.
    CheckoutCompleted {
        /// Account from `metadata.account_id`.
        account_id: Option<AccountId>,
        /// Tier from `metadata.plan`, pro when absent.
        plan: Plan,
        /// Billing customer created by the checkout.
        customer_id: Option<String>,
        /// Email the customer paid with.
        customer_email: Option<String>,
    },
    /// `customer.subscription.updated` or `customer.subscription.deleted`.
    SubscriptionChanged {
        /// Billing customer.
        customer_id: String,
        /// Provider status. Deleted subscriptions are always canceled.
        status: ProviderStatus,
    },
    /// `invoice.payment_failed`.
    PaymentFailed {
        /// Billing customer.
        customer_id: String,
    },
    /// `invoice.payment_succeeded`.
    PaymentSucceeded {
        /// Billing customer.
        customer_id: String,
    },
    /// Any other event type. Acknowledged and dropped.
    Unhandled {
        /// Provider event type.
        event_type: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expandable {
    Id(String),
    Object { id: String },
}

impl Expandable {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutObject {
    #[serde(default)]
    metadata: HashMap<String, String>,
    customer: Option<Expandable>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct CustomerScoped {
    customer: Expandable,
    status: Option<String>,
}

fn object<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, BillingError> {
    serde_json::from_value(value).map_err(|e| BillingError::MalformedEvent(e.to_string()))
}

impl BillingEvent {
    /// Parses a webhook body. Call only after the signature was verified.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::MalformedEvent`] if the body or a handled object does
    /// not have the expected shape.
    pub fn parse(payload: &[u8]) -> Result<Self, BillingError> {
        let raw: RawEvent =
            serde_json::from_slice(payload).map_err(|e| BillingError::MalformedEvent(e.to_string()))?;

        let event = match raw.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutObject = object(raw.data.object)?;
                let plan = match session.metadata.get("plan").map(String::as_str) {
                    Some("enterprise") => Plan::Enterprise,
                    _ => Plan::Pro,
                };
                let account_id = session
                    .metadata
                    .get("account_id")
                    .and_then(|id| id.parse::<AccountId>().ok());
                let customer_email = session
                    .customer_details
                    .and_then(|d| d.email)
                    .or(session.customer_email);
                Self::CheckoutCompleted {
                    account_id,
                    plan,
                    customer_id: session.customer.map(Expandable::into_id),
                    customer_email,
                }
            }
            kind @ ("customer.subscription.updated" | "customer.subscription.deleted") => {
                let subscription: CustomerScoped = object(raw.data.object)?;
                let status = if kind == "customer.subscription.deleted" {
                    ProviderStatus::Canceled
                } else {
                    ProviderStatus::parse(subscription.status.as_deref().unwrap_or_default())
                };
                Self::SubscriptionChanged {
                    customer_id: subscription.customer.into_id(),
                    status,
                }
            }
            "invoice.payment_failed" => Self::PaymentFailed {
                customer_id: object::<CustomerScoped>(raw.data.object)?.customer.into_id(),
            },
            "invoice.payment_succeeded" => Self::PaymentSucceeded {
                customer_id: object::<CustomerScoped>(raw.data.object)?.customer.into_id(),
            },
            _ => Self::Unhandled {
                event_type: raw.event_type,
            },
        };
        Ok(event)
    }

    /// Billing customer the event is about, for events joined by customer.
    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::CheckoutCompleted { customer_id, .. } => customer_id.as_deref(),
            Self::SubscriptionChanged { customer_id, .. }
            | Self::PaymentFailed { customer_id }
            | Self::PaymentSucceeded { customer_id } => Some(customer_id),
            Self::Unhandled { .. } => None,
        }
    }
}
