//! Billing errors.

use restoboost_shared::{AppError, StripeError};
use thiserror::Error;

use crate::store::StoreError;

/// Checkout, webhook and plan override errors.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Webhook signature missing, malformed, stale or wrong.
    #[error("{0}")]
    SignatureInvalid(&'static str),

    /// Webhook body is not a billing event.
    #[error("malformed billing event: {0}")]
    MalformedEvent(String),

    /// Checkout requested without a price.
    #[error("price id is required")]
    MissingPriceId,

    /// No account matches the override target.
    #[error("no account with email {0}")]
    AccountNotFound(String),

    /// Billing provider call failed.
    #[error(transparent)]
    Provider(#[from] StripeError),

    /// Account read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::SignatureInvalid(_) => Self::SignatureInvalid(err.to_string()),
            BillingError::MalformedEvent(_) | BillingError::MissingPriceId => {
                Self::Validation(err.to_string())
            }
            BillingError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            BillingError::Provider(e) => Self::UpstreamUnavailable(e.to_string()),
            BillingError::Store(e) => e.into(),
        }
    }
}
