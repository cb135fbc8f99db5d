//! Subscription billing: checkout, signed webhooks and plan reconciliation.
//!
//! Webhook events are verified, parsed into [`BillingEvent`], mapped to a pure
//! [`Transition`] and written through [`AccountStore`](crate::account::AccountStore).
//! Accounts are joined on the stored billing customer id first and on email only as
//! a fallback.

mod error;
mod event;
mod reconcile;
mod service;
mod signature;


pub use error::BillingError;
pub use event::{BillingEvent, ProviderStatus};
pub use reconcile::Transition;
pub use service::{
    BillingProvider, BillingService, BillingSettings, ReconcileOutcome, override_state,
};
pub use signature::{DEFAULT_TOLERANCE_SECS, sign_payload, verify_signature};
