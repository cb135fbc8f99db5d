//! Critical and best-effort operations.
//!
//! Every side effect of scan intake and feedback capture is wrapped in one of the two
//! so the failure policy is visible at the call site. A critical failure is logged and
//! returned to the caller. A best-effort failure is logged and swallowed.

use std::fmt::Display;
use std::future::Future;

/// An operation whose failure fails the request.
#[must_use = "an operation does nothing until `run` is awaited"]
pub struct Critical<F> {
    label: &'static str,
    fut: F,
}

/// An operation whose failure is logged and ignored.
#[must_use = "an operation does nothing until `run` is awaited"]
pub struct BestEffort<F> {
    label: &'static str,
    fut: F,
}

/// Wraps an operation that must succeed.
pub const fn critical<F>(label: &'static str, fut: F) -> Critical<F> {
    Critical { label, fut }
}

/// Wraps an operation that may fail without affecting the caller.
pub const fn best_effort<F>(label: &'static str, fut: F) -> BestEffort<F> {
    BestEffort { label, fut }
}

impl<F, T, E> Critical<F>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    /// Runs the operation, propagating its error.
    ///
    /// # Errors
    ///
    /// Returns the operation's error unchanged.
    pub async fn run(self) -> Result<T, E> {
        self.fut.await.inspect_err(|e| {
            tracing::error!(operation = self.label, error = %e, "critical operation failed");
        })
    }
}

impl<F, T, E> BestEffort<F>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    /// Runs the operation. Returns `None` if it failed.
    pub async fn run(self) -> Option<T> {
        match self.fut.await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(operation = self.label, error = %e, "best-effort operation failed");
                None
            }
        }
    }
}
