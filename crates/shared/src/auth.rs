//! Claims carried by tokens from the auth provider.
//!
//! Sign-up, sign-in and session refresh happen at the provider. This service only
//! validates the bearer token and reads the account identity out of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::AccountId;

/// Role the auth provider assigns to signed-in users.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Email the account signed up with.
    #[serde(default)]
    pub email: Option<String>,
    /// Provider role of the session.
    #[serde(default = "default_role")]
    pub role: String,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

fn default_role() -> String {
    AUTHENTICATED_ROLE.to_string()
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(account_id: AccountId, email: Option<&str>, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id.into_inner(),
            email: email.map(str::to_string),
            role: default_role(),
            aud: None,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the account ID from claims.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        AccountId::from_uuid(self.sub)
    }

    /// Returns the email, if the provider included one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
