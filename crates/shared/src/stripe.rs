//! Billing provider integration via the Stripe REST API (no SDK dependency).

use serde::Deserialize;
use thiserror::Error;

use crate::config::BillingConfig;

/// Errors from the billing provider API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// Transport failure talking to the provider.
    #[error("billing request failed: {0}")]
    Http(String),
    /// Provider answered with an error status.
    #[error("billing provider returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },
    /// Response was missing a field we rely on.
    #[error("billing response missing field: {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Parameters of a hosted subscription checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    /// Price identifier to subscribe to.
    pub price_id: &'a str,
    /// Prefilled customer email.
    pub customer_email: Option<&'a str>,
    /// Account the subscription is for, echoed back in the completion event.
    pub account_id: &'a str,
    /// Plan name echoed back in the completion event.
    pub plan: &'a str,
    /// Where the provider sends the customer after paying.
    pub success_url: &'a str,
    /// Where the provider sends the customer after abandoning.
    pub cancel_url: &'a str,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session identifier.
    pub id: String,
    /// Hosted page the customer is redirected to.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerObject {
    #[serde(default)]
    deleted: bool,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin client over the provider's REST endpoints.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a hosted checkout session in subscription mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the request.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("metadata[account_id]", request.account_id),
            ("metadata[plan]", request.plan),
        ];
        if let Some(email) = request.customer_email {
            form.push(("customer_email", email));
        }

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;

        let session: CheckoutSession = Self::parse(response).await?;
        if session.url.is_none() {
            return Err(StripeError::MissingField("url"));
        }
        Ok(session)
    }

    /// Resolves a customer's email. Deleted customers resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the request.
    pub async fn customer_email(&self, customer_id: &str) -> Result<Option<String>, StripeError> {
        let response = self
            .http
            .get(format!("{}/v1/customers/{customer_id}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let customer: CustomerObject = Self::parse(response).await?;
        if customer.deleted {
            return Ok(None);
        }
        Ok(customer.email)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| "unknown error".to_string());

        tracing::warn!(status = status.as_u16(), message = %message, "billing provider error");
        Err(StripeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_object_deleted() {
        let customer: CustomerObject =
            serde_json::from_str(r#"{"id":"cus_1","deleted":true}"#).unwrap();
        assert!(customer.deleted);
        assert!(customer.email.is_none());
    }

    #[test]
    fn test_customer_object_with_email() {
        let customer: CustomerObject =
            serde_json::from_str(r#"{"id":"cus_1","email":"owner@resto.fr"}"#).unwrap();
        assert!(!customer.deleted);
        assert_eq!(customer.email.as_deref(), Some("owner@resto.fr"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = StripeClient::new(&BillingConfig {
            secret_key: "sk_live_secret".to_string(),
            webhook_secret: String::new(),
            signature_tolerance_secs: 300,
            pro_price_id: String::new(),
            enterprise_price_id: String::new(),
            api_base: "https://api.stripe.com/".to_string(),
        });
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk_live_secret"));
        assert!(debug.contains("https://api.stripe.com\""));
    }
}
