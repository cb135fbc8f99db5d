//! JWT validation for tokens issued by the auth provider.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::AuthConfig;
use crate::types::AccountId;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    audience: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("audience", &self.audience)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            audience: config.audience.clone(),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Issues a token the same way the auth provider does.
    ///
    /// Used by tooling and tests; production tokens come from the provider.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_token(
        &self,
        account_id: AccountId,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let mut claims = Claims::new(account_id, email, Utc::now() + ttl);
        claims.aud.clone_from(&self.audience);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or the signature is wrong.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service(audience: Option<&str>) -> JwtService {
        JwtService::new(&AuthConfig {
            jwt_secret: "test-secret-key-for-testing".to_string(),
            audience: audience.map(str::to_string),
            admin_emails: vec![],
        })
    }

    #[test]
    fn test_validate_token() {
        let service = create_test_service(None);
        let account_id = AccountId::new();

        let token = service
            .issue_token(account_id, Some("owner@resto.fr"), Duration::minutes(15))
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.account_id(), account_id);
        assert_eq!(claims.email(), Some("owner@resto.fr"));
        assert_eq!(claims.role, "authenticated");
    }

    #[test]
    fn test_audience_is_checked() {
        let issuer = create_test_service(Some("other"));
        let verifier = create_test_service(Some("authenticated"));

        let token = issuer
            .issue_token(AccountId::new(), None, Duration::minutes(15))
            .unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service(None);
        let token = service
            .issue_token(AccountId::new(), None, Duration::minutes(-10))
            .unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service(None);
        assert!(service.validate_token("invalid.token.here").is_err());
    }
}
