//! Webhook signature verification.
//!
//! The provider sends `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>…]`. Each `v1` is
//! an HMAC-SHA256 of `"{t}.{payload}"` keyed with the endpoint secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::BillingError;

type HmacSha256 = Hmac<Sha256>;

/// Default accepted clock skew, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, BillingError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| BillingError::SignatureInvalid("malformed timestamp"))?,
                );
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(BillingError::SignatureInvalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(BillingError::SignatureInvalid("missing v1 signature"));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::SignatureInvalid("unusable signing secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verifies a webhook payload against its signature header.
///
/// Any `v1` entry may match. Comparison is constant time.
///
/// # Errors
///
/// Returns [`BillingError::SignatureInvalid`] if the header is malformed, the
/// timestamp is outside `tolerance_secs` of `now`, or no signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: DateTime<Utc>,
) -> Result<(), BillingError> {
    if secret.is_empty() {
        return Err(BillingError::SignatureInvalid("webhook secret not configured"));
    }

    let header = parse_header(header)?;
    if now.timestamp().abs_diff(header.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(BillingError::SignatureInvalid("timestamp outside tolerance"));
    }

    let mac = signed_mac(secret, header.timestamp, payload)?;
    let matched = header.signatures.iter().any(|candidate| {
        hex::decode(candidate).is_ok_and(|expected| mac.clone().verify_slice(&expected).is_ok())
    });

    if matched {
        Ok(())
    } else {
        Err(BillingError::SignatureInvalid("no matching signature"))
    }
}

/// Computes the header value the provider would send. Used by tests and local tooling.
///
/// # Errors
///
/// Returns an error if the secret cannot key the MAC.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let signature = hex::encode(signed_mac(secret, timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={timestamp},v1={signature}"))
}
