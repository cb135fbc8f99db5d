//! Shared-secret comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn digest(key: &[u8], value: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(value.as_bytes());
    Some(mac)
}

/// Whether `provided` equals `expected`.
///
/// Both sides are MACed under a fixed key and the digests compared in constant
/// time.
#[must_use]
pub fn secret_matches(expected: &str, provided: &str) -> bool {
    const KEY: &[u8] = b"restoboost-secret-compare";
    let (Some(expected), Some(provided)) = (digest(KEY, expected), digest(KEY, provided)) else {
        return false;
    };
    provided
        .verify_slice(&expected.finalize().into_bytes())
        .is_ok()
}
