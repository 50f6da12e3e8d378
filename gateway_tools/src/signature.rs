//! Webhook signature helpers.
//!
//! The gateway signs every webhook call with an HMAC-SHA512 of the raw request body, keyed with the merchant's secret
//! key, and sends the hex-encoded digest in a header. Verification must be done against the raw bytes, before any
//! JSON parsing.
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Calculates the hex-encoded HMAC-SHA512 of `data` using `secret` as the key.
pub fn calculate_signature(secret: &str, data: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks that `signature` (hex encoded, case-insensitive) is the HMAC-SHA512 of `data` under `secret`.
///
/// The comparison of digests is constant-time.
pub fn validate_signature(secret: &str, data: &[u8], signature: &str) -> bool {
    let provided = match hex::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("🔐️ Webhook signature is not valid hex. {e}");
            return false;
        },
    };
    let mut mac = new_mac(secret);
    mac.update(data);
    mac.verify_slice(&provided).is_ok()
}

fn new_mac(secret: &str) -> HmacSha512 {
    <HmacSha512 as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}
