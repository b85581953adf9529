use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEX_LEN: usize = 64;

/// The hex-encoded HMAC-SHA256 Razorpay computes over `"{order_id}|{payment_id}"` with the key secret.
pub fn payment_signature(key_secret: &str, order_id: &str, payment_id: &str) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match HmacSha256::new_from_slice(key_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::default(),
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a checkout callback signature in constant time.
///
/// The signature must be exactly the lowercase hex digest Razorpay sends. Anything else, including uppercase hex or
/// surrounding whitespace, never verifies.
pub fn verify_payment_signature(key_secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    if !is_lowercase_hex_digest(signature) {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn is_lowercase_hex_digest(s: &str) -> bool {
    s.len() == SIGNATURE_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
