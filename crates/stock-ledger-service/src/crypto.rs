//! Hook signature verification.
//!
//! Platform hooks carry an `X-Hook-Signature` header holding the
//! hex-encoded HMAC-SHA256 of the raw request body under the shared
//! hook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 signature of a hook body.
///
/// # Panics
///
/// Never panics in practice: HMAC-SHA256 accepts keys of any size per
/// RFC 2104, so `new_from_slice` only fails if the Hmac implementation
/// is broken.
#[must_use]
pub fn hook_signature(secret: &str, body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hook signature in constant time.
#[must_use]
pub fn verify_hook_signature(secret: &str, body: &str, provided: &str) -> bool {
    let expected = hook_signature(secret, body);
    constant_time_eq(expected.as_bytes(), provided.as_bytes())
}

/// Constant-time byte comparison to avoid timing side channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        let a = hook_signature("secret", r#"{"type":"stock_set"}"#);
        let b = hook_signature("secret", r#"{"type":"stock_set"}"#);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex-encoded SHA-256
    }

    #[test]
    fn verification_accepts_matching_signature() {
        let body = r#"{"type":"order_reduced","order_id":42}"#;
        let sig = hook_signature("secret", body);
        assert!(verify_hook_signature("secret", body, &sig));
    }

    #[test]
    fn verification_rejects_wrong_secret_or_body() {
        let body = r#"{"type":"order_reduced","order_id":42}"#;
        let sig = hook_signature("secret", body);
        assert!(!verify_hook_signature("other", body, &sig));
        assert!(!verify_hook_signature("secret", "tampered", &sig));
        assert!(!verify_hook_signature("secret", body, "deadbeef"));
    }
}
