//! Webhook signature verification.
//!
//! The gateway signs each delivery with an HMAC-SHA256 over
//! `"{timestamp}.{raw body}"` and presents it in the `Stripe-Signature`
//! header as `t=<unix ts>,v1=<hex digest>`. This is the sole
//! authentication mechanism on the webhook endpoint.

use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Verifies a signature header against the raw payload.
///
/// Rejects when the header is malformed, the timestamp is outside the
/// tolerance window, or the digest does not match.
pub fn verify_signature(
    header: &str,
    payload: &[u8],
    secret: &str,
    tolerance_secs: u64,
) -> bool {
    let (mut ts, mut v1) = ("", "");
    for part in header.split(',') {
        let mut it = part.trim().splitn(2, '=');
        match (it.next(), it.next()) {
            (Some("t"), Some(val)) => ts = val,
            (Some("v1"), Some(val)) => v1 = val,
            _ => {}
        }
    }
    if ts.is_empty() || v1.is_empty() {
        return false;
    }

    let Ok(ts_i) = ts.parse::<i64>() else {
        return false;
    };
    let now = chrono::Utc::now().timestamp();
    if (now - ts_i).unsigned_abs() > tolerance_secs {
        return false;
    }

    let expected = compute_signature(payload, secret, ts_i);
    constant_time_eq(&expected, v1)
}

/// Computes the hex digest for a payload at a given timestamp. Shared
/// with the test harness, which uses it to construct valid deliveries.
pub fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a complete signature header for a payload. Test-harness
/// counterpart of [`verify_signature`].
pub fn sign_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    format!("t={},v1={}", timestamp, compute_signature(payload, secret, timestamp))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_unit_test";

    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"id":"evt_1"}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = sign_header(payload, SECRET, ts);
        assert!(verify_signature(&header, payload, SECRET, 300));
    }

    #[test]
    fn rejects_tampered_payload() {
        let payload = br#"{"id":"evt_1"}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = sign_header(payload, SECRET, ts);
        assert!(!verify_signature(&header, br#"{"id":"evt_2"}"#, SECRET, 300));
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = br#"{"id":"evt_1"}"#;
        let ts = chrono::Utc::now().timestamp();
        let header = sign_header(payload, "whsec_other", ts);
        assert!(!verify_signature(&header, payload, SECRET, 300));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = br#"{"id":"evt_1"}"#;
        let ts = chrono::Utc::now().timestamp() - 3600;
        let header = sign_header(payload, SECRET, ts);
        assert!(!verify_signature(&header, payload, SECRET, 300));
    }

    #[test]
    fn rejects_malformed_header() {
        let payload = br#"{"id":"evt_1"}"#;
        assert!(!verify_signature("", payload, SECRET, 300));
        assert!(!verify_signature("t=abc,v1=def", payload, SECRET, 300));
        assert!(!verify_signature("v1=deadbeef", payload, SECRET, 300));
        assert!(!verify_signature("t=1700000000", payload, SECRET, 300));
    }

    #[test]
    fn constant_time_eq_basic() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
