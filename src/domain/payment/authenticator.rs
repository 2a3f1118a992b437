//! Webhook origin authentication strategies.
//!
//! Two ways a provider callback proves where it came from: the source
//! address falls inside the provider's published network ranges, or the
//! body carries an HMAC-SHA256 signature computed with a shared secret.
//! Authentication runs before any payload parsing and never touches
//! stored state.

use std::net::IpAddr;

use hmac::{Hmac, Mac};
use ipnet::IpNet;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Per-gateway webhook authentication strategy.
pub enum WebhookAuthenticator {
    /// Trust callbacks whose source address is inside one of the provider's
    /// published ranges. No signature exists on these webhooks; network
    /// origin is the security boundary.
    IpAllowlist(Vec<IpNet>),

    /// Trust callbacks whose signature header matches HMAC-SHA256 over the
    /// raw body with the shared signing secret.
    SignedBody {
        /// Decrypted signing secret. `None` means no secret is configured.
        secret: Option<SecretString>,
        /// Header carrying the hex-encoded signature.
        header: &'static str,
        /// Accept unsigned callbacks when no secret is configured. Off by
        /// default: a missing secret fails closed unless the gateway's
        /// config opts in explicitly.
        allow_unsigned: bool,
    },
}

impl WebhookAuthenticator {
    /// Checks an inbound callback against the strategy.
    ///
    /// Pure predicate: true means trusted.
    pub fn verify(&self, body: &[u8], headers: &http::HeaderMap, source_ip: IpAddr) -> bool {
        match self {
            WebhookAuthenticator::IpAllowlist(networks) => {
                networks.iter().any(|net| net.contains(&source_ip))
            }
            WebhookAuthenticator::SignedBody {
                secret,
                header,
                allow_unsigned,
            } => {
                let secret = match secret {
                    Some(secret) => secret,
                    None => return *allow_unsigned,
                };
                let provided = match headers.get(*header).and_then(|v| v.to_str().ok()) {
                    Some(value) => value,
                    None => return false,
                };
                let provided = match hex::decode(provided) {
                    Ok(bytes) => bytes,
                    Err(_) => return false,
                };
                let expected = compute_signature(secret.expose_secret().as_bytes(), body);
                constant_time_compare(&expected, &provided)
            }
        }
    }
}

/// Computes HMAC-SHA256 over the raw body.
pub fn compute_signature(key: &[u8], body: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Performs constant-time comparison of two byte slices.
///
/// Prevents timing attacks that could leak information about the expected
/// signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;

    const SIGN_HEADER: &str = "x-payment-sign";

    fn allowlist() -> WebhookAuthenticator {
        WebhookAuthenticator::IpAllowlist(vec![
            "185.71.76.0/27".parse().unwrap(),
            "77.75.156.11/32".parse().unwrap(),
            "2a02:5180::/32".parse().unwrap(),
        ])
    }

    fn signed(secret: Option<&str>, allow_unsigned: bool) -> WebhookAuthenticator {
        WebhookAuthenticator::SignedBody {
            secret: secret.map(|s| SecretString::new(s.to_string())),
            header: SIGN_HEADER,
            allow_unsigned,
        }
    }

    fn headers_with_signature(secret: &str, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let signature = hex::encode(compute_signature(secret.as_bytes(), body));
        headers.insert(SIGN_HEADER, signature.parse().unwrap());
        headers
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // IP Allowlist Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn address_inside_range_is_trusted() {
        let auth = allowlist();
        assert!(auth.verify(b"{}", &HeaderMap::new(), ip("185.71.76.5")));
    }

    #[test]
    fn exact_host_entry_is_trusted() {
        let auth = allowlist();
        assert!(auth.verify(b"{}", &HeaderMap::new(), ip("77.75.156.11")));
    }

    #[test]
    fn neighbor_of_host_entry_is_rejected() {
        let auth = allowlist();
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("77.75.156.12")));
    }

    #[test]
    fn address_outside_every_range_is_rejected() {
        let auth = allowlist();
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("203.0.113.9")));
    }

    #[test]
    fn ipv6_range_is_honored() {
        let auth = allowlist();
        assert!(auth.verify(b"{}", &HeaderMap::new(), ip("2a02:5180::1")));
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("2a02:5181::1")));
    }

    #[test]
    fn empty_allowlist_rejects_everything() {
        let auth = WebhookAuthenticator::IpAllowlist(vec![]);
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("127.0.0.1")));
    }

    // ══════════════════════════════════════════════════════════════
    // Signed Body Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_is_trusted() {
        let auth = signed(Some("s3cret"), false);
        let body = br#"{"order_id":"abc"}"#;
        let headers = headers_with_signature("s3cret", body);

        assert!(auth.verify(body, &headers, ip("203.0.113.9")));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let auth = signed(Some("s3cret"), false);
        let body = br#"{"order_id":"abc"}"#;
        let headers = headers_with_signature("other", body);

        assert!(!auth.verify(body, &headers, ip("203.0.113.9")));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let auth = signed(Some("s3cret"), false);
        let headers = headers_with_signature("s3cret", br#"{"order_id":"abc"}"#);

        assert!(!auth.verify(br#"{"order_id":"abd"}"#, &headers, ip("203.0.113.9")));
    }

    #[test]
    fn missing_header_is_rejected() {
        let auth = signed(Some("s3cret"), false);
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("203.0.113.9")));
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let auth = signed(Some("s3cret"), false);
        let mut headers = HeaderMap::new();
        headers.insert(SIGN_HEADER, "not-hex!".parse().unwrap());

        assert!(!auth.verify(b"{}", &headers, ip("203.0.113.9")));
    }

    #[test]
    fn missing_secret_fails_closed_by_default() {
        // No secret configured and no opt-in: everything is rejected, even
        // requests that also carry no signature.
        let auth = signed(None, false);
        assert!(!auth.verify(b"{}", &HeaderMap::new(), ip("203.0.113.9")));
    }

    #[test]
    fn missing_secret_with_explicit_opt_in_is_trusted() {
        let auth = signed(None, true);
        assert!(auth.verify(b"{}", &HeaderMap::new(), ip("203.0.113.9")));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }

    #[test]
    fn constant_time_compare_empty_slices() {
        assert!(constant_time_compare(&[], &[]));
    }
}
