//! HMAC validation for Shopify OAuth callbacks.
//!
//! Shopify signs the callback query with HMAC-SHA256 keyed by the app's
//! client secret and sends the lowercase hex digest as `hmac`.
//!
//! # Security
//!
//! All comparisons are constant-time. When an old secret is configured the
//! signature is also checked against it, so installs started before a key
//! rotation still complete.
//!
//! # Example
//!
//! ```rust
//! use shopify_install::auth::oauth::hmac::compute_signature;
//!
//! let signature = compute_signature("code=c1&shop=a.myshopify.com", "hush");
//! assert_eq!(
//!     signature,
//!     "ed44ce04a0e039721bf572e12deb2857038e543fbf7f6e461287ee85b1de1c07"
//! );
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `message` keyed with `secret`.
///
/// # Example
///
/// ```rust
/// use shopify_install::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two strings in constant time with respect to their contents.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Returns `true` if the callback's `hmac` matches its other parameters.
///
/// Tries the current secret first, then `old_api_secret_key` if configured.
/// A missing or empty `hmac` never validates.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, config: &ShopifyConfig) -> bool {
    let received = query.hmac();
    if received.is_empty() {
        return false;
    }

    let signable = query.to_signable_string();

    let computed = compute_signature(&signable, config.api_secret_key().as_ref());
    if constant_time_compare(&computed, received) {
        return true;
    }

    config.old_api_secret_key().is_some_and(|old| {
        let computed_old = compute_signature(&signable, old.as_ref());
        constant_time_compare(&computed_old, received)
    })
}

mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};

    fn config_with(secret: &str, old: Option<&str>) -> ShopifyConfig {
        let mut builder = ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap())
            .host(HostUrl::new("https://app.example.com").unwrap())
            .scopes("read_orders".parse().unwrap());
        if let Some(old) = old {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
        }
        builder.build().unwrap()
    }

    fn signed_query(secret: &str) -> AuthQuery {
        let unsigned = AuthQuery::from_pairs([("shop", "a.myshopify.com"), ("code", "c1")]);
        let hmac = compute_signature(&unsigned.to_signable_string(), secret);
        AuthQuery::from_pairs([
            ("shop", "a.myshopify.com"),
            ("code", "c1"),
            ("hmac", hmac.as_str()),
        ])
    }

    #[test]
    fn test_compute_signature_matches_known_value() {
        // HMAC-SHA256("message", "key")
        assert_eq!(
            compute_signature("message", "key"),
            "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
        );
    }

    #[test]
    fn test_canonical_callback_signature_is_reproducible() {
        let query = AuthQuery::from_pairs([("shop", "a.myshopify.com"), ("code", "c1")]);
        let signature = compute_signature(&query.to_signable_string(), "hush");
        assert_eq!(
            signature,
            "ed44ce04a0e039721bf572e12deb2857038e543fbf7f6e461287ee85b1de1c07"
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("short", "longer string"));
        assert!(!constant_time_compare("ABC", "abc"));
    }

    #[test]
    fn test_validate_hmac_succeeds_with_correct_hmac() {
        assert!(validate_hmac(&signed_query("hush"), &config_with("hush", None)));
    }

    #[test]
    fn test_validate_hmac_fails_with_wrong_secret() {
        assert!(!validate_hmac(&signed_query("other"), &config_with("hush", None)));
    }

    #[test]
    fn test_validate_hmac_fails_when_a_signed_value_changes() {
        let signed = signed_query("hush");
        let tampered = AuthQuery::from_pairs([
            ("shop", "b.myshopify.com"),
            ("code", "c1"),
            ("hmac", signed.hmac()),
        ]);
        assert!(!validate_hmac(&tampered, &config_with("hush", None)));
    }

    #[test]
    fn test_validate_hmac_rejects_missing_hmac() {
        let query = AuthQuery::from_pairs([("shop", "a.myshopify.com")]);
        assert!(!validate_hmac(&query, &config_with("hush", None)));
    }

    #[test]
    fn test_validate_hmac_falls_back_to_old_secret() {
        let config = config_with("new-secret", Some("hush"));
        assert!(validate_hmac(&signed_query("hush"), &config));
        assert!(!validate_hmac(&signed_query("unrelated"), &config));
    }

    #[test]
    fn test_hex_encoding() {
        assert_eq!(hex::encode([0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }
}
