//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the install handshake. It mints a
//! fresh [`StateParam`] and builds the Shopify consent URL the merchant is
//! redirected to.
//!
//! # Example
//!
//! ```rust
//! use shopify_install::{ApiKey, ApiSecretKey, HostUrl, ShopDomain, ShopifyConfig};
//! use shopify_install::auth::oauth::begin_auth;
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("test-shop").unwrap();
//! let result = begin_auth(&config, &shop, "/auth/callback");
//!
//! assert!(result
//!     .auth_url
//!     .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
//! ```

use crate::auth::oauth::state::StateParam;
use crate::config::{AccessMode, ShopDomain, ShopifyConfig};

/// Result of initiating OAuth authorization.
///
/// The caller must remember `state` (the service keeps it in the state store
/// and in a cookie) and check it when the callback arrives.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The consent URL to redirect the merchant to.
    pub auth_url: String,

    /// The state value embedded in `auth_url`.
    pub state: StateParam,
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};

/// Builds the consent URL for `shop`.
///
/// The URL carries `client_id`, the configured scopes comma-joined in sorted
/// order, `redirect_uri` (host plus `redirect_path`) and a fresh `state`.
/// Online access mode adds `grant_options[]=per-user`. Every key and value is
/// percent-encoded.
#[must_use]
pub fn begin_auth(config: &ShopifyConfig, shop: &ShopDomain, redirect_path: &str) -> BeginAuthResult {
    let state = StateParam::new();

    let mut scopes: Vec<&str> = config.scopes().iter().collect();
    scopes.sort_unstable();

    let mut params = vec![
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", scopes.join(",")),
        ("redirect_uri", config.host().join(redirect_path)),
        ("state", state.as_ref().to_string()),
    ];

    if config.access_mode() == AccessMode::Online {
        params.push(("grant_options[]", "per-user".to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    BeginAuthResult { auth_url, state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};

    fn create_test_config(mode: AccessMode) -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .scopes("write_orders,read_customers".parse().unwrap())
            .access_mode(mode)
            .build()
            .unwrap()
    }

    fn create_test_shop() -> ShopDomain {
        ShopDomain::new("test-shop").unwrap()
    }

    #[test]
    fn test_begin_auth_generates_correct_url_structure() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );
        assert!(result
            .auth_url
            .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
    }

    #[test]
    fn test_begin_auth_includes_all_required_params() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );

        assert!(result.auth_url.contains("client_id=test-api-key"));
        assert!(result.auth_url.contains("scope="));
        assert!(result.auth_url.contains("redirect_uri="));
        assert!(result.auth_url.contains("state="));
    }

    #[test]
    fn test_begin_auth_sorts_scopes() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );
        let expected = urlencoding::encode("read_customers,write_orders");
        assert!(result.auth_url.contains(&format!("scope={expected}")));
    }

    #[test]
    fn test_begin_auth_redirect_uri_format() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );
        let expected = urlencoding::encode("https://myapp.example.com/auth/callback");
        assert!(result
            .auth_url
            .contains(&format!("redirect_uri={expected}")));
    }

    #[test]
    fn test_begin_auth_state_in_url_matches_returned_state() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );
        assert!(result.auth_url.contains(&format!(
            "state={}",
            urlencoding::encode(result.state.as_ref())
        )));
    }

    #[test]
    fn test_begin_auth_offline_has_no_grant_options() {
        let result = begin_auth(
            &create_test_config(AccessMode::Offline),
            &create_test_shop(),
            "/auth/callback",
        );
        assert!(!result.auth_url.contains("grant_options"));
    }

    #[test]
    fn test_begin_auth_online_sets_grant_options() {
        let result = begin_auth(
            &create_test_config(AccessMode::Online),
            &create_test_shop(),
            "/auth/callback",
        );
        assert!(result.auth_url.contains("grant_options%5B%5D=per-user"));
    }

    #[test]
    fn test_begin_auth_unique_states() {
        let config = create_test_config(AccessMode::Offline);
        let shop = create_test_shop();

        let first = begin_auth(&config, &shop, "/callback");
        let second = begin_auth(&config, &shop, "/callback");

        assert_ne!(first.state, second.state);
    }
}
