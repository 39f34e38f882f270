//! OAuth callback verification.
//!
//! When the merchant approves the install, Shopify redirects to the callback
//! URL with `code`, `shop`, `state`, `hmac` and a few other parameters. Before
//! anything is sent to the token endpoint the callback must pass, in order:
//!
//! 1. [`validate_auth_callback`]: required parameters present, signature
//!    valid, shop well-formed
//! 2. [`verify_state`]: the returned `state` belongs to an authorization this
//!    service started for the same shop and has not expired
//!
//! Only then is the code exchanged (see
//! [`TokenExchangeClient`](crate::auth::oauth::TokenExchangeClient)).

use chrono::{DateTime, Utc};

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::AuthQuery;
use crate::config::{ShopDomain, ShopifyConfig};
use crate::store::PendingAuthorization;

/// A callback whose signature has been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedCallback {
    /// The signed shop domain.
    pub shop: ShopDomain,
    /// The one-time authorization code.
    pub code: String,
    /// The returned anti-forgery state.
    pub state: String,
}

/// Verifies the callback's parameters and signature.
///
/// # Errors
///
/// - [`OAuthError::MissingParameter`]: `hmac`, `shop`, `code` or `state` is
///   absent or empty
/// - [`OAuthError::InvalidHmac`]: the signature does not match under the
///   current or old secret
/// - [`OAuthError::InvalidShop`]: the signed `shop` is not a valid domain
///
/// # Example
///
/// ```rust
/// use shopify_install::{ApiKey, ApiSecretKey, HostUrl, ShopifyConfig};
/// use shopify_install::auth::oauth::{hmac::compute_signature, validate_auth_callback, AuthQuery};
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("hush").unwrap())
///     .host(HostUrl::new("https://app.example.com").unwrap())
///     .scopes("read_orders".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let params = [("shop", "a.myshopify.com"), ("code", "c1"), ("state", "s1")];
/// let hmac = compute_signature(&AuthQuery::from_pairs(params).to_signable_string(), "hush");
/// let mut pairs = params.to_vec();
/// pairs.push(("hmac", hmac.as_str()));
/// let query = AuthQuery::from_pairs(pairs);
///
/// let verified = validate_auth_callback(&config, &query).unwrap();
/// assert_eq!(verified.shop.as_ref(), "a.myshopify.com");
/// ```
pub fn validate_auth_callback(
    config: &ShopifyConfig,
    query: &AuthQuery,
) -> Result<VerifiedCallback, OAuthError> {
    query.require("hmac")?;
    let shop = query.require("shop")?;
    let code = query.require("code")?;
    let state = query.require("state")?;

    if !validate_hmac(query, config) {
        return Err(OAuthError::InvalidHmac);
    }

    let shop = ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShop {
        shop: shop.to_string(),
    })?;

    Ok(VerifiedCallback {
        shop,
        code: code.to_string(),
        state: state.to_string(),
    })
}

/// Checks a verified callback against the authorization it claims to finish.
///
/// `pending` is the record removed from the state store for the returned
/// state, `cookie` the value of the browser's state cookie if one was sent.
///
/// # Errors
///
/// Returns [`OAuthError::StateMismatch`] if the state is unknown, expired,
/// was started for another shop, or differs from the cookie.
pub fn verify_state(
    pending: Option<&PendingAuthorization>,
    callback: &VerifiedCallback,
    cookie: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), OAuthError> {
    let pending = pending.ok_or(OAuthError::StateMismatch {
        reason: "unknown state",
    })?;

    if !pending.state.matches(&callback.state) {
        return Err(OAuthError::StateMismatch {
            reason: "unknown state",
        });
    }

    if pending.is_expired_at(now) {
        return Err(OAuthError::StateMismatch {
            reason: "authorization attempt expired",
        });
    }

    if pending.shop != callback.shop {
        return Err(OAuthError::StateMismatch {
            reason: "state was issued for a different shop",
        });
    }

    match cookie {
        Some(value) if constant_time_compare(value, &callback.state) => Ok(()),
        Some(_) => Err(OAuthError::StateMismatch {
            reason: "state cookie does not match",
        }),
        None => Err(OAuthError::StateMismatch {
            reason: "state cookie missing",
        }),
    }
}
