//! Access token types.
//!
//! This module provides [`AccessToken`], the secret returned by the token
//! exchange, and [`StoredToken`], the record the token store keeps per shop.

use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// An access token issued by Shopify for one shop.
///
/// Treated as a long-lived secret: `Debug` is masked and the value is only
/// reachable through [`AccessToken::expose`].
///
/// ```rust
/// use shopify_install::auth::AccessToken;
///
/// let token = AccessToken::new("shpat_123");
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// assert_eq!(token.expose(), "shpat_123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `X-Shopify-Access-Token` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// A captured access token together with what was granted and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredToken {
    /// The shop the token belongs to.
    pub shop: ShopDomain,
    /// The access token.
    pub access_token: AccessToken,
    /// Scopes Shopify reported as granted.
    pub scopes: AuthScopes,
    /// When the token exchange completed.
    pub captured_at: DateTime<Utc>,
    /// When an online token stops working. `None` for offline tokens.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Builds a record from a token endpoint response captured now.
    #[must_use]
    pub fn from_response(shop: ShopDomain, response: AccessTokenResponse) -> Self {
        Self::from_response_at(shop, response, Utc::now())
    }

    /// Builds a record from a token endpoint response captured at `now`.
    ///
    /// `expires_in` is turned into an absolute `expires_at`.
    #[must_use]
    pub fn from_response_at(
        shop: ShopDomain,
        response: AccessTokenResponse,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = response.expires_in.map(|secs| {
            i64::try_from(secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Self {
            shop,
            access_token: AccessToken::new(response.access_token),
            scopes: response.scope,
            captured_at: now,
            expires_at,
        }
    }

    /// Returns `true` once an online token has passed its expiry.
    ///
    /// Offline tokens never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

// Verify StoredToken is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StoredToken>();
};

/// Body returned by `POST /admin/oauth/access_token`.
///
/// Online-mode responses also carry `expires_in` and user details. The
/// lifetime is kept on [`StoredToken`]; the user details are not retained.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The issued access token.
    pub access_token: String,
    /// Comma-separated granted scopes.
    #[serde(default)]
    pub scope: AuthScopes,
    /// Lifetime in seconds, present for online tokens.
    #[serde(default)]
    pub expires_in: Option<u64>,
}
