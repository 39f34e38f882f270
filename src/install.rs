//! The install handshake, wired to its stores.
//!
//! [`InstallFlow`] owns everything the two HTTP endpoints need: the validated
//! configuration, the token exchange client, the state store holding
//! in-flight attempts and the token store receiving captured tokens.
//!
//! A callback moves strictly forward through its stages, and the token store
//! is only written after every earlier stage succeeded:
//!
//! | stage      | failure                                  |
//! |------------|------------------------------------------|
//! | `input`    | required parameter missing, bad shop     |
//! | `hmac`     | signature mismatch                       |
//! | `state`    | unknown, expired, wrong shop, bad cookie |
//! | `exchange` | transport, timeout, rejection, bad body  |
//! | `store`    | token store write failed                 |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_install::InstallFlow;
//! use shopify_install::store::{InMemoryStateStore, InMemoryTokenStore};
//!
//! let flow = InstallFlow::new(
//!     config,
//!     Arc::new(InMemoryStateStore::new()),
//!     Arc::new(InMemoryTokenStore::new()),
//! )?;
//!
//! let started = flow.begin(Some("my-shop"), "/auth/callback").await?;
//! // redirect to started.auth_url ...
//!
//! let token = flow.complete(&query, Some(cookie_value)).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::auth::oauth::{
    begin_auth, validate_auth_callback, verify_state, AuthQuery, BeginAuthResult, ErrorKind,
    OAuthError, TokenExchangeClient,
};
use crate::auth::{AuthScopes, StoredToken};
use crate::config::{ShopDomain, ShopifyConfig};
use crate::store::{PendingAuthorization, StateStore, StoreError, TokenStore};

/// Runs the OAuth install handshake against injected stores.
#[derive(Clone)]
pub struct InstallFlow {
    config: Arc<ShopifyConfig>,
    exchange: TokenExchangeClient,
    states: Arc<dyn StateStore>,
    tokens: Arc<dyn TokenStore>,
}

// Verify InstallFlow is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InstallFlow>();
};

impl std::fmt::Debug for InstallFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallFlow")
            .field("config", &self.config)
            .field("exchange", &self.exchange)
            .finish_non_exhaustive()
    }
}

impl InstallFlow {
    /// Creates a flow whose exchange client uses the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ExchangeTransport`] if the HTTP client cannot be
    /// built.
    pub fn new(
        config: ShopifyConfig,
        states: Arc<dyn StateStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, OAuthError> {
        let exchange = TokenExchangeClient::new(config.exchange_timeout())?;
        Ok(Self {
            config: Arc::new(config),
            exchange,
            states,
            tokens,
        })
    }

    /// Replaces the exchange client.
    #[must_use]
    pub fn with_exchange_client(mut self, exchange: TokenExchangeClient) -> Self {
        self.exchange = exchange;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    /// Looks up the usable token for a shop.
    ///
    /// An online token past its `expires_at` is treated as absent.
    ///
    /// # Errors
    ///
    /// Propagates the token store's error.
    pub async fn lookup(&self, shop: &ShopDomain) -> Result<Option<StoredToken>, StoreError> {
        let now = Utc::now();
        Ok(self
            .tokens
            .get(shop)
            .await?
            .filter(|token| !token.is_expired_at(now)))
    }

    /// Starts an install for the `shop` query parameter.
    ///
    /// Records a [`PendingAuthorization`] that expires after the configured
    /// state TTL and returns the consent URL with its state.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::MissingParameter`]: `shop` absent or blank
    /// - [`OAuthError::InvalidShop`]: `shop` is not a valid shop domain
    /// - [`OAuthError::Storage`]: the attempt could not be recorded
    pub async fn begin(
        &self,
        shop: Option<&str>,
        redirect_path: &str,
    ) -> Result<BeginAuthResult, OAuthError> {
        let result = self.start(shop, redirect_path).await;
        if let Err(e) = &result {
            log_failure("begin", shop.unwrap_or_default(), e);
        }
        result
    }

    async fn start(
        &self,
        shop: Option<&str>,
        redirect_path: &str,
    ) -> Result<BeginAuthResult, OAuthError> {
        let raw = shop
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(OAuthError::MissingParameter { name: "shop" })?;
        let shop = ShopDomain::new(raw).map_err(|_| OAuthError::InvalidShop {
            shop: raw.to_string(),
        })?;

        let started = begin_auth(&self.config, &shop, redirect_path);
        let now = Utc::now();
        self.states
            .insert(PendingAuthorization {
                state: started.state.clone(),
                shop: shop.clone(),
                expires_at: expiry(now, self.config.state_ttl()),
            })
            .await?;

        info!(shop = %shop, "authorization started");
        Ok(started)
    }

    /// Completes an install from the callback query.
    ///
    /// `cookie` is the state cookie the browser sent along, if any. The
    /// pending attempt is consumed as soon as the signature checks out, so a
    /// replayed callback fails with [`OAuthError::StateMismatch`] even if the
    /// first one failed later on.
    ///
    /// # Errors
    ///
    /// Any [`OAuthError`]; see the stage table in the module docs.
    pub async fn complete(
        &self,
        query: &AuthQuery,
        cookie: Option<&str>,
    ) -> Result<StoredToken, OAuthError> {
        let result = self.finish(query, cookie).await;
        match &result {
            Ok(token) => info!(shop = %token.shop, scopes = %token.scopes, "app installed"),
            Err(e) => log_failure(e.stage(), query.get("shop").unwrap_or_default(), e),
        }
        result
    }

    async fn finish(
        &self,
        query: &AuthQuery,
        cookie: Option<&str>,
    ) -> Result<StoredToken, OAuthError> {
        let callback = validate_auth_callback(&self.config, query)?;

        let pending = self.states.take(&callback.state).await?;
        verify_state(pending.as_ref(), &callback, cookie, Utc::now())?;

        let response = self
            .exchange
            .exchange_code(&self.config, &callback.shop, &callback.code)
            .await?;

        let token = StoredToken::from_response(callback.shop, response);
        if let Some(missing) = ungranted_scopes(self.config.scopes(), &token.scopes) {
            warn!(
                shop = %token.shop,
                stage = "exchange",
                missing = %missing,
                "granted scopes do not cover the requested scopes"
            );
        }
        self.tokens.put(token.clone()).await?;
        Ok(token)
    }
}

fn expiry(now: DateTime<Utc>, ttl: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Requested scopes the grant does not cover, or `None` if it covers them all.
fn ungranted_scopes(requested: &AuthScopes, granted: &AuthScopes) -> Option<String> {
    if granted.covers(requested) {
        return None;
    }
    let missing: Vec<&str> = requested.iter().filter(|s| !granted.contains(s)).collect();
    Some(missing.join(","))
}

fn log_failure(stage: &'static str, shop: &str, error: &OAuthError) {
    match error.kind() {
        ErrorKind::ClientInput | ErrorKind::Authentication => {
            warn!(shop, stage, error = %error, "install request rejected");
        }
        ErrorKind::Exchange | ErrorKind::Storage => {
            error!(shop, stage, error = %error, "install failed");
        }
    }
}
