//! Authorization code exchange.
//!
//! After the callback has been verified, the one-time `code` is traded for a
//! permanent access token at `POST https://{shop}/admin/oauth/access_token`.
//! [`TokenExchangeClient`] owns the HTTP client used for that call and the
//! timeout applied to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_install::auth::oauth::TokenExchangeClient;
//!
//! let client = TokenExchangeClient::new(config.exchange_timeout())?;
//! let response = client.exchange_code(&config, &shop, "code-from-callback").await?;
//! println!("granted: {}", response.scope);
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::auth::oauth::error::OAuthError;
use crate::auth::AccessTokenResponse;
use crate::config::{ShopDomain, ShopifyConfig};

/// Request body for the code exchange.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// HTTP client for the Shopify token endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct TokenExchangeClient {
    http: reqwest::Client,
    timeout: Duration,
    base_url: Option<String>,
}

// Verify TokenExchangeClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenExchangeClient>();
};

impl TokenExchangeClient {
    /// Creates a client whose requests fail with
    /// [`OAuthError::ExchangeTimeout`] after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ExchangeTransport`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthError::ExchangeTransport {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            timeout,
            base_url: None,
        })
    }

    /// Sends every exchange to `base_url` instead of `https://{shop}`.
    ///
    /// Used to point the client at a local stand-in for Shopify.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Returns the token endpoint URL for `shop`.
    #[must_use]
    pub fn token_url(&self, shop: &ShopDomain) -> String {
        self.base_url.as_ref().map_or_else(
            || format!("https://{}/admin/oauth/access_token", shop.as_ref()),
            |base| format!("{base}/admin/oauth/access_token"),
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// The request carries `client_id`, `client_secret` and `code` as JSON.
    /// A 2xx response must contain a non-empty `access_token`.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::ExchangeTimeout`]: no answer within the timeout
    /// - [`OAuthError::ExchangeTransport`]: connection or protocol failure
    /// - [`OAuthError::TokenExchangeFailed`]: non-2xx status
    /// - [`OAuthError::MalformedTokenResponse`]: 2xx without a usable token
    pub async fn exchange_code(
        &self,
        config: &ShopifyConfig,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenResponse, OAuthError> {
        let request_body = TokenExchangeRequest {
            client_id: config.api_key().as_ref(),
            client_secret: config.api_secret_key().as_ref(),
            code,
        };

        let response = self
            .http
            .post(self.token_url(shop))
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(OAuthError::TokenExchangeFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let token_response: AccessTokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthError::MalformedTokenResponse {
                reason: e.to_string(),
            })?;

        if token_response.access_token.is_empty() {
            return Err(OAuthError::MalformedTokenResponse {
                reason: "access_token is empty".to_string(),
            });
        }

        Ok(token_response)
    }

    fn transport_error(&self, error: &reqwest::Error) -> OAuthError {
        if error.is_timeout() {
            OAuthError::ExchangeTimeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            OAuthError::ExchangeTransport {
                message: error.to_string(),
            }
        }
    }
}
