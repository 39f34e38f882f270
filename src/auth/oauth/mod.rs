//! OAuth 2.0 authorization code grant for Shopify app installs.
//!
//! # Flow
//!
//! 1. **Authorization initiation** ([`begin_auth`]): build the consent URL
//!    and a fresh [`StateParam`], and redirect the merchant to Shopify.
//!
//! 2. **Callback verification** ([`validate_auth_callback`], [`verify_state`]):
//!    when Shopify redirects back, check the HMAC signature over the query,
//!    then check the returned state against the attempt that was started.
//!
//! 3. **Code exchange** ([`TokenExchangeClient::exchange_code`]): trade the
//!    one-time code for an access token.
//!
//! [`InstallFlow`](crate::InstallFlow) runs these steps against the state and
//! token stores.
//!
//! # Security Features
//!
//! - **HMAC Validation**: every callback is verified with HMAC-SHA256 before
//!   any other work is done
//! - **CSRF Protection**: the state is single-use, bound to a shop, expires,
//!   and must match the browser's state cookie
//! - **Constant-Time Comparison**: signatures and state values are compared
//!   in constant time
//! - **Key Rotation Support**: an old client secret can be configured so
//!   in-flight installs survive a rotation
//!
//! # Online vs Offline Access Tokens
//!
//! Offline tokens (the default) are app-level and do not expire. Online
//! tokens are tied to the installing user; select them with
//! [`AccessMode::Online`](crate::AccessMode::Online).
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_install::auth::oauth::{begin_auth, validate_auth_callback, verify_state};
//!
//! let started = begin_auth(&config, &shop, "/auth/callback");
//! // ... redirect to started.auth_url, remember started.state ...
//!
//! let verified = validate_auth_callback(&config, &query)?;
//! verify_state(pending.as_ref(), &verified, cookie, Utc::now())?;
//! let token = client.exchange_code(&config, &verified.shop, &verified.code).await?;
//! ```

mod auth_query;
mod begin_auth;
mod error;
pub mod hmac;
mod state;
mod token_exchange;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::{ErrorKind, OAuthError};
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
pub use state::StateParam;
pub use token_exchange::TokenExchangeClient;
pub use validate_callback::{validate_auth_callback, verify_state, VerifiedCallback};
