//! # Shopify Install Service
//!
//! The server side of a Shopify app install: the OAuth 2.0 authorization code
//! handshake that turns a merchant's consent into a stored, per-shop access
//! token.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ShopifyConfig`], loaded once from the
//!   environment by [`AppConfig::from_env`]
//! - Validated newtypes for API credentials and domain values
//! - OAuth scope handling with implied scope support
//! - The authorization initiator and callback verifier in [`auth::oauth`]
//! - Pluggable token and state storage in [`store`]
//! - [`InstallFlow`], which runs the handshake against those stores
//! - An axum router exposing it over HTTP in [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_install::{ShopifyConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.scopes().to_string(), "read_products,write_orders");
//! ```
//!
//! ## Serving
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_install::{AppConfig, InstallFlow};
//! use shopify_install::server::{build_router, AppState};
//! use shopify_install::store::{InMemoryStateStore, InMemoryTokenStore};
//!
//! let config = AppConfig::from_env()?;
//! let flow = InstallFlow::new(
//!     config.shopify,
//!     Arc::new(InMemoryStateStore::new()),
//!     Arc::new(InMemoryTokenStore::new()),
//! )?;
//! let app = build_router(AppState::new(flow));
//! ```
//!
//! ## Security
//!
//! - Callbacks are verified with HMAC-SHA256 in constant time before any
//!   network call is made
//! - State values are 256-bit random, single-use, bound to a shop and to the
//!   initiating browser through an `HttpOnly` cookie
//! - Secrets and access tokens are masked in `Debug` output and never logged
//!
//! ## Thread Safety
//!
//! All public types are `Send + Sync`; stores are shared as `Arc<dyn …>`.

pub mod auth;
pub mod config;
pub mod error;
pub mod install;
pub mod server;
pub mod store;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthScopes, StoredToken};
pub use config::{
    AccessMode, ApiKey, ApiSecretKey, AppConfig, HostUrl, ShopDomain, ShopifyConfig,
    ShopifyConfigBuilder,
};
pub use error::ConfigError;
pub use install::InstallFlow;

// Re-export OAuth types for convenience
pub use auth::oauth::{
    begin_auth, validate_auth_callback, AuthQuery, BeginAuthResult, OAuthError, StateParam,
    TokenExchangeClient,
};
