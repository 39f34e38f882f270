//! Authentication types for the install service.
//!
//! # Overview
//!
//! - [`AuthScopes`]: A set of OAuth scopes with implied scope handling
//! - [`AccessToken`] and [`StoredToken`]: the captured install credential
//! - [`oauth`]: OAuth 2.0 authorization code flow implementation
//!
//! # OAuth Flow
//!
//! ```rust,ignore
//! use shopify_install::auth::oauth::{begin_auth, validate_auth_callback};
//!
//! // 1. Generate the consent URL and state
//! let result = begin_auth(&config, &shop, "/auth/callback");
//!
//! // 2. On callback, verify the signed query before anything else
//! let verified = validate_auth_callback(&config, &query)?;
//! ```

pub mod oauth;
mod scopes;
mod token;

pub use scopes::AuthScopes;
pub use token::{AccessToken, AccessTokenResponse, StoredToken};
