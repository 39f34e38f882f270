//! OAuth-specific error types.
//!
//! Each stage of the install handshake fails with its own variant so that a
//! tampered callback ([`OAuthError::InvalidHmac`]) is never confused with an
//! unavailable token endpoint ([`OAuthError::ExchangeTransport`]).
//!
//! # Example
//!
//! ```rust
//! use shopify_install::auth::oauth::{ErrorKind, OAuthError};
//!
//! let error = OAuthError::InvalidHmac;
//! assert_eq!(error.to_string(), "HMAC signature validation failed");
//! assert_eq!(error.kind(), ErrorKind::Authentication);
//! ```

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during the OAuth install handshake.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// A required query parameter is absent or empty.
    #[error("Missing required parameter: '{name}'")]
    MissingParameter {
        /// The parameter name.
        name: &'static str,
    },

    /// The shop parameter is not a valid `*.myshopify.com` domain.
    #[error("Invalid shop parameter '{shop}'")]
    InvalidShop {
        /// The rejected value.
        shop: String,
    },

    /// HMAC signature validation failed.
    ///
    /// The callback was not signed with the configured secret (or the old
    /// secret during rotation). Either the request was tampered with or the
    /// secret is misconfigured.
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// The anti-forgery `state` does not match an in-flight authorization.
    #[error("State parameter rejected: {reason}")]
    StateMismatch {
        /// Which check failed.
        reason: &'static str,
    },

    /// The token endpoint could not be reached.
    #[error("Token exchange request failed: {message}")]
    ExchangeTransport {
        /// Transport-level error description.
        message: String,
    },

    /// The token endpoint did not answer within the configured timeout.
    #[error("Token exchange timed out after {timeout_secs}s")]
    ExchangeTimeout {
        /// The timeout that elapsed.
        timeout_secs: u64,
    },

    /// The token endpoint answered with a non-success status.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The response body.
        message: String,
    },

    /// The token endpoint answered 2xx with a body that is not a token.
    #[error("Malformed token response: {reason}")]
    MalformedTokenResponse {
        /// What was wrong with the body.
        reason: String,
    },

    /// The token could not be written to the token store.
    #[error("Failed to store access token: {0}")]
    Storage(#[from] StoreError),
}

/// Coarse classification of an [`OAuthError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input from the caller.
    ClientInput,
    /// Signature or state verification failed.
    Authentication,
    /// Talking to the platform token endpoint failed.
    Exchange,
    /// Persisting the token failed.
    Storage,
}

impl OAuthError {
    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } | Self::InvalidShop { .. } => ErrorKind::ClientInput,
            Self::InvalidHmac | Self::StateMismatch { .. } => ErrorKind::Authentication,
            Self::ExchangeTransport { .. }
            | Self::ExchangeTimeout { .. }
            | Self::TokenExchangeFailed { .. }
            | Self::MalformedTokenResponse { .. } => ErrorKind::Exchange,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the handshake stage that produced the error, for log fields.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } | Self::InvalidShop { .. } => "input",
            Self::InvalidHmac => "hmac",
            Self::StateMismatch { .. } => "state",
            Self::ExchangeTransport { .. }
            | Self::ExchangeTimeout { .. }
            | Self::TokenExchangeFailed { .. }
            | Self::MalformedTokenResponse { .. } => "exchange",
            Self::Storage(_) => "store",
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
