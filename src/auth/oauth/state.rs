//! Anti-forgery `state` parameter.
//!
//! A fresh [`StateParam`] is minted for every authorization attempt, sent to
//! Shopify in the consent URL, and must come back unchanged on the callback.
//! The value is 32 bytes from the operating system's CSPRNG, encoded as
//! URL-safe base64 without padding (43 characters).
//!
//! # Example
//!
//! ```rust
//! use shopify_install::auth::oauth::StateParam;
//!
//! let state = StateParam::new();
//! assert_eq!(state.as_ref().len(), 43);
//! assert!(state.matches(state.as_ref()));
//! ```

use base64::prelude::*;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

use crate::auth::oauth::hmac::constant_time_compare;

/// OAuth state parameter for CSRF protection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam {
    value: String,
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    const ENTROPY_BYTES: usize = 32;

    /// Generates a new unpredictable state value.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self {
            value: BASE64_URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Wraps an existing state string, e.g. one read back from a store.
    ///
    /// ```rust
    /// use shopify_install::auth::oauth::StateParam;
    ///
    /// let state = StateParam::from_raw("custom-state-value");
    /// assert_eq!(state.as_ref(), "custom-state-value");
    /// ```
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { value: raw.into() }
    }

    /// Compares against a received value in constant time.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        constant_time_compare(&self.value, received)
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
