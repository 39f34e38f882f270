//! Storage seams for the install handshake.
//!
//! Two stores are injected into [`InstallFlow`](crate::InstallFlow):
//!
//! - [`TokenStore`]: shop → captured access token. Written once per successful
//!   callback, read by whatever later calls the Admin API.
//! - [`StateStore`]: state value → [`PendingAuthorization`]. Written by the
//!   initiator, consumed exactly once by the callback.
//!
//! Both are `async` traits so a durable backend can sit behind them. The
//! in-memory implementations in [`memory`] are what the binary ships with and
//! what the tests use.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::oauth::StateParam;
use crate::auth::StoredToken;
use crate::config::ShopDomain;

pub use memory::{InMemoryStateStore, InMemoryTokenStore};

/// Errors raised by a storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("storage backend error: {message}")]
    Backend {
        /// Backend-provided description.
        message: String,
    },
}

/// Per-shop access token custody.
///
/// Implementations must allow concurrent readers and make each `put` atomic
/// with respect to other operations on the same shop. Last writer wins.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Looks up the token for a shop. `Ok(None)` means no install completed.
    async fn get(&self, shop: &ShopDomain) -> Result<Option<StoredToken>, StoreError>;

    /// Stores a token keyed by `token.shop`, replacing any previous entry.
    async fn put(&self, token: StoredToken) -> Result<(), StoreError>;
}

/// An authorization attempt that has been started but not yet completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAuthorization {
    /// The anti-forgery token sent to Shopify.
    pub state: StateParam,
    /// The shop the attempt was started for.
    pub shop: ShopDomain,
    /// After this instant the attempt is rejected.
    pub expires_at: DateTime<Utc>,
}

impl PendingAuthorization {
    /// Returns `true` if the attempt has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Short-lived storage for pending authorizations, keyed by state value.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Records a pending authorization.
    async fn insert(&self, pending: PendingAuthorization) -> Result<(), StoreError>;

    /// Removes and returns the pending authorization for `state`.
    ///
    /// Must be atomic: two concurrent calls with the same state may not both
    /// observe the record.
    async fn take(&self, state: &str) -> Result<Option<PendingAuthorization>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_pending_authorization_expiry_boundary() {
        let now = Utc::now();
        let pending = PendingAuthorization {
            state: StateParam::from_raw("abc"),
            shop: ShopDomain::new("shop").unwrap(),
            expires_at: now + Duration::seconds(60),
        };

        assert!(!pending.is_expired_at(now));
        assert!(pending.is_expired_at(now + Duration::seconds(60)));
        assert!(pending.is_expired_at(now + Duration::seconds(61)));
    }

    #[test]
    fn test_store_error_message() {
        let error = StoreError::Backend {
            message: "connection reset".to_string(),
        };
        assert_eq!(error.to_string(), "storage backend error: connection reset");
    }
}
