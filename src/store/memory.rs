//! In-memory store implementations.
//!
//! Contents are lost on restart. A production deployment should provide
//! durable [`TokenStore`] and [`StateStore`] implementations instead.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use super::{PendingAuthorization, StateStore, StoreError, TokenStore};
use crate::auth::StoredToken;
use crate::config::ShopDomain;

/// Token store backed by a `RwLock<HashMap>`.
///
/// # Example
///
/// ```rust
/// # tokio_test_block_on(async {
/// use shopify_install::store::{InMemoryTokenStore, TokenStore};
/// use shopify_install::ShopDomain;
///
/// let store = InMemoryTokenStore::new();
/// let shop = ShopDomain::new("a").unwrap();
/// assert!(store.get(&shop).await.unwrap().is_none());
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<ShopDomain, StoredToken>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of shops with a stored token.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns `true` if no token has been stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, shop: &ShopDomain) -> Result<Option<StoredToken>, StoreError> {
        Ok(self.tokens.read().await.get(shop).cloned())
    }

    async fn put(&self, token: StoredToken) -> Result<(), StoreError> {
        self.tokens.write().await.insert(token.shop.clone(), token);
        Ok(())
    }
}

/// State store backed by a `Mutex<HashMap>`.
///
/// Expired entries are pruned whenever a new attempt is inserted, so the map
/// stays bounded by the number of attempts started within one TTL.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    pending: Mutex<HashMap<String, PendingAuthorization>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attempts currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Returns `true` if no attempt is held.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn insert(&self, pending: PendingAuthorization) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut map = self.pending.lock().await;
        map.retain(|_, p| !p.is_expired_at(now));
        map.insert(pending.state.as_ref().to_string(), pending);
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<PendingAuthorization>, StoreError> {
        Ok(self.pending.lock().await.remove(state))
    }
}
