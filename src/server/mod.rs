//! HTTP surface of the install service.
//!
//! | route                | handler                                        |
//! |----------------------|------------------------------------------------|
//! | `GET /`              | health check, `200 Backend reachable`          |
//! | `GET /auth`          | `302` to the consent screen, sets state cookie |
//! | `GET /auth/callback` | verifies, exchanges, stores; `200` on success  |
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_install::server::{build_router, AppState};
//!
//! let app = build_router(AppState::new(flow));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:10000").await?;
//! axum::serve(listener, app).await?;
//! ```

mod cookies;
mod error;
mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::InstallFlow;

pub use cookies::{clear_state_cookie, state_cookie, STATE_COOKIE};
pub use error::ApiError;

/// Path Shopify redirects to after consent.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Shared application state accessible from all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The install handshake and its stores.
    pub flow: Arc<InstallFlow>,
}

impl AppState {
    /// Wraps an [`InstallFlow`] for sharing across requests.
    #[must_use]
    pub fn new(flow: InstallFlow) -> Self {
        Self {
            flow: Arc::new(flow),
        }
    }
}

/// Build the axum router with all routes and shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/auth", get(handlers::begin_install))
        .route(CALLBACK_PATH, get(handlers::complete_install))
        .with_state(state)
}
