//! Route handlers.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::cookies::{clear_state_cookie, state_cookie, STATE_COOKIE};
use super::error::ApiError;
use super::{AppState, CALLBACK_PATH};
use crate::auth::oauth::AuthQuery;

/// Query accepted by `GET /auth`.
#[derive(Debug, Deserialize)]
pub struct BeginParams {
    /// The shop to install on, as a bare name or `*.myshopify.com` domain.
    shop: Option<String>,
}

/// `GET /`: liveness probe.
pub async fn health() -> &'static str {
    "Backend reachable"
}

/// `GET /auth?shop=`: redirect the merchant to the consent screen.
pub async fn begin_install(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<BeginParams>,
) -> Result<Response, ApiError> {
    let started = state
        .flow
        .begin(params.shop.as_deref(), CALLBACK_PATH)
        .await
        .map_err(ApiError::Begin)?;

    let config = state.flow.config();
    let cookie = state_cookie(
        started.state.as_ref(),
        config.state_ttl(),
        config.host().is_https(),
    );

    Ok((
        StatusCode::FOUND,
        jar.add(cookie),
        [(header::LOCATION, started.auth_url)],
    )
        .into_response())
}

/// `GET /auth/callback`: verify the callback and capture the token.
pub async fn complete_install(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = AuthQuery::from_pairs(pairs);
    let cookie = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    let token = state
        .flow
        .complete(&query, cookie.as_deref())
        .await
        .map_err(ApiError::Callback)?;

    let secure = state.flow.config().host().is_https();
    Ok((
        jar.add(clear_state_cookie(secure)),
        format!("App successfully installed for {}", token.shop),
    )
        .into_response())
}
