//! State cookie helpers.
//!
//! The initiator stores the state value in an `HttpOnly` cookie so the
//! callback can check it came back to the same browser. The cookie is only
//! marked `Secure` when the app is served over `https`, otherwise browsers
//! would drop it on a plain `http` host.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie name carrying the pending state value.
pub const STATE_COOKIE: &str = "shopify_app_state";

/// Build the state cookie, expiring together with the pending attempt.
#[must_use]
pub fn state_cookie(state: &str, ttl: std::time::Duration, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((STATE_COOKIE.to_string(), state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Build an expired state cookie to clear it after the callback.
///
/// `secure` must match the cookie being cleared.
#[must_use]
pub fn clear_state_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
