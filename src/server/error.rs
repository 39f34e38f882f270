//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::oauth::{ErrorKind, OAuthError};

/// An [`OAuthError`] on its way to becoming an HTTP response.
///
/// Input and verification failures map to `400`; exchange and storage
/// failures to `500`. Bodies are short plain-text messages that never carry
/// the platform's response body or any secret.
#[derive(Debug)]
pub enum ApiError {
    /// Failure while starting an install.
    Begin(OAuthError),
    /// Failure while completing an install.
    Callback(OAuthError),
}

impl ApiError {
    /// Returns the underlying error.
    #[must_use]
    pub const fn inner(&self) -> &OAuthError {
        match self {
            Self::Begin(e) | Self::Callback(e) => e,
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.inner().kind() {
            ErrorKind::ClientInput | ErrorKind::Authentication => StatusCode::BAD_REQUEST,
            ErrorKind::Exchange | ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match (self, self.inner()) {
            (_, OAuthError::MissingParameter { name }) => format!("Missing {name} parameter"),
            (_, OAuthError::InvalidShop { .. }) => "Invalid shop parameter".to_string(),
            (Self::Begin(_), _) => "OAuth begin failed".to_string(),
            (Self::Callback(_), OAuthError::ExchangeTimeout { .. }) => {
                "OAuth failed: token exchange timed out".to_string()
            }
            (Self::Callback(_), e) => match e.kind() {
                ErrorKind::Exchange => "OAuth failed: token exchange failed".to_string(),
                ErrorKind::Storage => "OAuth failed: could not store access token".to_string(),
                ErrorKind::ClientInput | ErrorKind::Authentication => "OAuth failed".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}
