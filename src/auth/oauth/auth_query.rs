//! OAuth callback query parameters.
//!
//! Shopify signs every parameter it appends to the redirect, and may add new
//! ones at any time (`host`, `timestamp`, `id_token`, ...). [`AuthQuery`]
//! therefore keeps the whole query rather than a fixed set of fields, so the
//! signature is always computed over exactly what was received.
//!
//! # Example
//!
//! ```rust
//! use shopify_install::auth::oauth::AuthQuery;
//!
//! let query = AuthQuery::from_pairs([
//!     ("shop", "a.myshopify.com"),
//!     ("code", "c1"),
//!     ("hmac", "deadbeef"),
//! ]);
//!
//! assert_eq!(query.get("code"), Some("c1"));
//! assert_eq!(query.to_signable_string(), "code=c1&shop=a.myshopify.com");
//! ```

use crate::auth::oauth::error::OAuthError;

/// Parameters that are never part of the signed message.
const UNSIGNED_PARAMS: [&str; 2] = ["hmac", "signature"];

/// The decoded query string of an OAuth callback.
///
/// Pairs are held sorted by key, then by value, which is the order the
/// signable string requires.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthQuery {
    params: Vec<(String, String)>,
}

impl AuthQuery {
    /// Builds a query from decoded key/value pairs.
    ///
    /// Repeated keys are kept; all of them take part in the signature and
    /// [`get`](Self::get) returns the first in sorted order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        params.sort();
        Self { params }
    }

    /// Returns the value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of `name`, failing if it is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingParameter`] if the parameter is absent or
    /// its value is empty.
    pub fn require(&self, name: &'static str) -> Result<&str, OAuthError> {
        match self.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(OAuthError::MissingParameter { name }),
        }
    }

    /// Returns the signature supplied by Shopify, or an empty string.
    #[must_use]
    pub fn hmac(&self) -> &str {
        self.get("hmac").unwrap_or_default()
    }

    /// Builds the message Shopify signed.
    ///
    /// Drops `hmac` and `signature`, then joins the remaining pairs as
    /// `key=value` with `&`, in key order. Values are used as decoded; no
    /// re-encoding is applied.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        self.params
            .iter()
            .filter(|(k, _)| !UNSIGNED_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns the number of parameters held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the query carries no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthQuery {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signable_string_sorts_by_key() {
        let query = AuthQuery::from_pairs([
            ("state", "s1"),
            ("shop", "a.myshopify.com"),
            ("code", "c1"),
            ("timestamp", "1700000000"),
        ]);
        assert_eq!(
            query.to_signable_string(),
            "code=c1&shop=a.myshopify.com&state=s1&timestamp=1700000000"
        );
    }

    #[test]
    fn test_signable_string_excludes_hmac_and_signature() {
        let query = AuthQuery::from_pairs([
            ("hmac", "abc"),
            ("signature", "legacy"),
            ("shop", "a.myshopify.com"),
        ]);
        assert_eq!(query.to_signable_string(), "shop=a.myshopify.com");
    }

    #[test]
    fn test_signable_string_keeps_unknown_parameters() {
        let query = AuthQuery::from_pairs([("host", "YWRtaW4="), ("code", "c1")]);
        assert_eq!(query.to_signable_string(), "code=c1&host=YWRtaW4=");
    }

    #[test]
    fn test_repeated_keys_all_take_part_in_signature() {
        let query = AuthQuery::from_pairs([("code", "b"), ("code", "a")]);
        assert_eq!(query.to_signable_string(), "code=a&code=b");
        assert_eq!(query.get("code"), Some("a"));
    }

    #[test]
    fn test_require_rejects_missing_and_empty() {
        let query = AuthQuery::from_pairs([("code", "")]);

        assert!(matches!(
            query.require("code"),
            Err(OAuthError::MissingParameter { name: "code" })
        ));
        assert!(matches!(
            query.require("shop"),
            Err(OAuthError::MissingParameter { name: "shop" })
        ));
    }

    #[test]
    fn test_hmac_defaults_to_empty() {
        let query: AuthQuery = [("shop", "a")].into_iter().collect();
        assert_eq!(query.hmac(), "");
        assert_eq!(query.len(), 1);
        assert!(!query.is_empty());
    }
}
