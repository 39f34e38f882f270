//! Configuration error types for the install service.
//!
//! Every configuration constructor returns `Result<T, ConfigError>` so that a
//! misconfigured process fails once, at startup, before it binds a listener.
//!
//! # Example
//!
//! ```rust
//! use shopify_install::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building the service configuration.
///
/// These are fatal: the binary reports them and exits instead of serving
/// requests with a partial configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required builder field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// One or more required environment variables are unset or empty.
    ///
    /// All missing variables are reported together.
    #[error("Missing required environment variables: {}", variables.join(", "))]
    MissingEnvironment {
        /// Names of every missing variable, in declaration order.
        variables: Vec<&'static str>,
    },

    /// An environment variable is set but its value cannot be used.
    #[error("Invalid value for {variable}: {reason}")]
    InvalidSetting {
        /// The offending variable.
        variable: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://myapp.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_error_message() {
        let error = ConfigError::EmptyApiKey;
        let message = error.to_string();
        assert!(message.contains("API key cannot be empty"));
        assert!(message.contains("valid Shopify API key"));
    }

    #[test]
    fn test_invalid_shop_domain_error_message() {
        let error = ConfigError::InvalidShopDomain {
            domain: "bad domain!".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("bad domain!"));
        assert!(message.contains("Expected format"));
    }

    #[test]
    fn test_missing_environment_lists_every_variable() {
        let error = ConfigError::MissingEnvironment {
            variables: vec!["SHOPIFY_API_KEY", "SCOPES", "APP_URL"],
        };
        assert_eq!(
            error.to_string(),
            "Missing required environment variables: SHOPIFY_API_KEY, SCOPES, APP_URL"
        );
    }

    #[test]
    fn test_invalid_setting_names_variable() {
        let error = ConfigError::InvalidSetting {
            variable: "PORT",
            reason: "not a number".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("PORT"));
        assert!(message.contains("not a number"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyApiKey;
        let _: &dyn std::error::Error = &error;
    }
}
