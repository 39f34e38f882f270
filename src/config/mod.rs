//! Configuration types for the install service.
//!
//! # Overview
//!
//! - [`ShopifyConfig`]: OAuth credentials, scopes, callback host and handshake tuning
//! - [`ShopifyConfigBuilder`]: A builder for constructing [`ShopifyConfig`] instances
//! - [`AppConfig`]: The process-level configuration loaded once from the environment
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//!
//! # Example
//!
//! ```rust
//! use shopify_install::{ShopifyConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//! assert_eq!(config.scopes().to_string(), "read_products,write_orders");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};

use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Default timeout for the server-to-server token exchange.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lifetime of a pending authorization (`state`) record.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600);

/// Default listen port.
pub const DEFAULT_PORT: u16 = 10000;

/// Which kind of access token the app requests during install.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessMode {
    /// App-level token that does not expire. Used for background API calls.
    #[default]
    Offline,
    /// Per-user token (`grant_options[]=per-user`).
    Online,
}

impl FromStr for AccessMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            other => Err(ConfigError::InvalidSetting {
                variable: "ACCESS_MODE",
                reason: format!("expected 'offline' or 'online', got '{other}'"),
            }),
        }
    }
}

/// Configuration for the OAuth handshake.
///
/// `ShopifyConfig` is `Clone + Send + Sync` and is shared read-only by every
/// request handler.
///
/// # Key Rotation
///
/// When `old_api_secret_key` is set, callback HMAC verification falls back to
/// it after the primary secret fails, so in-flight installs survive a secret
/// rotation.
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    host: HostUrl,
    access_mode: AccessMode,
    exchange_timeout: Duration,
    state_ttl: Duration,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the requested OAuth scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the public host URL of this service.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the requested access mode.
    #[must_use]
    pub const fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Returns the token exchange timeout.
    #[must_use]
    pub const fn exchange_timeout(&self) -> Duration {
        self.exchange_timeout
    }

    /// Returns how long a pending authorization stays valid.
    #[must_use]
    pub const fn state_ttl(&self) -> Duration {
        self.state_ttl
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for constructing [`ShopifyConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key`, `host` and `scopes`.
///
/// # Defaults
///
/// - `access_mode`: [`AccessMode::Offline`]
/// - `exchange_timeout`: [`DEFAULT_EXCHANGE_TIMEOUT`]
/// - `state_ttl`: [`DEFAULT_STATE_TTL`]
/// - `old_api_secret_key`: `None`
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    access_mode: Option<AccessMode>,
    exchange_timeout: Option<Duration>,
    state_ttl: Option<Duration>,
}

impl ShopifyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes (required).
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the public host URL (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the requested access mode.
    #[must_use]
    pub const fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = Some(mode);
        self
    }

    /// Sets the token exchange timeout.
    #[must_use]
    pub const fn exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = Some(timeout);
        self
    }

    /// Sets the pending authorization lifetime.
    #[must_use]
    pub const fn state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = Some(ttl);
        self
    }

    /// Builds the [`ShopifyConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] naming the first unset
    /// required field, or [`ConfigError::InvalidScopes`] when the scope set
    /// is empty.
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;
        let scopes = self
            .scopes
            .ok_or(ConfigError::MissingRequiredField { field: "scopes" })?;

        if scopes.is_empty() {
            return Err(ConfigError::InvalidScopes {
                reason: "at least one scope must be requested".to_string(),
            });
        }

        Ok(ShopifyConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes,
            host,
            access_mode: self.access_mode.unwrap_or_default(),
            exchange_timeout: self.exchange_timeout.unwrap_or(DEFAULT_EXCHANGE_TIMEOUT),
            state_ttl: self.state_ttl.unwrap_or(DEFAULT_STATE_TTL),
        })
    }
}

/// Process configuration, loaded and validated once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// OAuth handshake settings.
    pub shopify: ShopifyConfig,
    /// TCP port the HTTP listener binds on all interfaces.
    pub port: u16,
}

impl AppConfig {
    const REQUIRED: [&'static str; 4] = ["SHOPIFY_API_KEY", "SHOPIFY_API_SECRET", "SCOPES", "APP_URL"];

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables are treated alike. Every missing required
    /// variable is collected before returning, so operators see the full list
    /// in one failure rather than fixing them one restart at a time.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingEnvironment`] when any required variable is missing
    /// - [`ConfigError::InvalidSetting`] or a newtype error for unusable values
    ///
    /// # Example
    ///
    /// ```rust
    /// use shopify_install::{AppConfig, ConfigError};
    ///
    /// let err = AppConfig::from_lookup(|name| match name {
    ///     "SHOPIFY_API_KEY" => Some("key".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap_err();
    ///
    /// assert_eq!(
    ///     err,
    ///     ConfigError::MissingEnvironment {
    ///         variables: vec!["SHOPIFY_API_SECRET", "SCOPES", "APP_URL"],
    ///     }
    /// );
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<&'static str> = Self::REQUIRED
            .into_iter()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvironment { variables: missing });
        }

        let required = |name: &'static str| get(name).unwrap_or_default();

        let mut builder = ShopifyConfig::builder()
            .api_key(ApiKey::new(required("SHOPIFY_API_KEY"))?)
            .api_secret_key(ApiSecretKey::new(required("SHOPIFY_API_SECRET"))?)
            .scopes(required("SCOPES").parse()?)
            .host(HostUrl::new(required("APP_URL"))?);

        if let Some(old_secret) = get("SHOPIFY_OLD_API_SECRET") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old_secret)?);
        }
        if let Some(mode) = get("ACCESS_MODE") {
            builder = builder.access_mode(mode.parse()?);
        }
        if let Some(secs) = get("TOKEN_EXCHANGE_TIMEOUT_SECS") {
            builder = builder.exchange_timeout(parse_secs("TOKEN_EXCHANGE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("OAUTH_STATE_TTL_SECS") {
            builder = builder.state_ttl(parse_secs("OAUTH_STATE_TTL_SECS", &secs)?);
        }

        let port = match get("PORT") {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::InvalidSetting {
                variable: "PORT",
                reason: format!("'{port}' is not a valid TCP port"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            shopify: builder.build()?,
            port,
        })
    }
}

fn parse_secs(variable: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSetting {
            variable,
            reason: format!("'{value}' is not a positive number of seconds"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn complete_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SHOPIFY_API_KEY", "key"),
            ("SHOPIFY_API_SECRET", "secret"),
            ("SCOPES", "read_customers,write_customers,read_orders"),
            ("APP_URL", "https://backend.example.com"),
        ]
    }

    fn minimal_builder() -> ShopifyConfigBuilder {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(HostUrl::new("https://app.example.com").unwrap())
            .scopes("read_products".parse().unwrap())
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = ShopifyConfigBuilder::new()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "api_key" })
        ));
    }

    #[test]
    fn test_builder_requires_host() {
        let result = ShopifyConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .scopes("read_products".parse().unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "host" })
        ));
    }

    #[test]
    fn test_builder_rejects_empty_scopes() {
        let result = minimal_builder().scopes(AuthScopes::new()).build();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = minimal_builder().build().unwrap();

        assert_eq!(config.access_mode(), AccessMode::Offline);
        assert_eq!(config.exchange_timeout(), DEFAULT_EXCHANGE_TIMEOUT);
        assert_eq!(config.state_ttl(), DEFAULT_STATE_TTL);
        assert!(config.old_api_secret_key().is_none());
    }

    #[test]
    fn test_config_debug_does_not_leak_secret() {
        let config = minimal_builder()
            .old_api_secret_key(ApiSecretKey::new("old-secret-value").unwrap())
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ShopifyConfig"));
        assert!(!debug_str.contains("\"secret\""));
        assert!(!debug_str.contains("old-secret-value"));
    }

    #[test]
    fn test_access_mode_parsing() {
        assert_eq!("offline".parse::<AccessMode>().unwrap(), AccessMode::Offline);
        assert_eq!(" Online ".parse::<AccessMode>().unwrap(), AccessMode::Online);
        assert!("sometimes".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_from_lookup_with_complete_environment() {
        let config = AppConfig::from_lookup(lookup_from(&complete_env())).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.shopify.api_key().as_ref(), "key");
        assert_eq!(
            config.shopify.host().as_ref(),
            "https://backend.example.com"
        );
        assert_eq!(
            config.shopify.scopes().to_string(),
            "read_customers,write_customers,read_orders"
        );
    }

    #[test]
    fn test_from_lookup_reports_all_missing_variables_together() {
        let err = AppConfig::from_lookup(lookup_from(&[("SCOPES", "read_orders")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingEnvironment {
                variables: vec!["SHOPIFY_API_KEY", "SHOPIFY_API_SECRET", "APP_URL"],
            }
        );
    }

    #[test]
    fn test_from_lookup_treats_blank_as_missing() {
        let mut env = complete_env();
        env[1] = ("SHOPIFY_API_SECRET", "   ");

        let err = AppConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvironment {
                variables: vec!["SHOPIFY_API_SECRET"],
            }
        );
    }

    #[test]
    fn test_from_lookup_reads_optional_settings() {
        let mut env = complete_env();
        env.extend([
            ("SHOPIFY_OLD_API_SECRET", "previous"),
            ("ACCESS_MODE", "online"),
            ("PORT", "8080"),
            ("TOKEN_EXCHANGE_TIMEOUT_SECS", "3"),
            ("OAUTH_STATE_TTL_SECS", "120"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&env)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.shopify.access_mode(), AccessMode::Online);
        assert_eq!(config.shopify.exchange_timeout(), Duration::from_secs(3));
        assert_eq!(config.shopify.state_ttl(), Duration::from_secs(120));
        assert_eq!(
            config.shopify.old_api_secret_key().map(AsRef::as_ref),
            Some("previous")
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let mut env = complete_env();
        env.push(("PORT", "http"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::InvalidSetting { variable: "PORT", .. })
        ));

        let mut env = complete_env();
        env.push(("TOKEN_EXCHANGE_TIMEOUT_SECS", "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::InvalidSetting {
                variable: "TOKEN_EXCHANGE_TIMEOUT_SECS",
                ..
            })
        ));

        let mut env = complete_env();
        env[3] = ("APP_URL", "backend.example.com");
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::InvalidHostUrl { .. })
        ));
    }
}
