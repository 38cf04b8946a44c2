//! Server configuration loaded from environment variables.
//!
//! [`AppConfig::from_env`] reads the process environment. Tests use
//! [`AppConfig::from_lookup`] with a closure so they never depend on, or
//! modify, the real environment.

use super::{ApiKey, ApiSecretKey, HostUrl, ShopifyConfig};
use crate::auth::AuthScopes;
use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

const DEFAULT_SCOPES: &str = "read_products";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_NAME: &str = "shopify_app";
const DEFAULT_NGROK_API_URL: &str = "http://localhost:4040/api/tunnels";

/// Where sessions and app data are persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB at `url`, using database `database`.
    Mongo {
        /// Connection string (`DATABASE_URL`).
        url: String,
        /// Database name (`DATABASE_NAME`).
        database: String,
    },
    /// Process memory. Everything is lost on restart.
    Memory,
}

/// Deployment environment (`APP_ENV`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppEnv {
    /// Local development, tunnel discovery enabled.
    #[default]
    Development,
    /// Production deployment.
    Production,
    /// Automated tests.
    Test,
}

impl AppEnv {
    /// Returns `true` in production.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!(
                "expected development, production or test, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        })
    }
}

/// Everything the server needs to start.
///
/// # Example
///
/// ```rust
/// use shopify_app::{AppConfig, StorageBackend};
///
/// let config = AppConfig::from_lookup(|key| match key {
///     "SHOPIFY_API_KEY" => Some("key".to_string()),
///     "SHOPIFY_API_SECRET" => Some("secret".to_string()),
///     "SESSION_STORAGE" => Some("memory".to_string()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert_eq!(config.storage(), &StorageBackend::Memory);
/// assert_eq!(config.port(), 3000);
/// ```
#[derive(Clone, Debug)]
pub struct AppConfig {
    shopify: ShopifyConfig,
    storage: StorageBackend,
    app_url: Option<HostUrl>,
    host: String,
    port: u16,
    env: AppEnv,
    ngrok_api_url: String,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when a required variable is
    /// unset and [`ConfigError::InvalidEnvVar`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingEnvVar { key });

        let api_key = ApiKey::new(require("SHOPIFY_API_KEY")?)?;
        let api_secret_key = ApiSecretKey::new(require("SHOPIFY_API_SECRET")?)?;

        let scopes_raw = get("SCOPES").unwrap_or_else(|| DEFAULT_SCOPES.to_string());
        let scopes: AuthScopes = scopes_raw.parse()?;

        let mut builder = ShopifyConfig::builder()
            .api_key(api_key)
            .api_secret_key(api_secret_key)
            .scopes(scopes);
        if let Some(old) = get("SHOPIFY_API_SECRET_OLD") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(version) = get("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        let shopify = builder.build()?;

        let storage = match get("SESSION_STORAGE")
            .map(|value| value.trim().to_lowercase())
            .as_deref()
        {
            None | Some("mongodb" | "mongo") => StorageBackend::Mongo {
                url: require("DATABASE_URL")?,
                database: get("DATABASE_NAME")
                    .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar {
                    key: "SESSION_STORAGE",
                    value: other.to_string(),
                    reason: "expected 'mongodb' or 'memory'".to_string(),
                })
            }
        };

        let app_url = get("APP_URL").map(HostUrl::new).transpose()?;

        let host = get("HOST").map_or_else(|| DEFAULT_HOST.to_string(), |raw| normalize_host(&raw));

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    key: "PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_PORT,
        };

        let env = match get("APP_ENV") {
            Some(raw) => raw
                .parse::<AppEnv>()
                .map_err(|reason| ConfigError::InvalidEnvVar {
                    key: "APP_ENV",
                    value: raw.clone(),
                    reason,
                })?,
            None => AppEnv::default(),
        };

        let ngrok_api_url =
            get("NGROK_API_URL").unwrap_or_else(|| DEFAULT_NGROK_API_URL.to_string());

        Ok(Self {
            shopify,
            storage,
            app_url,
            host,
            port,
            env,
            ngrok_api_url,
        })
    }

    /// Builds a configuration directly, mostly for tests.
    #[must_use]
    pub fn new(shopify: ShopifyConfig, storage: StorageBackend) -> Self {
        Self {
            shopify,
            storage,
            app_url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            env: AppEnv::Test,
            ngrok_api_url: DEFAULT_NGROK_API_URL.to_string(),
        }
    }

    /// Sets the public app URL.
    #[must_use]
    pub fn with_app_url(mut self, app_url: HostUrl) -> Self {
        self.app_url = Some(app_url);
        self
    }

    /// Sets the deployment environment.
    #[must_use]
    pub const fn with_env(mut self, env: AppEnv) -> Self {
        self.env = env;
        self
    }

    /// Sets the tunnel inspection API URL.
    #[must_use]
    pub fn with_ngrok_api_url(mut self, url: impl Into<String>) -> Self {
        self.ngrok_api_url = url.into();
        self
    }

    /// Returns the Shopify credentials and API settings.
    #[must_use]
    pub const fn shopify(&self) -> &ShopifyConfig {
        &self.shopify
    }

    /// Returns the storage backend selection.
    #[must_use]
    pub const fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// Returns `APP_URL`, if set.
    #[must_use]
    pub const fn app_url(&self) -> Option<&HostUrl> {
        self.app_url.as_ref()
    }

    /// Returns the bare host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the listen port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the deployment environment.
    #[must_use]
    pub const fn env(&self) -> AppEnv {
        self.env
    }

    /// Returns the tunnel inspection API URL.
    #[must_use]
    pub fn ngrok_api_url(&self) -> &str {
        &self.ngrok_api_url
    }

    /// The app URL used when nothing better is known.
    ///
    /// `http://localhost:{port}` for a local host, `https://{host}` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if `HOST` does not form a URL.
    pub fn fallback_app_url(&self) -> Result<HostUrl, ConfigError> {
        if self.host == DEFAULT_HOST || self.host == "127.0.0.1" {
            HostUrl::new(format!("http://{}:{}", self.host, self.port))
        } else {
            HostUrl::new(format!("https://{}", self.host))
        }
    }
}

/// Strips scheme, port and path from a `HOST` value.
fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let end = without_scheme
        .find([':', '/'])
        .unwrap_or(without_scheme.len());
    without_scheme[..end].to_lowercase()
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
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("SHOPIFY_API_KEY", "key"),
        ("SHOPIFY_API_SECRET", "secret"),
        ("DATABASE_URL", "mongodb://localhost:27017"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&BASE)).unwrap();

        assert_eq!(config.shopify().scopes().to_string(), "read_products");
        assert_eq!(
            config.storage(),
            &StorageBackend::Mongo {
                url: "mongodb://localhost:27017".to_string(),
                database: "shopify_app".to_string(),
            }
        );
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.port(), 3000);
        assert_eq!(config.env(), AppEnv::Development);
        assert!(config.app_url().is_none());
        assert_eq!(config.ngrok_api_url(), "http://localhost:4040/api/tunnels");
        assert_eq!(
            config.fallback_app_url().unwrap().as_ref(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_missing_api_key() {
        let result = AppConfig::from_lookup(lookup_from(&[("SHOPIFY_API_SECRET", "s")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar {
                key: "SHOPIFY_API_KEY"
            })
        ));
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_API_KEY", "key"),
            ("SHOPIFY_API_SECRET", "  "),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar {
                key: "SHOPIFY_API_SECRET"
            })
        ));
    }

    #[test]
    fn test_mongodb_requires_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_API_KEY", "key"),
            ("SHOPIFY_API_SECRET", "secret"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar { key: "DATABASE_URL" })
        ));
    }

    #[test]
    fn test_memory_storage_needs_no_database() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_API_KEY", "key"),
            ("SHOPIFY_API_SECRET", "secret"),
            ("SESSION_STORAGE", "Memory"),
        ]))
        .unwrap();
        assert_eq!(config.storage(), &StorageBackend::Memory);
    }

    #[test]
    fn test_unknown_storage_backend_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SESSION_STORAGE", "redis"));
        let result = AppConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar {
                key: "SESSION_STORAGE",
                ..
            })
        ));
    }

    #[test]
    fn test_host_is_normalized() {
        let mut pairs = BASE.to_vec();
        pairs.push(("HOST", "https://abc.ngrok.app:443/"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.host(), "abc.ngrok.app");
        assert_eq!(
            config.fallback_app_url().unwrap().as_ref(),
            "https://abc.ngrok.app"
        );
    }

    #[test]
    fn test_optional_values_are_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("SCOPES", "write_products,read_orders"),
            ("SHOPIFY_API_SECRET_OLD", "old"),
            ("APP_URL", "https://app.example.com/"),
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("DATABASE_NAME", "custom"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(config.shopify().scopes().iter().any(|s| s == "read_products"));
        assert!(config.shopify().old_api_secret_key().is_some());
        assert_eq!(
            config.app_url().map(HostUrl::origin),
            Some("https://app.example.com")
        );
        assert_eq!(config.port(), 8080);
        assert!(config.env().is_production());
        assert!(matches!(
            config.storage(),
            StorageBackend::Mongo { database, .. } if database == "custom"
        ));
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        let result = AppConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { key: "PORT", .. })
        ));
    }

    #[test]
    fn test_invalid_app_env() {
        let mut pairs = BASE.to_vec();
        pairs.push(("APP_ENV", "staging"));
        let result = AppConfig::from_lookup(lookup_from(&pairs));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { key: "APP_ENV", .. })
        ));
    }
}
