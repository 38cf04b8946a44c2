//! Configuration types for the app.
//!
//! # Overview
//!
//! - [`ShopifyConfig`]: Shopify credentials, scopes and API version, shared by
//!   the OAuth flow, webhook verification and the Admin API client
//! - [`ShopifyConfigBuilder`]: A builder for constructing [`ShopifyConfig`] instances
//! - [`AppConfig`]: Everything the server needs, loaded from the environment
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//! - [`ApiVersion`]: The Shopify Admin API version to use
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{ShopifyConfig, ApiKey, ApiSecretKey, ApiVersion};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .api_version(ApiVersion::V2024_07)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.secrets().count(), 1);
//! ```

mod env;
mod newtypes;
mod version;

pub use env::{AppConfig, AppEnv, StorageBackend};
pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Identifies this app in the `User-Agent` of outgoing requests.
const USER_AGENT: &str = concat!("shopify-embedded-app/", env!("CARGO_PKG_VERSION"));

/// Shopify credentials and API settings.
///
/// # Key Rotation
///
/// While the app's client secret is being rotated, the previous secret can be
/// kept as `old_api_secret_key`. OAuth callbacks and webhooks signed with
/// either secret are accepted, see [`ShopifyConfig::secrets`].
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    api_version: ApiVersion,
    user_agent_prefix: Option<String>,
    admin_api_base_url: Option<String>,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::default()
    }

    /// The app's client id.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// The app's current client secret.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// The previous client secret during a rotation.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Secrets accepted for incoming signatures, current secret first.
    pub fn secrets(&self) -> impl Iterator<Item = &str> {
        let current: &str = self.api_secret_key.as_ref();
        let old: Option<&str> = self.old_api_secret_key.as_ref().map(|key| key.as_ref());
        std::iter::once(current).chain(old)
    }

    /// Scopes requested during install.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Admin API version used by the GraphQL client.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the scheme and host used for calls to a shop's admin.
    ///
    /// This is `https://{shop}` unless an override was configured.
    ///
    /// ```rust
    /// use shopify_app::{ShopifyConfig, ApiKey, ApiSecretKey, ShopDomain};
    ///
    /// let config = ShopifyConfig::builder()
    ///     .api_key(ApiKey::new("key").unwrap())
    ///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
    ///     .build()
    ///     .unwrap();
    /// let shop = ShopDomain::new("my-store").unwrap();
    /// assert_eq!(config.admin_origin(&shop), "https://my-store.myshopify.com");
    /// ```
    #[must_use]
    pub fn admin_origin(&self, shop: &ShopDomain) -> String {
        self.admin_api_base_url.as_ref().map_or_else(
            || format!("https://{}", shop.as_ref()),
            |base| base.trim_end_matches('/').to_string(),
        )
    }

    /// Value of the `User-Agent` header, `"{prefix} | shopify-embedded-app/{version}"`
    /// when a prefix is configured.
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent_prefix.as_ref().map_or_else(
            || USER_AGENT.to_string(),
            |prefix| format!("{prefix} | {USER_AGENT}"),
        )
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for [`ShopifyConfig`].
///
/// `api_key` and `api_secret_key` must be set. Scopes default to none and the
/// API version to [`ApiVersion::pinned`].
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    api_version: ApiVersion,
    user_agent_prefix: Option<String>,
    admin_api_base_url: Option<String>,
}

impl ShopifyConfigBuilder {
    #[must_use]
    pub fn api_key(self, api_key: ApiKey) -> Self {
        Self {
            api_key: Some(api_key),
            ..self
        }
    }

    #[must_use]
    pub fn api_secret_key(self, secret: ApiSecretKey) -> Self {
        Self {
            api_secret_key: Some(secret),
            ..self
        }
    }

    /// Keeps accepting signatures made with `secret` during a rotation.
    #[must_use]
    pub fn old_api_secret_key(self, secret: ApiSecretKey) -> Self {
        Self {
            old_api_secret_key: Some(secret),
            ..self
        }
    }

    #[must_use]
    pub fn scopes(self, scopes: AuthScopes) -> Self {
        Self { scopes, ..self }
    }

    #[must_use]
    pub fn api_version(self, api_version: ApiVersion) -> Self {
        Self {
            api_version,
            ..self
        }
    }

    /// Prepended to the `User-Agent` of token exchange and Admin API calls.
    #[must_use]
    pub fn user_agent_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            user_agent_prefix: Some(prefix.into()),
            ..self
        }
    }

    /// Sends token exchange and Admin API calls to `base_url` instead of
    /// `https://{shop}`. Used to point the app at a mock server.
    #[must_use]
    pub fn admin_api_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            admin_api_base_url: Some(base_url.into()),
            ..self
        }
    }

    /// Builds the [`ShopifyConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` are not set.
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let missing = |field| ConfigError::MissingRequiredField { field };

        Ok(ShopifyConfig {
            api_key: self.api_key.ok_or_else(|| missing("api_key"))?,
            api_secret_key: self.api_secret_key.ok_or_else(|| missing("api_secret_key"))?,
            old_api_secret_key: self.old_api_secret_key,
            scopes: self.scopes,
            api_version: self.api_version,
            user_agent_prefix: self.user_agent_prefix,
            admin_api_base_url: self.admin_api_base_url,
        })
    }
}
