//! Configuration error types.
//!
//! Every configuration constructor returns `Result<T, ConfigError>` so a bad
//! value is rejected when the app starts, not halfway through an OAuth flow.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// A configuration value was missing or malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SHOPIFY_API_KEY is empty; copy the client id from the Partner Dashboard")]
    EmptyApiKey,

    #[error("SHOPIFY_API_SECRET is empty; copy the client secret from the Partner Dashboard")]
    EmptyApiSecretKey,

    /// Neither a bare shop name nor a `*.myshopify.com` domain.
    #[error("'{domain}' is not a shop domain, expected 'my-store' or 'my-store.myshopify.com'")]
    InvalidShopDomain { domain: String },

    #[error("'{version}' is not an Admin API version, expected a quarterly 'YYYY-MM' release or 'unstable'")]
    InvalidApiVersion { version: String },

    #[error("invalid scopes: {reason}")]
    InvalidScopes { reason: String },

    /// [`ShopifyConfigBuilder::build`](crate::ShopifyConfigBuilder::build) was
    /// called without a credential.
    #[error("ShopifyConfig is missing '{field}'")]
    MissingRequiredField { field: &'static str },

    /// A URL without scheme or host, e.g. `APP_URL=myapp.example.com`.
    #[error("'{url}' is not an absolute URL such as 'https://myapp.example.com'")]
    InvalidHostUrl { url: String },

    #[error("missing required environment variable {key}, copy .env.example to .env and fill it in")]
    MissingEnvVar { key: &'static str },

    #[error("environment variable {key}='{value}' is invalid: {reason}")]
    InvalidEnvVar {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let cases = [
            (
                ConfigError::InvalidShopDomain {
                    domain: "evil.example.com".to_string(),
                },
                "evil.example.com",
            ),
            (
                ConfigError::InvalidApiVersion {
                    version: "2024-02".to_string(),
                },
                "2024-02",
            ),
            (
                ConfigError::MissingEnvVar {
                    key: "SHOPIFY_API_SECRET",
                },
                "SHOPIFY_API_SECRET",
            ),
            (
                ConfigError::InvalidEnvVar {
                    key: "PORT",
                    value: "eighty".to_string(),
                    reason: "invalid digit found in string".to_string(),
                },
                "PORT='eighty'",
            ),
        ];

        for (error, needle) in cases {
            assert!(error.to_string().contains(needle), "{error}");
        }
    }

    #[test]
    fn test_missing_env_var_points_at_env_example() {
        let error = ConfigError::MissingEnvVar {
            key: "DATABASE_URL",
        };
        assert!(error.to_string().contains(".env.example"));
    }
}
