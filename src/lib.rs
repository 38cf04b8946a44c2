//! # Shopify Embedded App
//!
//! Server side of a Shopify embedded app: the OAuth install flow, the
//! uninstall and GDPR compliance webhooks, session persistence and the
//! app's HTML pages.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`ShopifyConfig`], [`ShopifyConfigBuilder`]
//!   and [`AppConfig`] (loaded from environment variables)
//! - Validated newtypes for API credentials and domain values
//! - OAuth scope handling with implied scope support
//! - OAuth 2.0 authorization code flow via [`auth::oauth`]
//! - Webhook verification and handling via [`webhooks`]
//! - Session and app data storage via [`storage`], backed by MongoDB or memory
//! - An Admin GraphQL client via [`clients`]
//! - ngrok tunnel discovery via [`tunnel`]
//! - The axum router via [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app::{ShopifyConfig, ApiKey, ApiSecretKey, ApiVersion};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .api_version(ApiVersion::V2024_07)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.scopes().compressed(), "read_products,write_orders");
//! ```
//!
//! ## Running the Server
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_app::server::{router, AppState};
//! use shopify_app::storage::MemoryStorage;
//! use shopify_app::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! let state = AppState::new(config, Arc::new(MemoryStorage::new()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router(state)).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is passed explicitly
//! - **Fail-fast validation**: newtypes validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: built on tokio and axum

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod tunnel;
pub mod webhooks;

pub use auth::{AccessTokenResponse, AssociatedUser, AuthScopes, Session};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppEnv, HostUrl, ShopDomain, ShopifyConfig,
    ShopifyConfigBuilder, StorageBackend,
};
pub use error::ConfigError;

pub use auth::oauth::{begin_auth, validate_auth_callback, AuthQuery, BeginAuthResult, OAuthError};
pub use clients::{GraphqlClient, GraphqlError, ShopInfo};
pub use storage::{MemoryStorage, MongoStorage, Storage, StorageError};
pub use webhooks::{WebhookError, WebhookTopic};
