//! OAuth 2.0 authorization code flow used to install the app.
//!
//! 1. **Authorization Initiation** ([`begin_auth`]): generate the state nonce
//!    and the authorize URL the merchant is redirected to.
//! 2. **Callback Validation** ([`validate_auth_callback`]): verify the
//!    callback signature and state, then exchange the code for an access token.
//!
//! # Security Features
//!
//! - **HMAC Validation**: callbacks are verified with HMAC-SHA256
//! - **CSRF Protection**: the `state` parameter must match the issued nonce
//! - **Constant-Time Comparison**: signatures and states are compared in
//!   constant time
//! - **Key Rotation Support**: an old API secret is accepted while a rotation
//!   is in progress
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_app::auth::oauth::{begin_auth, validate_auth_callback, AuthQuery};
//!
//! // Login: redirect the merchant and remember the nonce.
//! let result = begin_auth(&config, &app_url, &shop, "/auth/callback", false, None);
//! storage
//!     .store_session(&Session::state_record(shop, result.state.as_ref(), ttl))
//!     .await?;
//!
//! // Callback: validate and persist the offline token.
//! let session = validate_auth_callback(&http, &config, &query, &stored_state).await?;
//! storage.store_session(&session).await?;
//! ```

mod auth_query;
mod begin_auth;
mod error;
pub mod hmac;
mod state;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::{begin_auth, BeginAuthResult};
pub use error::OAuthError;
pub use hmac::{compute_signature, compute_signature_base64, constant_time_compare, validate_hmac};
pub use state::StateParam;
pub use validate_callback::validate_auth_callback;
