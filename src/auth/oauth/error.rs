//! OAuth error types.
//!
//! ```rust
//! use shopify_app::auth::oauth::OAuthError;
//!
//! let error = OAuthError::StateMismatch {
//!     expected: "abc123".to_string(),
//!     received: "xyz789".to_string(),
//! };
//! assert!(error.to_string().contains("abc123"));
//! ```

use thiserror::Error;

/// Errors that can occur during the install flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The callback's `hmac` parameter does not match its other parameters.
    #[error("callback signature does not match")]
    InvalidHmac,

    /// The callback's `state` is not the one issued at login, or the state
    /// record has expired.
    #[error("state '{received}' was not issued for this login (expected '{expected}')")]
    StateMismatch {
        /// The state value that was issued.
        expected: String,
        /// The state value received in the callback.
        received: String,
    },

    /// The token endpoint answered with a non-success status.
    #[error("Shopify rejected the authorization code ({status}): {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The response body.
        message: String,
    },

    /// Callback parameters are missing or malformed.
    #[error("invalid OAuth callback: {reason}")]
    InvalidCallback {
        /// What is wrong with the callback.
        reason: String,
    },

    /// The token endpoint could not be reached or returned an unreadable body.
    #[error("could not reach the token endpoint: {0}")]
    Network(#[from] reqwest::Error),
}

impl OAuthError {
    /// Returns `true` for failures caused by the incoming request rather
    /// than by Shopify.
    #[must_use]
    pub const fn is_rejected_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidHmac | Self::StateMismatch { .. } | Self::InvalidCallback { .. }
        )
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
