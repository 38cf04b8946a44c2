//! HTTP error mapping.
//!
//! Handlers return [`ApiResult`]. Webhook failures answer with a JSON body
//! (`{"error": "..."}`), which is what Shopify's delivery logs display. All
//! other failures answer with plain text.
//!
//! | Error | Status |
//! |---|---|
//! | [`ApiError::BadRequest`] | 400 |
//! | [`OAuthError`] rejected request (HMAC, state, callback) | 401 |
//! | [`OAuthError`] token exchange or network | 502 |
//! | [`WebhookError::InvalidHmac`] | 401 |
//! | [`WebhookError::InvalidPayload`] / [`WebhookError::MissingShop`] | 400 |
//! | storage and configuration failures | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::oauth::OAuthError;
use crate::error::ConfigError;
use crate::storage::StorageError;
use crate::webhooks::WebhookError;

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a route handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request parameter is missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The OAuth callback was rejected or the token exchange failed.
    #[error("OAuth callback failed: {0}")]
    OAuth(#[from] OAuthError),

    /// A webhook could not be verified or handled.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The app URL could not be determined.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The route exists but not for this method. Answered as JSON.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::OAuth(e) if e.is_rejected_request() => StatusCode::UNAUTHORIZED,
            Self::OAuth(_) => StatusCode::BAD_GATEWAY,
            Self::Webhook(WebhookError::InvalidHmac) => StatusCode::UNAUTHORIZED,
            Self::Webhook(WebhookError::InvalidPayload { .. } | WebhookError::MissingShop) => {
                StatusCode::BAD_REQUEST
            }
            Self::Webhook(WebhookError::Storage(_)) | Self::Storage(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        match self {
            Self::Webhook(e) => {
                let message = match e {
                    WebhookError::InvalidHmac => "Invalid signature",
                    WebhookError::InvalidPayload { .. } => "Invalid payload",
                    WebhookError::MissingShop => "Missing shop",
                    WebhookError::Storage(_) => "Internal server error",
                };
                (status, Json(json!({ "error": message }))).into_response()
            }
            Self::MethodNotAllowed => {
                (status, Json(json!({ "error": "Method not allowed" }))).into_response()
            }
            Self::Storage(_) | Self::Config(_) => {
                (status, "Internal server error").into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
