//! Webhook signature verification.
//!
//! Shopify signs every webhook with HMAC-SHA256 of the raw body, keyed with
//! the app's client secret, and sends the base64 digest in
//! `X-Shopify-Hmac-Sha256`. The body must be checked before it is parsed.
//!
//! # Example
//!
//! ```rust
//! use axum::http::{HeaderMap, HeaderName};
//! use shopify_app::auth::oauth::hmac::compute_signature_base64;
//! use shopify_app::webhooks::{verify_webhook, WebhookRequest, WebhookTopic, HEADER_HMAC, HEADER_TOPIC};
//! use shopify_app::{ApiKey, ApiSecretKey, ShopifyConfig};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("test-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let body = br#"{"shop_domain":"example.myshopify.com"}"#;
//! let mut headers = HeaderMap::new();
//! let name = |h: &str| HeaderName::from_bytes(h.as_bytes()).unwrap();
//! headers.insert(name(HEADER_HMAC), compute_signature_base64(body, "my-secret").parse().unwrap());
//! headers.insert(name(HEADER_TOPIC), "shop/redact".parse().unwrap());
//!
//! let request = WebhookRequest::from_parts(&headers, body.to_vec());
//! let context = verify_webhook(&config, &request).unwrap();
//! assert_eq!(context.topic, WebhookTopic::ShopRedact);
//! ```

use axum::http::HeaderMap;

use crate::auth::oauth::hmac::{compute_signature_base64, constant_time_compare};
use crate::config::ShopifyConfig;
use crate::webhooks::{WebhookError, WebhookTopic};

/// Base64 HMAC-SHA256 of the raw body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";

/// Topic that triggered the webhook, e.g. `shop/redact`.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// `*.myshopify.com` domain of the shop.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// API version of the payload format.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// Unique id of the delivery.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// An incoming webhook before verification.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Raw body, exactly as received.
    pub body: Vec<u8>,
    /// `X-Shopify-Hmac-Sha256`, empty when absent.
    pub hmac: String,
    /// Shopify headers carried over to the [`WebhookContext`].
    pub context: WebhookContext,
}

/// Delivery metadata taken from the Shopify headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookContext {
    /// An absent topic header is an empty [`WebhookTopic::Other`].
    pub topic: WebhookTopic,
    pub shop_domain: Option<String>,
    pub api_version: Option<String>,
    pub webhook_id: Option<String>,
}

impl WebhookRequest {
    /// Collects the Shopify headers and the raw body.
    ///
    /// Header values that are not visible ASCII are treated as absent.
    #[must_use]
    pub fn from_parts(headers: &HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            body: body.into(),
            hmac: header(HEADER_HMAC).unwrap_or_default(),
            context: WebhookContext {
                topic: WebhookTopic::from(header(HEADER_TOPIC).unwrap_or_default().as_str()),
                shop_domain: header(HEADER_SHOP_DOMAIN),
                api_version: header(HEADER_API_VERSION),
                webhook_id: header(HEADER_WEBHOOK_ID),
            },
        }
    }
}

/// Checks `hmac_header` against the body with a single secret.
///
/// ```rust
/// use shopify_app::webhooks::verify_hmac;
/// use shopify_app::auth::oauth::hmac::compute_signature_base64;
///
/// let hmac = compute_signature_base64(b"payload", "secret");
/// assert!(verify_hmac(b"payload", &hmac, "secret"));
/// assert!(!verify_hmac(b"payload", "", "secret"));
/// ```
#[must_use]
pub fn verify_hmac(raw_body: &[u8], hmac_header: &str, secret: &str) -> bool {
    !hmac_header.is_empty()
        && constant_time_compare(&compute_signature_base64(raw_body, secret), hmac_header.trim())
}

/// Verifies a webhook against every accepted secret.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidHmac`] if no secret matches, including
/// when the header is missing.
pub fn verify_webhook<'a>(
    config: &ShopifyConfig,
    request: &'a WebhookRequest,
) -> Result<&'a WebhookContext, WebhookError> {
    if config
        .secrets()
        .any(|secret| verify_hmac(&request.body, &request.hmac, secret))
    {
        Ok(&request.context)
    } else {
        Err(WebhookError::InvalidHmac)
    }
}
