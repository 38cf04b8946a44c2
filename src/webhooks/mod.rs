//! Incoming webhooks: verification and handling.
//!
//! # Overview
//!
//! - [`verify_webhook`] / [`verify_hmac`]: signature checks with key rotation
//! - [`WebhookTopic`]: the topics the app acts on
//! - [`handle_uninstall`]: `app/uninstalled`, removes all of a shop's data
//! - [`handle_compliance`]: the mandatory privacy topics
//!   (`customers/data_request`, `customers/redact`, `shop/redact`)
//! - [`WebhookError`]: verification and handling failures
//!
//! # Example
//!
//! ```rust,ignore
//! let request = WebhookRequest::from_parts(&headers, body);
//! let context = verify_webhook(&config, &request)?;
//! let payload = parse_payload(&request.body)?;
//! let outcome = handle_compliance(storage.as_ref(), &context.topic, &payload).await?;
//! ```

mod errors;
mod handlers;
mod topics;
mod verification;

pub use errors::WebhookError;
pub use handlers::{
    compliance_shop, handle_compliance, handle_uninstall, parse_payload, uninstall_shop,
    WebhookOutcome,
};
pub use topics::WebhookTopic;
pub use verification::{
    verify_hmac, verify_webhook, WebhookContext, WebhookRequest, HEADER_API_VERSION,
    HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
