//! Webhook error types.

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised while verifying or handling a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The `X-Shopify-Hmac-Sha256` header is missing or does not match the body.
    ///
    /// The message is intentionally generic.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// The body is not the JSON object Shopify sends.
    #[error("Invalid webhook payload: {reason}")]
    InvalidPayload {
        /// Why the payload was rejected.
        reason: String,
    },

    /// The payload does not name a valid shop.
    #[error("Missing shop in webhook payload")]
    MissingShop,

    /// Deleting the shop's data failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebhookError>();
};
