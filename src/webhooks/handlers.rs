//! What the app does with a verified webhook.
//!
//! Payloads are parsed as loose JSON. Only the fields that identify the shop
//! are read:
//!
//! | Topic | Shop field |
//! |---|---|
//! | `app/uninstalled` | `domain`, then `myshopify_domain` |
//! | compliance topics | `shop_domain`, then the part of `shop_email` after `@` |

use crate::config::ShopDomain;
use crate::storage::{ShopDataDeletion, Storage};
use crate::webhooks::{WebhookError, WebhookTopic};
use serde_json::Value;
use tracing::{info, warn};

/// Result of handling a webhook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The request was recorded in the log, nothing was deleted.
    Logged {
        /// Topic of the webhook.
        topic: WebhookTopic,
        /// Shop the webhook is about.
        shop: ShopDomain,
    },
    /// Every session and app data entry of the shop was deleted.
    ShopDataDeleted {
        /// Topic of the webhook.
        topic: WebhookTopic,
        /// Shop whose data was removed.
        shop: ShopDomain,
        /// What was removed.
        deleted: ShopDataDeletion,
    },
    /// The topic is not one the app subscribes to. It is acknowledged anyway.
    Unhandled {
        /// Topic of the webhook.
        topic: WebhookTopic,
    },
}

/// Parses a webhook body as a JSON object.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidPayload`] if the body is not JSON.
pub fn parse_payload(body: &[u8]) -> Result<Value, WebhookError> {
    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload {
        reason: e.to_string(),
    })
}

fn non_empty_str<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Shop named by an `app/uninstalled` payload (the shop object).
///
/// `domain` is often the shop's custom primary domain, in which case
/// `myshopify_domain` is used.
///
/// # Errors
///
/// Returns [`WebhookError::MissingShop`] if neither field holds a valid shop.
pub fn uninstall_shop(payload: &Value) -> Result<ShopDomain, WebhookError> {
    ["domain", "myshopify_domain"]
        .into_iter()
        .filter_map(|field| non_empty_str(payload, field))
        .find_map(|raw| ShopDomain::new(raw).ok())
        .ok_or(WebhookError::MissingShop)
}

/// Shop named by a compliance payload.
///
/// # Errors
///
/// Returns [`WebhookError::MissingShop`] if neither field holds a valid shop.
pub fn compliance_shop(payload: &Value) -> Result<ShopDomain, WebhookError> {
    let email_domain = non_empty_str(payload, "shop_email")
        .and_then(|email| email.split_once('@'))
        .map(|(_, domain)| domain);

    non_empty_str(payload, "shop_domain")
        .into_iter()
        .chain(email_domain)
        .find_map(|raw| ShopDomain::new(raw).ok())
        .ok_or(WebhookError::MissingShop)
}

/// Handles `app/uninstalled`: deletes every session and all app data of the shop.
///
/// # Errors
///
/// Returns [`WebhookError::MissingShop`] if the payload names no shop and
/// [`WebhookError::Storage`] if the deletion fails.
pub async fn handle_uninstall(
    storage: &dyn Storage,
    payload: &Value,
) -> Result<WebhookOutcome, WebhookError> {
    let shop = uninstall_shop(payload)?;
    let deleted = storage.delete_all_shop_data(&shop).await?;

    info!(
        shop = %shop,
        sessions = deleted.sessions,
        app_data = deleted.app_data,
        "app uninstalled, shop data deleted"
    );

    Ok(WebhookOutcome::ShopDataDeleted {
        topic: WebhookTopic::AppUninstalled,
        shop,
        deleted,
    })
}

/// Handles a webhook delivered to the compliance endpoint.
///
/// - `customers/data_request`: logged
/// - `customers/redact`: logged, the app keeps no customer data
/// - `shop/redact`: app data and sessions are deleted
/// - `app/uninstalled`: same as [`handle_uninstall`]
/// - anything else: logged as unhandled
///
/// # Errors
///
/// Returns [`WebhookError::MissingShop`] if the payload names no shop and
/// [`WebhookError::Storage`] if a deletion fails.
pub async fn handle_compliance(
    storage: &dyn Storage,
    topic: &WebhookTopic,
    payload: &Value,
) -> Result<WebhookOutcome, WebhookError> {
    if topic == &WebhookTopic::AppUninstalled {
        return handle_uninstall(storage, payload).await;
    }

    let shop = compliance_shop(payload)?;

    match topic {
        WebhookTopic::CustomersDataRequest => {
            info!(
                shop = %shop,
                customer_id = ?payload.pointer("/customer/id"),
                data_request_id = ?payload.pointer("/data_request/id"),
                "customer data request received"
            );
        }
        WebhookTopic::CustomersRedact => {
            info!(
                shop = %shop,
                customer_id = ?payload.pointer("/customer/id"),
                "customer redaction requested, no customer data stored"
            );
        }
        WebhookTopic::ShopRedact => {
            let deleted = storage.delete_all_shop_data(&shop).await?;
            info!(
                shop = %shop,
                sessions = deleted.sessions,
                app_data = deleted.app_data,
                "shop redacted"
            );
            return Ok(WebhookOutcome::ShopDataDeleted {
                topic: topic.clone(),
                shop,
                deleted,
            });
        }
        WebhookTopic::AppUninstalled | WebhookTopic::Other(_) => {
            warn!(shop = %shop, topic = %topic, "Unhandled webhook topic");
            return Ok(WebhookOutcome::Unhandled {
                topic: topic.clone(),
            });
        }
    }

    Ok(WebhookOutcome::Logged {
        topic: topic.clone(),
        shop,
    })
}
