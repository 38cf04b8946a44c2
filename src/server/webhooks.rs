//! Webhook routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use crate::server::{ApiError, ApiResult, AppState};
use crate::webhooks::{handle_compliance, handle_uninstall, parse_payload, verify_webhook, WebhookRequest};

/// `POST /app/uninstall`
pub async fn app_uninstall(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let request = WebhookRequest::from_parts(&headers, body.to_vec());
    let context = verify_webhook(state.config.shopify(), &request)?;
    debug!(webhook_id = ?context.webhook_id, "uninstall webhook verified");

    let payload = parse_payload(&request.body)?;
    handle_uninstall(state.storage.as_ref(), &payload).await?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /webhooks`, dispatched on `X-Shopify-Topic`.
pub async fn compliance(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let request = WebhookRequest::from_parts(&headers, body.to_vec());
    let context = verify_webhook(state.config.shopify(), &request)?;
    debug!(
        topic = %context.topic,
        webhook_id = ?context.webhook_id,
        api_version = ?context.api_version,
        shop = ?context.shop_domain,
        "webhook verified"
    );

    let payload = parse_payload(&request.body)?;
    handle_compliance(state.storage.as_ref(), &context.topic, &payload).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
