//! OAuth callback validation and code-for-token exchange.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_app::auth::oauth::{validate_auth_callback, AuthQuery};
//!
//! let session = validate_auth_callback(&http, &config, &query, &stored_state).await?;
//! storage.store_session(&session).await?;
//! ```

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::AuthQuery;
use crate::auth::session::AccessTokenResponse;
use crate::auth::Session;
use crate::config::{ShopDomain, ShopifyConfig};
use reqwest::header::USER_AGENT;

#[derive(serde::Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Validates an OAuth callback and exchanges its code for an access token.
///
/// 1. The `hmac` parameter is checked with the primary secret, then the old one.
/// 2. `state` must equal `expected_state` (constant-time).
/// 3. `shop` must be a valid shop domain.
/// 4. `{client_id, client_secret, code}` is POSTed to
///    `{admin_origin}/admin/oauth/access_token`.
///
/// # Errors
///
/// - [`OAuthError::InvalidHmac`]: the signature does not match
/// - [`OAuthError::StateMismatch`]: the state is not the one issued
/// - [`OAuthError::InvalidCallback`]: the code or shop is missing or invalid
/// - [`OAuthError::TokenExchangeFailed`]: Shopify rejected the code
/// - [`OAuthError::Network`]: Shopify could not be reached
pub async fn validate_auth_callback(
    client: &reqwest::Client,
    config: &ShopifyConfig,
    auth_query: &AuthQuery,
    expected_state: &str,
) -> Result<Session, OAuthError> {
    if !validate_hmac(auth_query, config) {
        return Err(OAuthError::InvalidHmac);
    }

    if !constant_time_compare(&auth_query.state, expected_state) {
        return Err(OAuthError::StateMismatch {
            expected: expected_state.to_string(),
            received: auth_query.state.clone(),
        });
    }

    let shop = ShopDomain::new(&auth_query.shop).map_err(|_| OAuthError::InvalidCallback {
        reason: format!("Invalid shop domain: {}", auth_query.shop),
    })?;

    if auth_query.code.is_empty() {
        return Err(OAuthError::InvalidCallback {
            reason: "Missing authorization code".to_string(),
        });
    }

    let token = request_access_token(client, config, &shop, &auth_query.code).await?;
    Ok(Session::from_access_token_response(shop, &token))
}

async fn request_access_token(
    client: &reqwest::Client,
    config: &ShopifyConfig,
    shop: &ShopDomain,
    code: &str,
) -> Result<AccessTokenResponse, OAuthError> {
    tracing::debug!(shop = %shop, "exchanging authorization code");

    let response = client
        .post(format!("{}/admin/oauth/access_token", config.admin_origin(shop)))
        .header(USER_AGENT, config.user_agent())
        .json(&TokenExchangeRequest {
            client_id: config.api_key().as_ref(),
            client_secret: config.api_secret_key().as_ref(),
            code,
        })
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(OAuthError::TokenExchangeFailed {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::hmac::compute_signature;
    use crate::config::{ApiKey, ApiSecretKey};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str) -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
            .admin_api_base_url(base_url)
            .build()
            .unwrap()
    }

    fn signed_query(secret: &str) -> AuthQuery {
        let mut query = AuthQuery::new(
            "auth-code-123".to_string(),
            "test-shop.myshopify.com".to_string(),
            "1700000000".to_string(),
            "test-state".to_string(),
            "dGVzdC1ob3N0".to_string(),
            String::new(),
        );
        query.hmac = compute_signature(&query.to_signable_string(), secret);
        query
    }

    async fn mount_token_endpoint(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/admin/oauth/access_token"))
            .and(body_json(serde_json::json!({
                "client_id": "test-api-key",
                "client_secret": "test-secret",
                "code": "auth-code-123"
            })))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_returns_offline_session_on_success() {
        let server = MockServer::start().await;
        mount_token_endpoint(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "shpat_new",
                "scope": "read_products,write_orders"
            })),
        )
        .await;

        let config = config_for(&server.uri());
        let query = signed_query("test-secret");

        let session = validate_auth_callback(&reqwest::Client::new(), &config, &query, "test-state")
            .await
            .unwrap();

        assert_eq!(session.id, "offline_test-shop.myshopify.com");
        assert_eq!(session.shop.as_ref(), "test-shop.myshopify.com");
        assert_eq!(session.access_token, "shpat_new");
        assert!(session.scopes.iter().any(|s| s == "write_orders"));
        assert!(session.is_active());
    }

    #[tokio::test]
    async fn test_accepts_hmac_signed_with_old_secret() {
        let server = MockServer::start().await;
        mount_token_endpoint(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "t", "scope": ""})),
        )
        .await;

        let config = config_for(&server.uri());
        let query = signed_query("old-secret");

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config, &query, "test-state").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_invalid_hmac() {
        let config = config_for("http://127.0.0.1:9");
        let mut query = signed_query("test-secret");
        query.hmac = "invalid-hmac".to_string();

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config, &query, "test-state").await;
        assert!(matches!(result, Err(OAuthError::InvalidHmac)));
    }

    #[tokio::test]
    async fn test_rejects_state_mismatch() {
        let config = config_for("http://127.0.0.1:9");
        let query = signed_query("test-secret");

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config, &query, "wrong-state").await;

        match result {
            Err(OAuthError::StateMismatch { expected, received }) => {
                assert_eq!(expected, "wrong-state");
                assert_eq!(received, "test-state");
            }
            other => panic!("Expected StateMismatch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_shop() {
        let config = config_for("http://127.0.0.1:9");
        let mut query = signed_query("test-secret");
        query.shop = "evil.example.com".to_string();
        query.hmac = compute_signature(&query.to_signable_string(), "test-secret");

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config, &query, "test-state").await;

        match result {
            Err(OAuthError::InvalidCallback { reason }) => {
                assert!(reason.contains("Invalid shop domain"));
            }
            other => panic!("Expected InvalidCallback error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reports_token_endpoint_rejection() {
        let server = MockServer::start().await;
        mount_token_endpoint(
            &server,
            ResponseTemplate::new(400).set_body_string("invalid_request: code already used"),
        )
        .await;

        let config = config_for(&server.uri());
        let query = signed_query("test-secret");

        let result =
            validate_auth_callback(&reqwest::Client::new(), &config, &query, "test-state").await;

        match result {
            Err(OAuthError::TokenExchangeFailed { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("code already used"));
            }
            other => panic!("Expected TokenExchangeFailed error, got {other:?}"),
        }
    }
}
