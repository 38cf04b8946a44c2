//! GraphQL client for the Shopify Admin API.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::clients::graphql::GraphqlError;
use crate::config::{ApiVersion, ShopDomain, ShopifyConfig};

/// Wait between attempts when the response carries no `Retry-After`.
pub const RETRY_WAIT_TIME: Duration = Duration::from_secs(1);

/// Longest wait taken from a `Retry-After` header.
pub const MAX_RETRY_WAIT_TIME: Duration = Duration::from_secs(60);

/// Header carrying the offline or online access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Admin GraphQL API client bound to one shop's session.
///
/// Requests go to `{origin}/admin/api/{version}/graphql.json`, where `origin`
/// is `https://{shop}` unless [`ShopifyConfig::admin_origin`] is overridden.
///
/// The `reqwest::Client` is passed in so the server's connection pool is
/// shared.
///
/// # Example
///
/// ```rust,ignore
/// let client = GraphqlClient::new(&session, &config, http.clone());
/// let body = client.query("query { shop { name } }", None).await?;
/// println!("{}", body["data"]["shop"]["name"]);
/// ```
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    shop: ShopDomain,
    endpoint: String,
    access_token: String,
    user_agent: String,
    api_version: ApiVersion,
    tries: u32,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a client using the configured API version.
    #[must_use]
    pub fn new(session: &Session, config: &ShopifyConfig, http: reqwest::Client) -> Self {
        let api_version = *config.api_version();
        let endpoint = format!(
            "{}/admin/api/{api_version}/graphql.json",
            config.admin_origin(&session.shop)
        );

        Self {
            http,
            shop: session.shop.clone(),
            endpoint,
            access_token: session.access_token.clone(),
            user_agent: config.user_agent(),
            api_version,
            tries: 1,
        }
    }

    /// Sets how many attempts are made when Shopify answers 429 or 500.
    ///
    /// The default is 1, which means no retries.
    #[must_use]
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries.max(1);
        self
    }

    /// Returns the shop the client talks to.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    /// Returns the API version in the request path.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the full GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a query and returns the whole response body (`data`, `extensions`).
    ///
    /// # Errors
    ///
    /// - [`GraphqlError::Http`] for a non-2xx response
    /// - [`GraphqlError::MaxRetries`] when 429/500 responses exhaust the attempts
    /// - [`GraphqlError::Query`] when the body has a non-empty `errors` array
    /// - [`GraphqlError::Network`] for transport failures
    pub async fn query(&self, query: &str, variables: Option<Value>) -> Result<Value, GraphqlError> {
        let mut payload = json!({ "query": query });
        if let Some(variables) = variables {
            payload["variables"] = variables;
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let response = self
                .http
                .post(&self.endpoint)
                .header(ACCESS_TOKEN_HEADER, &self.access_token)
                .header(USER_AGENT, &self.user_agent)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&payload)
                .send()
                .await?;

            let status = response.status().as_u16();

            if response.status().is_success() {
                let body: Value = response.json().await?;
                return match body.get("errors") {
                    Some(errors) if errors.as_array().map_or(true, |e| !e.is_empty()) => {
                        Err(GraphqlError::Query {
                            message: errors.to_string(),
                        })
                    }
                    _ => Ok(body),
                };
            }

            let retryable = status == 429 || status == 500;
            if retryable && attempt < self.tries {
                let delay = retry_delay(status, response.headers());
                tracing::debug!(
                    shop = %self.shop,
                    status,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying Admin API request"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if retryable && self.tries > 1 {
                return Err(GraphqlError::MaxRetries {
                    status,
                    tries: self.tries,
                });
            }

            let error_reference = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let body = response.text().await.unwrap_or_default();

            return Err(GraphqlError::Http {
                status,
                body,
                error_reference,
            });
        }
    }
}

/// 429 honours `Retry-After` (seconds, capped at [`MAX_RETRY_WAIT_TIME`]).
/// 500 always waits the fixed delay.
fn retry_delay(status: u16, headers: &reqwest::header::HeaderMap) -> Duration {
    if status == 429 {
        if let Some(seconds) = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|v| Duration::try_from_secs_f64(v).ok())
        {
            return seconds.min(MAX_RETRY_WAIT_TIME);
        }
    }
    RETRY_WAIT_TIME
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};
    use reqwest::header::{HeaderMap, HeaderValue};

    fn session() -> Session {
        Session::new(
            "offline_gql.myshopify.com".to_string(),
            ShopDomain::new("gql").unwrap(),
            "shpat_token".to_string(),
            "read_products".parse().unwrap(),
            false,
            None,
        )
    }

    fn config() -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .api_version(ApiVersion::V2025_01)
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_uses_shop_and_version() {
        let client = GraphqlClient::new(&session(), &config(), reqwest::Client::new());
        assert_eq!(
            client.endpoint(),
            "https://gql.myshopify.com/admin/api/2025-01/graphql.json"
        );
        assert_eq!(client.api_version(), &ApiVersion::V2025_01);
    }

    #[test]
    fn test_with_tries_never_drops_below_one() {
        let client = GraphqlClient::new(&session(), &config(), reqwest::Client::new()).with_tries(0);
        assert_eq!(client.tries, 1);
    }

    #[test]
    fn test_retry_delay_reads_retry_after_for_429_only() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2.5"));

        assert_eq!(retry_delay(429, &headers), Duration::from_millis(2500));
        assert_eq!(retry_delay(500, &headers), RETRY_WAIT_TIME);
        assert_eq!(retry_delay(429, &HeaderMap::new()), RETRY_WAIT_TIME);
    }

    #[test]
    fn test_retry_delay_caps_oversized_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1e30"));
        assert_eq!(retry_delay(429, &headers), MAX_RETRY_WAIT_TIME);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("86400"));
        assert_eq!(retry_delay(429, &headers), MAX_RETRY_WAIT_TIME);

        for bad in ["-1", "NaN", "inf"] {
            headers.insert(RETRY_AFTER, HeaderValue::from_static(bad));
            assert_eq!(retry_delay(429, &headers), RETRY_WAIT_TIME, "{bad}");
        }
    }
}
