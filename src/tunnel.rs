//! Public app URL discovery.
//!
//! During development the app usually runs behind an ngrok tunnel whose URL
//! changes on every restart. The local ngrok agent lists its tunnels at
//! `http://localhost:4040/api/tunnels`, so the URL is looked up per request
//! instead of being configured.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{AppConfig, HostUrl};
use crate::error::ConfigError;

/// How long to wait for the ngrok agent before giving up.
pub const NGROK_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors raised while asking the ngrok agent for its tunnels.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The agent could not be reached or returned an unreadable body.
    #[error("ngrok API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The agent answered with a non-2xx status.
    #[error("ngrok API returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// A tunnel's `public_url` is not a usable URL.
    #[error(transparent)]
    InvalidUrl(#[from] ConfigError),
}

#[derive(Debug, Default, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

#[derive(Debug, Deserialize)]
struct Tunnel {
    #[serde(default)]
    proto: String,
    #[serde(default)]
    public_url: String,
}

/// Asks the ngrok agent at `api_url` for its public URL.
///
/// An `https` tunnel is preferred over an `http` one. Returns `Ok(None)` when
/// the agent runs without a matching tunnel.
///
/// # Errors
///
/// Returns [`TunnelError`] when the agent is unreachable, answers with an
/// error status or reports a malformed URL.
pub async fn fetch_ngrok_url(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<Option<HostUrl>, TunnelError> {
    let response = client.get(api_url).timeout(NGROK_TIMEOUT).send().await?;

    if !response.status().is_success() {
        return Err(TunnelError::Status {
            status: response.status().as_u16(),
        });
    }

    let list: TunnelList = response.json().await?;
    let pick = |proto: &str| {
        list.tunnels
            .iter()
            .find(|t| t.proto == proto && !t.public_url.is_empty())
    };

    pick("https")
        .or_else(|| pick("http"))
        .map(|t| HostUrl::new(t.public_url.as_str()))
        .transpose()
        .map_err(TunnelError::from)
}

/// Like [`fetch_ngrok_url`], but any failure means "no tunnel".
pub async fn get_ngrok_url(client: &reqwest::Client, api_url: &str) -> Option<HostUrl> {
    match fetch_ngrok_url(client, api_url).await {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "ngrok tunnel lookup failed");
            None
        }
    }
}

/// Picks the public base URL of the app.
///
/// In order:
/// 1. the ngrok tunnel (skipped in production)
/// 2. `APP_URL`
/// 3. `request_origin`, built from the `Host` and `X-Forwarded-Proto` headers
/// 4. [`AppConfig::fallback_app_url`]
///
/// # Errors
///
/// Returns [`ConfigError::InvalidHostUrl`] only when every source is missing
/// and `HOST` does not form a URL.
pub async fn resolve_app_url(
    client: &reqwest::Client,
    config: &AppConfig,
    request_origin: Option<&str>,
) -> Result<HostUrl, ConfigError> {
    if !config.env().is_production() {
        if let Some(url) = get_ngrok_url(client, config.ngrok_api_url()).await {
            debug!(app_url = %url, "using ngrok tunnel URL");
            return Ok(url);
        }
    }

    if let Some(url) = config.app_url() {
        return Ok(url.clone());
    }

    if let Some(url) = request_origin.and_then(|origin| HostUrl::new(origin).ok()) {
        return Ok(url);
    }

    config.fallback_app_url()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, AppEnv, ShopifyConfig, StorageBackend};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(ngrok_api_url: &str) -> AppConfig {
        let shopify = ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build()
            .unwrap();
        AppConfig::new(shopify, StorageBackend::Memory)
            .with_env(AppEnv::Development)
            .with_ngrok_api_url(ngrok_api_url)
    }

    async fn ngrok_agent(tunnels: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tunnels))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_prefers_https_tunnel() {
        let server = ngrok_agent(json!({
            "tunnels": [
                {"proto": "http", "public_url": "http://abc.ngrok.app"},
                {"proto": "https", "public_url": "https://abc.ngrok.app"}
            ]
        }))
        .await;

        let url = get_ngrok_url(&reqwest::Client::new(), &format!("{}/api/tunnels", server.uri()))
            .await
            .unwrap();
        assert_eq!(url.origin(), "https://abc.ngrok.app");
    }

    #[tokio::test]
    async fn test_falls_back_to_http_tunnel() {
        let server = ngrok_agent(json!({
            "tunnels": [{"proto": "http", "public_url": "http://abc.ngrok.app"}]
        }))
        .await;

        let url = get_ngrok_url(&reqwest::Client::new(), &format!("{}/api/tunnels", server.uri()))
            .await
            .unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[tokio::test]
    async fn test_no_tunnels_is_none() {
        let server = ngrok_agent(json!({"tunnels": []})).await;
        let client = reqwest::Client::new();

        let result = fetch_ngrok_url(&client, &format!("{}/api/tunnels", server.uri())).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result =
            fetch_ngrok_url(&reqwest::Client::new(), &format!("{}/api/tunnels", server.uri())).await;
        assert!(matches!(result, Err(TunnelError::Status { status: 502 })));
    }

    #[tokio::test]
    async fn test_resolve_prefers_tunnel_over_app_url() {
        let server = ngrok_agent(json!({
            "tunnels": [{"proto": "https", "public_url": "https://tunnel.ngrok.app"}]
        }))
        .await;
        let config = config(&format!("{}/api/tunnels", server.uri()))
            .with_app_url(HostUrl::new("https://app.example.com").unwrap());

        let url = resolve_app_url(&reqwest::Client::new(), &config, None)
            .await
            .unwrap();
        assert_eq!(url.origin(), "https://tunnel.ngrok.app");
    }

    #[tokio::test]
    async fn test_resolve_skips_tunnel_in_production() {
        let server = ngrok_agent(json!({
            "tunnels": [{"proto": "https", "public_url": "https://tunnel.ngrok.app"}]
        }))
        .await;
        let config = config(&format!("{}/api/tunnels", server.uri()))
            .with_env(AppEnv::Production)
            .with_app_url(HostUrl::new("https://app.example.com").unwrap());

        let url = resolve_app_url(&reqwest::Client::new(), &config, None)
            .await
            .unwrap();
        assert_eq!(url.origin(), "https://app.example.com");
    }

    #[tokio::test]
    async fn test_resolve_uses_request_origin_then_fallback() {
        let server = ngrok_agent(json!({"tunnels": []})).await;
        let config = config(&format!("{}/api/tunnels", server.uri()));
        let client = reqwest::Client::new();

        let url = resolve_app_url(&client, &config, Some("https://proxy.example.com"))
            .await
            .unwrap();
        assert_eq!(url.origin(), "https://proxy.example.com");

        let url = resolve_app_url(&client, &config, None).await.unwrap();
        assert_eq!(url.origin(), "http://localhost:3000");
    }
}
