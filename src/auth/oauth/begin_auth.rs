//! Authorization URL generation.
//!
//! [`begin_auth`] is the first step of the install flow: it generates the
//! state nonce and the Shopify authorize URL the merchant is redirected to.

use crate::auth::oauth::state::StateParam;
use crate::auth::AuthScopes;
use crate::config::{HostUrl, ShopDomain, ShopifyConfig};

/// Result of starting an authorization.
///
/// `state` must be persisted (the server stores it as a `state-{nonce}`
/// session record) and checked again when the callback arrives.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// Shopify authorize URL to redirect the merchant to.
    pub auth_url: String,

    /// The nonce embedded in `auth_url`.
    pub state: StateParam,

    /// The callback URL embedded in `auth_url`. It must be whitelisted in
    /// the Partner Dashboard.
    pub redirect_uri: String,
}

/// Builds the authorize URL for `shop`.
///
/// `redirect_uri` is `app_url` (trailing slashes removed) followed by
/// `redirect_path`. Online requests add `grant_options[]=per-user`.
/// `scope_override` replaces the configured scopes.
///
/// # Example
///
/// ```rust
/// use shopify_app::{ShopifyConfig, ApiKey, ApiSecretKey, ShopDomain, HostUrl};
/// use shopify_app::auth::oauth::begin_auth;
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .scopes("read_products".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let app_url = HostUrl::new("https://myapp.example.com/").unwrap();
/// let shop = ShopDomain::new("test-shop").unwrap();
///
/// let result = begin_auth(&config, &app_url, &shop, "/auth/callback", false, None);
/// assert!(result
///     .auth_url
///     .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?client_id=api-key"));
/// assert_eq!(result.redirect_uri, "https://myapp.example.com/auth/callback");
/// ```
#[must_use]
pub fn begin_auth(
    config: &ShopifyConfig,
    app_url: &HostUrl,
    shop: &ShopDomain,
    redirect_path: &str,
    is_online: bool,
    scope_override: Option<&AuthScopes>,
) -> BeginAuthResult {
    let state = StateParam::new();
    let scopes = scope_override.unwrap_or_else(|| config.scopes());
    let redirect_uri = format!("{}{}", app_url.origin(), redirect_path);

    let mut params = vec![
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", scopes.compressed()),
        ("redirect_uri", redirect_uri.clone()),
        ("state", state.to_string()),
    ];
    if is_online {
        params.push(("grant_options[]", "per-user".to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!("https://{shop}/admin/oauth/authorize?{query_string}");

    BeginAuthResult {
        auth_url,
        state,
        redirect_uri,
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};

    fn create_test_config() -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .scopes("read_products,write_orders".parse().unwrap())
            .build()
            .unwrap()
    }

    fn run(is_online: bool, scopes: Option<&AuthScopes>) -> BeginAuthResult {
        begin_auth(
            &create_test_config(),
            &HostUrl::new("https://myapp.example.com//").unwrap(),
            &ShopDomain::new("test-shop").unwrap(),
            "/auth/callback",
            is_online,
            scopes,
        )
    }

    #[test]
    fn test_begin_auth_generates_correct_url() {
        let result = run(false, None);

        let expected = format!(
            "https://test-shop.myshopify.com/admin/oauth/authorize?client_id=test-api-key\
             &scope=read_products%2Cwrite_orders\
             &redirect_uri=https%3A%2F%2Fmyapp.example.com%2Fauth%2Fcallback\
             &state={}",
            result.state
        );
        assert_eq!(result.auth_url, expected);
        assert_eq!(result.redirect_uri, "https://myapp.example.com/auth/callback");
    }

    #[test]
    fn test_begin_auth_sets_grant_options_only_for_online() {
        assert!(run(true, None)
            .auth_url
            .ends_with("&grant_options%5B%5D=per-user"));
        assert!(!run(false, None).auth_url.contains("grant_options"));
    }

    #[test]
    fn test_begin_auth_uses_scope_override() {
        let custom: AuthScopes = "read_customers".parse().unwrap();
        let result = run(false, Some(&custom));
        assert!(result.auth_url.contains("scope=read_customers&"));
        assert!(!result.auth_url.contains("write_orders"));
    }

    #[test]
    fn test_begin_auth_generates_fresh_state() {
        assert_ne!(run(false, None).state, run(false, None).state);
    }
}
