//! Query parameters of the OAuth callback.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Query string Shopify sends to `/auth/callback`.
///
/// Missing parameters deserialize as empty strings so the route can answer
/// with a precise error instead of a generic rejection. Parameters not
/// listed here end up in `extra` and still count towards the signature.
///
/// ```rust
/// use shopify_app::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::new(
///     "code".to_string(),
///     "shop.myshopify.com".to_string(),
///     "1700000000".to_string(),
///     "nonce".to_string(),
///     String::new(),
///     "ignored".to_string(),
/// );
/// assert_eq!(
///     query.to_signable_string(),
///     "code=code&shop=shop.myshopify.com&state=nonce&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthQuery {
    /// Authorization code to exchange for a token.
    #[serde(default)]
    pub code: String,
    /// Shop domain.
    #[serde(default)]
    pub shop: String,
    /// Unix timestamp of the redirect.
    #[serde(default)]
    pub timestamp: String,
    /// The nonce sent in the authorize URL.
    #[serde(default)]
    pub state: String,
    /// Base64 encoded admin host, used by App Bridge.
    #[serde(default)]
    pub host: String,
    /// Hex HMAC-SHA256 of the other parameters.
    #[serde(default)]
    pub hmac: String,
    /// Any other parameters.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl AuthQuery {
    /// Builds a query from its named parameters.
    #[must_use]
    pub fn new(
        code: String,
        shop: String,
        timestamp: String,
        state: String,
        host: String,
        hmac: String,
    ) -> Self {
        Self {
            code,
            shop,
            timestamp,
            state,
            host,
            hmac,
            extra: BTreeMap::new(),
        }
    }

    /// The message the `hmac` parameter signs.
    ///
    /// All parameters except `hmac` and `signature`, sorted by key and
    /// joined as `key=value` with `&`. Empty named parameters are left out.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let named = [
            ("code", self.code.as_str()),
            ("host", self.host.as_str()),
            ("shop", self.shop.as_str()),
            ("state", self.state.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ];

        let mut params: BTreeMap<&str, &str> = named
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        params.extend(
            self.extra
                .iter()
                .filter(|(key, _)| key.as_str() != "hmac" && key.as_str() != "signature")
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        params
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
