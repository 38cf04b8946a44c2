//! Persisted OAuth sessions.
//!
//! A [`Session`] binds a shop to an access token. The same type also carries
//! the short-lived OAuth state records (`state-{nonce}`) that are written at
//! login and consumed by the callback.

use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of the ids under which OAuth state records are stored.
pub const STATE_ID_PREFIX: &str = "state-";

/// How long a login may take before its state record stops being accepted.
pub const STATE_TTL_MINUTES: i64 = 10;

/// An authenticated (or pending) session for one shop.
///
/// Field names serialize in camelCase (`accessToken`, `isOnline`,
/// `createdAt`), the layout already used by existing session collections.
///
/// # Example
///
/// ```rust
/// use shopify_app::{Session, ShopDomain};
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::new(
///     Session::offline_id(&shop),
///     shop,
///     "shpat_123".to_string(),
///     "read_products".parse().unwrap(),
///     false,
///     None,
/// );
///
/// assert_eq!(session.id, "offline_my-store.myshopify.com");
/// assert!(session.is_active());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier for this session.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// OAuth state nonce, set on state records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Granted scopes.
    #[serde(default, rename = "scope")]
    pub scopes: AuthScopes,

    /// When this session expires, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Admin API access token. Empty until the OAuth flow completes.
    #[serde(default)]
    pub access_token: String,

    /// Whether this is an online (user-specific) session.
    #[serde(default)]
    pub is_online: bool,

    /// When the record was first stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the record was last stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new session. Timestamps are filled in by the storage layer.
    #[must_use]
    pub const fn new(
        id: String,
        shop: ShopDomain,
        access_token: String,
        scopes: AuthScopes,
        is_online: bool,
        expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            shop,
            state: None,
            scopes,
            expires,
            access_token,
            is_online,
            created_at: None,
            updated_at: None,
        }
    }

    /// Id of the offline session for `shop`.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("offline_{shop}")
    }

    /// Id of the state record for `state`.
    #[must_use]
    pub fn state_id(state: &str) -> String {
        format!("{STATE_ID_PREFIX}{state}")
    }

    /// Builds the pending record written when a login starts.
    ///
    /// It has no access token, so it never shows up in
    /// `find_sessions_by_shop` and is never treated as an installed shop.
    #[must_use]
    pub fn state_record(shop: ShopDomain, state: &str, ttl: Duration) -> Self {
        Self {
            id: Self::state_id(state),
            shop,
            state: Some(state.to_string()),
            scopes: AuthScopes::new(),
            expires: Some(Utc::now() + ttl),
            access_token: String::new(),
            is_online: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Builds a session from a token endpoint response.
    ///
    /// Responses that carry an `associated_user` produce an online session
    /// keyed `{shop}_{user_id}`, everything else the offline session.
    #[must_use]
    pub fn from_access_token_response(shop: ShopDomain, response: &AccessTokenResponse) -> Self {
        let expires = response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        let (id, is_online) = match &response.associated_user {
            Some(user) => (format!("{shop}_{}", user.id), true),
            None => (Self::offline_id(&shop), false),
        };

        let scopes = response.scope.parse().unwrap_or_default();

        Self::new(
            id,
            shop,
            response.access_token.clone(),
            scopes,
            is_online,
            expires,
        )
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time never expire.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` once the OAuth flow has produced a token.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Returns `true` if the session can be used for API calls.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.has_access_token() && !self.expired()
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

/// User attached to an online access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// Shopify user id.
    pub id: u64,
    /// User email, when the app has access to it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Body returned by `POST /admin/oauth/access_token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token.
    pub access_token: String,
    /// Comma-separated granted scopes.
    #[serde(default)]
    pub scope: String,
    /// Lifetime in seconds, for expiring tokens.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Present for online tokens.
    #[serde(default)]
    pub associated_user: Option<AssociatedUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopDomain {
        ShopDomain::new("shop").unwrap()
    }

    fn with_expiry(access_token: &str, expires: Option<DateTime<Utc>>) -> Session {
        Session::new(
            "id".to_string(),
            shop(),
            access_token.to_string(),
            AuthScopes::new(),
            false,
            expires,
        )
    }

    #[test]
    fn test_session_expired() {
        assert!(with_expiry("token", Some(Utc::now() - Duration::hours(1))).expired());
        assert!(!with_expiry("token", Some(Utc::now() + Duration::hours(1))).expired());
        assert!(!with_expiry("token", None).expired());
    }

    #[test]
    fn test_session_is_active() {
        assert!(with_expiry("token", None).is_active());
        assert!(!with_expiry("", None).is_active());
        assert!(!with_expiry("token", Some(Utc::now() - Duration::hours(1))).is_active());
    }

    #[test]
    fn test_state_record() {
        let record = Session::state_record(shop(), "abc123", Duration::minutes(10));

        assert_eq!(record.id, "state-abc123");
        assert_eq!(record.state.as_deref(), Some("abc123"));
        assert!(!record.has_access_token());
        assert!(!record.is_online);
        assert!(!record.expired());
        assert!(record.expires.unwrap() <= Utc::now() + Duration::minutes(10));
    }

    #[test]
    fn test_from_offline_token_response() {
        let response: AccessTokenResponse = serde_json::from_str(
            r#"{"access_token":"shpat_abc","scope":"write_products"}"#,
        )
        .unwrap();

        let session = Session::from_access_token_response(shop(), &response);

        assert_eq!(session.id, "offline_shop.myshopify.com");
        assert_eq!(session.access_token, "shpat_abc");
        assert!(!session.is_online);
        assert!(session.expires.is_none());
        assert!(session.scopes.iter().any(|s| s == "read_products"));
    }

    #[test]
    fn test_from_online_token_response() {
        let response: AccessTokenResponse = serde_json::from_str(
            r#"{
                "access_token":"shpua_abc",
                "scope":"read_products",
                "expires_in":86399,
                "associated_user":{"id":902541635,"email":"jon@example.com"}
            }"#,
        )
        .unwrap();

        let session = Session::from_access_token_response(shop(), &response);

        assert_eq!(session.id, "shop.myshopify.com_902541635");
        assert!(session.is_online);
        assert!(session.expires.is_some());
        assert!(session.is_active());
    }

    #[test]
    fn test_session_serializes_in_camel_case() {
        let session = with_expiry("token", None);
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["accessToken"], "token");
        assert_eq!(json["isOnline"], false);
        assert_eq!(json["shop"], "shop.myshopify.com");
        assert!(json.get("state").is_none());
        assert!(json.get("expires").is_none());

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
