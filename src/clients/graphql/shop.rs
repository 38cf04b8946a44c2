//! Shop details shown on the dashboard.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::graphql::{GraphqlClient, GraphqlError};

/// Query sent by [`GraphqlClient::fetch_shop_info`].
pub const SHOP_INFO_QUERY: &str = r"query {
  shop {
    name
    email
    myshopifyDomain
    primaryDomain { host }
    plan { displayName }
  }
}";

/// Basic facts about the installed shop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    /// Store name.
    pub name: String,
    /// Contact email of the store.
    pub email: String,
    /// Primary domain, or the `myshopify.com` domain when none is set.
    pub domain: String,
    /// Plan name as shown in the admin, e.g. `Development`.
    pub plan_display_name: String,
}

impl ShopInfo {
    /// Reads `data.shop` from a query response. Returns `None` when the
    /// response has no shop object.
    #[must_use]
    pub fn from_response(body: &Value) -> Option<Self> {
        let shop = body.pointer("/data/shop").filter(|v| v.is_object())?;
        let text = |pointer: &str| {
            shop.pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let domain = Some(text("/primaryDomain/host"))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| text("/myshopifyDomain"));

        Some(Self {
            name: text("/name"),
            email: text("/email"),
            domain,
            plan_display_name: text("/plan/displayName"),
        })
    }
}

impl GraphqlClient {
    /// Fetches the shop's name, email, domain and plan.
    ///
    /// # Errors
    ///
    /// Returns any [`GraphqlError`] raised by [`GraphqlClient::query`].
    pub async fn fetch_shop_info(&self) -> Result<Option<ShopInfo>, GraphqlError> {
        let body = self.query(SHOP_INFO_QUERY, None).await?;
        Ok(ShopInfo::from_response(&body))
    }
}
