//! Webhook topics handled by the app.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Value of the `X-Shopify-Topic` header.
///
/// The app acts on the uninstall topic and the three mandatory compliance
/// topics. Anything else is kept as [`WebhookTopic::Other`].
///
/// ```rust
/// use shopify_app::webhooks::WebhookTopic;
///
/// let topic: WebhookTopic = "shop/redact".parse().unwrap();
/// assert_eq!(topic, WebhookTopic::ShopRedact);
/// assert!(topic.is_compliance());
///
/// let other: WebhookTopic = "orders/create".parse().unwrap();
/// assert_eq!(other.as_str(), "orders/create");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    /// `app/uninstalled`
    AppUninstalled,
    /// `customers/data_request`
    CustomersDataRequest,
    /// `customers/redact`
    CustomersRedact,
    /// `shop/redact`
    ShopRedact,
    /// Any other topic, as received.
    Other(String),
}

impl WebhookTopic {
    /// The topic string as Shopify sends it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AppUninstalled => "app/uninstalled",
            Self::CustomersDataRequest => "customers/data_request",
            Self::CustomersRedact => "customers/redact",
            Self::ShopRedact => "shop/redact",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for the mandatory privacy topics.
    #[must_use]
    pub const fn is_compliance(&self) -> bool {
        matches!(
            self,
            Self::CustomersDataRequest | Self::CustomersRedact | Self::ShopRedact
        )
    }
}

impl From<&str> for WebhookTopic {
    fn from(s: &str) -> Self {
        match s.trim() {
            "app/uninstalled" => Self::AppUninstalled,
            "customers/data_request" => Self::CustomersDataRequest,
            "customers/redact" => Self::CustomersRedact,
            "shop/redact" => Self::ShopRedact,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for WebhookTopic {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
