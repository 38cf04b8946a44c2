//! OAuth access scopes.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The set of access scopes the app requests, or a shop has granted.
///
/// Parsed from the comma-separated form used by the `SCOPES` variable, the
/// authorize URL and the token endpoint. Write scopes imply their read
/// counterpart, so `write_products` also grants `read_products`.
///
/// The set is kept sorted, so [`Display`](fmt::Display) output is stable.
///
/// # Example
///
/// ```rust
/// use shopify_app::AuthScopes;
///
/// let granted: AuthScopes = "write_products, read_orders".parse().unwrap();
/// assert_eq!(granted.to_string(), "read_orders,read_products,write_products");
///
/// let required: AuthScopes = "read_products".parse().unwrap();
/// assert!(granted.covers(&required));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if every scope in `other` is also in `self`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.is_subset(&self.scopes)
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Comma-separated scopes without the ones implied by a write scope,
    /// the form the authorize URL expects.
    ///
    /// ```rust
    /// use shopify_app::AuthScopes;
    ///
    /// let scopes: AuthScopes = "read_products,write_orders".parse().unwrap();
    /// assert_eq!(scopes.compressed(), "read_products,write_orders");
    /// ```
    #[must_use]
    pub fn compressed(&self) -> String {
        let implied: BTreeSet<String> = self.scopes.iter().filter_map(|s| implied_scope(s)).collect();
        self.iter()
            .filter(|scope| !implied.contains(*scope))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn from_scopes(scopes: BTreeSet<String>) -> Self {
        let implied: Vec<String> = scopes.iter().filter_map(|s| implied_scope(s)).collect();
        let mut scopes = scopes;
        scopes.extend(implied);
        Self { scopes }
    }
}

/// `write_foo` implies `read_foo`, `unauthenticated_write_foo` implies
/// `unauthenticated_read_foo`.
fn implied_scope(scope: &str) -> Option<String> {
    scope
        .strip_prefix("unauthenticated_write_")
        .map(|rest| format!("unauthenticated_read_{rest}"))
        .or_else(|| {
            scope
                .strip_prefix("write_")
                .map(|rest| format!("read_{rest}"))
        })
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self::from_scopes(scopes))
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated_with_whitespace() {
        let scopes: AuthScopes = " read_products , ,read_orders".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_orders,read_products");
    }

    #[test]
    fn test_write_implies_read() {
        let scopes: AuthScopes = "write_products,unauthenticated_write_checkouts"
            .parse()
            .unwrap();
        assert!(scopes.iter().any(|s| s == "read_products"));
        assert!(scopes.iter().any(|s| s == "unauthenticated_read_checkouts"));
    }

    #[test]
    fn test_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read-products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_covers() {
        let granted: AuthScopes = "write_products".parse().unwrap();
        let required: AuthScopes = "read_products".parse().unwrap();
        let more: AuthScopes = "read_orders".parse().unwrap();

        assert!(granted.covers(&required));
        assert!(!granted.covers(&more));
        assert!(granted.covers(&AuthScopes::new()));
    }

    #[test]
    fn test_serializes_as_string() {
        let scopes: AuthScopes = "write_orders".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_orders,write_orders""#);

        let back: AuthScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);

        let empty: AuthScopes = serde_json::from_str(r#""""#).unwrap();
        assert!(empty.is_empty());
    }
}
