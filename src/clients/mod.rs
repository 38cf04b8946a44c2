//! Outgoing calls to Shopify APIs.
//!
//! The app only needs the Admin GraphQL API, see [`graphql`].

pub mod graphql;

pub use graphql::{GraphqlClient, GraphqlError, ShopInfo};
