//! GraphQL client for the Shopify Admin API.
//!
//! # Overview
//!
//! - [`GraphqlClient`]: authenticated `graphql.json` calls for one shop
//! - [`ShopInfo`]: the shop facts shown on the dashboard
//! - [`GraphqlError`]: error type for Admin API calls
//!
//! # Response Structure
//!
//! GraphQL responses contain these fields in the body:
//!
//! - `data`: The query result data
//! - `errors`: GraphQL errors, still HTTP 200, surfaced as [`GraphqlError::Query`]
//! - `extensions`: Query cost information
//!
//! # Retry Behavior
//!
//! Requests are attempted once by default. [`GraphqlClient::with_tries`]
//! enables retries on 429 (honouring `Retry-After`) and 500 responses.

mod client;
mod errors;
mod shop;

pub use client::{GraphqlClient, ACCESS_TOKEN_HEADER, MAX_RETRY_WAIT_TIME, RETRY_WAIT_TIME};
pub use errors::GraphqlError;
pub use shop::{ShopInfo, SHOP_INFO_QUERY};
