//! HMAC-SHA256 signing shared by OAuth callbacks and webhooks.
//!
//! OAuth callbacks carry a lowercase hex signature over the sorted query
//! string. Webhooks carry a base64 signature over the raw body. Every
//! comparison is constant-time.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::auth::oauth::hmac::{compute_signature, compute_signature_base64};
//!
//! let signature = compute_signature("message", "key");
//! assert_eq!(
//!     signature,
//!     "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
//! );
//!
//! let webhook = compute_signature_base64(b"message", "key");
//! assert_eq!(webhook, "bp7ym3X//Ft6uuUn1Y/a2y/kLnIZARl2kXNDBl9Y7Uo=");
//! ```

use std::fmt::Write as _;

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

fn sign(message: &[u8], secret: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Lowercase hex HMAC-SHA256 of `message`.
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    sign(message.as_bytes(), secret)
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Standard base64 HMAC-SHA256 of raw bytes, as sent in
/// `X-Shopify-Hmac-Sha256`.
#[must_use]
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    BASE64_STANDARD.encode(sign(message, secret))
}

/// Constant-time string equality.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Checks the `hmac` parameter of an OAuth callback.
///
/// The primary secret is tried first, then the old secret if one is
/// configured.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, config: &ShopifyConfig) -> bool {
    let signable = query.to_signable_string();

    config
        .secrets()
        .any(|secret| constant_time_compare(&compute_signature(&signable, secret), &query.hmac))
}
