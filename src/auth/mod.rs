//! Authentication: scopes, sessions and the OAuth install flow.
//!
//! - [`AuthScopes`]: a set of OAuth scopes with implied scope handling
//! - [`Session`]: a shop's access token, or a pending OAuth state record
//! - [`oauth`]: the authorization code flow used to install the app
//!
//! # Session Types
//!
//! - **Offline sessions** (`offline_{shop}`): app-level tokens that don't
//!   expire. The app installs with these, and the webhook handlers clean them up.
//! - **Online sessions** (`{shop}_{user_id}`): user-specific tokens that expire.
//! - **State records** (`state-{nonce}`): written at login, consumed by the
//!   callback, never carry a token.

pub mod oauth;
mod scopes;
pub mod session;

pub use scopes::AuthScopes;
pub use session::{AccessTokenResponse, AssociatedUser, Session};
