//! Session and app data persistence.
//!
//! Two contracts, [`SessionStorage`] and [`AppDataStorage`], are combined in
//! the [`Storage`] supertrait that the server holds as `Arc<dyn Storage>`.
//!
//! - [`MemoryStorage`]: process memory, for development and tests
//! - [`MongoStorage`]: MongoDB collections `sessions` and `app_data`
//!
//! Both backends key sessions by `id` and app data by the `(shop, key)` pair.

mod error;
mod memory;
mod mongo;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use mongo::MongoStorage;

use crate::auth::Session;
use crate::config::ShopDomain;
use async_trait::async_trait;
use serde::Serialize;

/// Persistence for [`Session`] records.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Creates or replaces the record with `session.id`.
    ///
    /// `created_at` is kept from an existing record and `updated_at` is set
    /// to the current time.
    async fn store_session(&self, session: &Session) -> StorageResult<()>;

    /// Loads a session by id.
    async fn load_session(&self, id: &str) -> StorageResult<Option<Session>>;

    /// Deletes a session by id. Returns whether a record was removed.
    async fn delete_session(&self, id: &str) -> StorageResult<bool>;

    /// Deletes every session in `ids`. Unknown ids are ignored.
    async fn delete_sessions(&self, ids: &[String]) -> StorageResult<()>;

    /// Sessions of `shop` that hold an access token, oldest first.
    async fn find_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<Vec<Session>>;

    /// Deletes every session of `shop`, state records included.
    async fn delete_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<u64>;
}

/// Per-shop key/value data kept by the app.
#[async_trait]
pub trait AppDataStorage: Send + Sync {
    /// Creates or replaces the value for `(shop, key)`.
    async fn set_app_data(&self, shop: &ShopDomain, key: &str, value: &str) -> StorageResult<()>;

    /// Reads the value for `(shop, key)`.
    async fn get_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<Option<String>>;

    /// Deletes the value for `(shop, key)`. Returns whether it existed.
    async fn delete_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<bool>;

    /// Deletes every value of `shop`. Returns how many were removed.
    async fn delete_all_app_data(&self, shop: &ShopDomain) -> StorageResult<u64>;
}

/// Record counts, exposed on `/health`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    /// Number of session records, state records included.
    pub session_count: u64,
    /// Number of distinct shops with at least one session holding an access
    /// token. Pending logins are not counted.
    pub shop_count: u64,
}

/// What [`Storage::delete_all_shop_data`] removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShopDataDeletion {
    /// Session records removed.
    pub sessions: u64,
    /// App data entries removed.
    pub app_data: u64,
}

/// A complete storage backend.
#[async_trait]
pub trait Storage: SessionStorage + AppDataStorage {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Removes every session and every app data entry of `shop`.
    async fn delete_all_shop_data(&self, shop: &ShopDomain) -> StorageResult<ShopDataDeletion> {
        let sessions = self.delete_sessions_by_shop(shop).await?;
        let app_data = self.delete_all_app_data(shop).await?;
        Ok(ShopDataDeletion { sessions, app_data })
    }

    /// Record counts.
    async fn stats(&self) -> StorageResult<StorageStats>;
}
