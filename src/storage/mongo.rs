//! MongoDB storage backend.
//!
//! Collections and indexes:
//!
//! - `sessions`: unique index on `id`, index on `shop`
//! - `app_data`: unique compound index on `{shop: 1, key: 1}`
//!
//! Documents carry `createdAt` / `updatedAt` timestamps, stored as BSON dates.

use super::{
    AppDataStorage, SessionStorage, Storage, StorageError, StorageResult, StorageStats,
};
use crate::auth::{AuthScopes, Session};
use crate::config::ShopDomain;
use crate::error::ConfigError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

const SESSIONS: &str = "sessions";
const APP_DATA: &str = "app_data";

/// Session as stored in the `sessions` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDocument {
    id: String,
    shop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<bson::DateTime>,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<bson::DateTime>,
}

/// Entry of the `app_data` collection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDataDocument {
    shop: String,
    key: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<bson::DateTime>,
}

fn to_bson_date(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_date(value: bson::DateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value.timestamp_millis()).single()
}

impl From<&Session> for SessionDocument {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            shop: session.shop.to_string(),
            state: session.state.clone(),
            scope: session.scopes.to_string(),
            expires: session.expires.map(to_bson_date),
            access_token: session.access_token.clone(),
            is_online: session.is_online,
            created_at: session.created_at.map(to_bson_date),
            updated_at: session.updated_at.map(to_bson_date),
        }
    }
}

impl TryFrom<SessionDocument> for Session {
    type Error = StorageError;

    fn try_from(document: SessionDocument) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StorageError::Corrupt {
            id: document.id.clone(),
            reason,
        };

        let shop = ShopDomain::new(&document.shop).map_err(|e| corrupt(e.to_string()))?;
        let scopes: AuthScopes = document
            .scope
            .parse()
            .map_err(|e: ConfigError| corrupt(e.to_string()))?;

        Ok(Self {
            shop,
            scopes,
            state: document.state,
            expires: document.expires.and_then(from_bson_date),
            access_token: document.access_token,
            is_online: document.is_online,
            created_at: document.created_at.and_then(from_bson_date),
            updated_at: document.updated_at.and_then(from_bson_date),
            id: document.id,
        })
    }
}

/// Builds the upsert that stores `session` while keeping an existing
/// `createdAt`. Optional fields missing from `session` are unset.
fn session_upsert(session: &Session, now: DateTime<Utc>) -> StorageResult<Document> {
    let mut fields = bson::to_document(&SessionDocument::from(session))?;
    fields.remove("createdAt");
    fields.insert("updatedAt", to_bson_date(now));

    let created_at = to_bson_date(session.created_at.unwrap_or(now));

    let mut update = doc! {
        "$set": fields,
        "$setOnInsert": { "createdAt": created_at },
    };

    let mut unset = Document::new();
    if session.state.is_none() {
        unset.insert("state", "");
    }
    if session.expires.is_none() {
        unset.insert("expires", "");
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }

    Ok(update)
}

/// Storage backed by a MongoDB database.
#[derive(Clone, Debug)]
pub struct MongoStorage {
    sessions: Collection<SessionDocument>,
    app_data: Collection<AppDataDocument>,
}

impl MongoStorage {
    /// Connects to `url`, pings the server and creates the indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the server cannot be reached or
    /// the indexes cannot be created.
    pub async fn connect(url: &str, database: &str) -> StorageResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }, None).await?;

        let storage = Self::from_database(&db);
        storage.ensure_indexes().await?;

        tracing::info!(database = %database, "connected to MongoDB");
        Ok(storage)
    }

    /// Uses an already connected database. Indexes are not created.
    #[must_use]
    pub fn from_database(db: &Database) -> Self {
        Self {
            sessions: db.collection(SESSIONS),
            app_data: db.collection(APP_DATA),
        }
    }

    /// Creates the collection indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if index creation fails.
    pub async fn ensure_indexes(&self) -> StorageResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.sessions
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;
        self.sessions
            .create_index(IndexModel::builder().keys(doc! { "shop": 1 }).build(), None)
            .await?;
        self.app_data
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "shop": 1, "key": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for MongoStorage {
    async fn store_session(&self, session: &Session) -> StorageResult<()> {
        let update = session_upsert(session, Utc::now())?;
        let options = FindOneAndUpdateOptions::builder().upsert(true).build();

        self.sessions
            .find_one_and_update(doc! { "id": session.id.as_str() }, update, options)
            .await?;
        Ok(())
    }

    async fn load_session(&self, id: &str) -> StorageResult<Option<Session>> {
        self.sessions
            .find_one(doc! { "id": id }, None)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn delete_session(&self, id: &str) -> StorageResult<bool> {
        let result = self.sessions.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_sessions(&self, ids: &[String]) -> StorageResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.sessions
            .delete_many(doc! { "id": { "$in": ids.to_vec() } }, None)
            .await?;
        Ok(())
    }

    async fn find_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<Vec<Session>> {
        let filter = doc! {
            "shop": shop.as_ref(),
            "accessToken": { "$exists": true, "$ne": "" },
        };
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();

        let documents: Vec<SessionDocument> =
            self.sessions.find(filter, options).await?.try_collect().await?;

        documents.into_iter().map(Session::try_from).collect()
    }

    async fn delete_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<u64> {
        let result = self
            .sessions
            .delete_many(doc! { "shop": shop.as_ref() }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl AppDataStorage for MongoStorage {
    async fn set_app_data(&self, shop: &ShopDomain, key: &str, value: &str) -> StorageResult<()> {
        let now = to_bson_date(Utc::now());
        let options = UpdateOptions::builder().upsert(true).build();

        self.app_data
            .update_one(
                doc! { "shop": shop.as_ref(), "key": key },
                doc! {
                    "$set": { "value": value, "updatedAt": now },
                    "$setOnInsert": { "createdAt": now },
                },
                options,
            )
            .await?;
        Ok(())
    }

    async fn get_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<Option<String>> {
        let document = self
            .app_data
            .find_one(doc! { "shop": shop.as_ref(), "key": key }, None)
            .await?;
        Ok(document.map(|d| d.value))
    }

    async fn delete_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<bool> {
        let result = self
            .app_data
            .delete_one(doc! { "shop": shop.as_ref(), "key": key }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all_app_data(&self, shop: &ShopDomain) -> StorageResult<u64> {
        let result = self
            .app_data
            .delete_many(doc! { "shop": shop.as_ref() }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl Storage for MongoStorage {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn stats(&self) -> StorageResult<StorageStats> {
        let session_count = self.sessions.count_documents(None, None).await?;
        let installed = doc! { "accessToken": { "$nin": ["", null] } };
        let shops = self.sessions.distinct("shop", installed, None).await?;
        Ok(StorageStats {
            session_count,
            shop_count: shops.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_session() -> Session {
        let shop = ShopDomain::new("mongo-shop").unwrap();
        let mut session = Session::new(
            Session::offline_id(&shop),
            shop,
            "shpat_abc".to_string(),
            "write_products".parse().unwrap(),
            false,
            None,
        );
        session.created_at = Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        session
    }

    #[test]
    fn test_session_document_uses_camel_case_fields() {
        let document = bson::to_document(&SessionDocument::from(&sample_session())).unwrap();

        assert_eq!(document.get_str("id").unwrap(), "offline_mongo-shop.myshopify.com");
        assert_eq!(document.get_str("shop").unwrap(), "mongo-shop.myshopify.com");
        assert_eq!(document.get_str("accessToken").unwrap(), "shpat_abc");
        assert_eq!(document.get_str("scope").unwrap(), "read_products,write_products");
        assert!(!document.get_bool("isOnline").unwrap());
        assert!(document.get_datetime("createdAt").is_ok());
        assert!(!document.contains_key("state"));
        assert!(!document.contains_key("expires"));
    }

    #[test]
    fn test_session_document_converts_back() {
        let mut session = sample_session();
        session.expires = Some(Utc.timestamp_millis_opt(1_800_000_000_000).unwrap());
        session.state = Some("nonce".to_string());

        let document = SessionDocument::from(&session);
        let back = Session::try_from(document).unwrap();

        assert_eq!(back, session);
    }

    #[test]
    fn test_invalid_shop_is_reported_as_corrupt() {
        let mut document = SessionDocument::from(&sample_session());
        document.shop = "not a shop".to_string();

        match Session::try_from(document) {
            Err(StorageError::Corrupt { id, .. }) => {
                assert_eq!(id, "offline_mongo-shop.myshopify.com");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_upsert_keeps_created_at_on_insert_only() {
        let now = Utc.timestamp_millis_opt(1_750_000_000_000).unwrap();
        let update = session_upsert(&sample_session(), now).unwrap();

        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key("createdAt"));
        assert_eq!(
            set.get_datetime("updatedAt").unwrap().timestamp_millis(),
            1_750_000_000_000
        );

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert_eq!(
            on_insert.get_datetime("createdAt").unwrap().timestamp_millis(),
            1_700_000_000_000
        );

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("state"));
        assert!(unset.contains_key("expires"));
    }

    #[test]
    fn test_upsert_sets_state_record_fields() {
        let record = Session::state_record(
            ShopDomain::new("mongo-shop").unwrap(),
            "nonce",
            Duration::minutes(10),
        );
        let update = session_upsert(&record, Utc::now()).unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("state").unwrap(), "nonce");
        assert!(set.get_datetime("expires").is_ok());
        assert!(!update.contains_key("$unset"));
    }

    async fn live_storage() -> Option<MongoStorage> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let storage = MongoStorage::connect(&url, "shopify_app_test").await.ok()?;
        Some(storage)
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a MongoDB server"]
    async fn test_live_session_round_trip() {
        let Some(storage) = live_storage().await else {
            return;
        };
        let session = sample_session();
        storage.delete_sessions_by_shop(&session.shop).await.unwrap();

        storage.store_session(&session).await.unwrap();
        storage.store_session(&session).await.unwrap();

        let found = storage.find_sessions_by_shop(&session.shop).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].access_token, "shpat_abc");

        assert_eq!(storage.delete_sessions_by_shop(&session.shop).await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a MongoDB server"]
    async fn test_live_app_data_round_trip() {
        let Some(storage) = live_storage().await else {
            return;
        };
        let shop = ShopDomain::new("mongo-shop").unwrap();
        storage.delete_all_app_data(&shop).await.unwrap();

        storage.set_app_data(&shop, "k", "v1").await.unwrap();
        storage.set_app_data(&shop, "k", "v2").await.unwrap();
        assert_eq!(
            storage.get_app_data(&shop, "k").await.unwrap().as_deref(),
            Some("v2")
        );
        assert_eq!(storage.delete_all_app_data(&shop).await.unwrap(), 1);
    }
}
