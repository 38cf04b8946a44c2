//! In-memory storage backend.
//!
//! Everything is lost when the process exits. Suitable for local
//! development and tests, not for a deployed app.

use super::{AppDataStorage, SessionStorage, Storage, StorageResult, StorageStats};
use crate::auth::Session;
use crate::config::ShopDomain;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Sessions keyed by id, app data keyed by shop then key.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    sessions: RwLock<HashMap<String, Session>>,
    app_data: RwLock<HashMap<ShopDomain, HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn store_session(&self, session: &Session) -> StorageResult<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let created_at = sessions
            .get(&session.id)
            .and_then(|existing| existing.created_at)
            .or(session.created_at)
            .unwrap_or(now);

        let mut record = session.clone();
        record.created_at = Some(created_at);
        record.updated_at = Some(now);
        sessions.insert(record.id.clone(), record);
        Ok(())
    }

    async fn load_session(&self, id: &str) -> StorageResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> StorageResult<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn delete_sessions(&self, ids: &[String]) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        for id in ids {
            sessions.remove(id);
        }
        Ok(())
    }

    async fn find_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| &s.shop == shop && s.has_access_token())
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn delete_sessions_by_shop(&self, shop: &ShopDomain) -> StorageResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| &s.shop != shop);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl AppDataStorage for MemoryStorage {
    async fn set_app_data(&self, shop: &ShopDomain, key: &str, value: &str) -> StorageResult<()> {
        self.app_data
            .write()
            .await
            .entry(shop.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .app_data
            .read()
            .await
            .get(shop)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn delete_app_data(&self, shop: &ShopDomain, key: &str) -> StorageResult<bool> {
        let mut app_data = self.app_data.write().await;
        let Some(entries) = app_data.get_mut(shop) else {
            return Ok(false);
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            app_data.remove(shop);
        }
        Ok(removed)
    }

    async fn delete_all_app_data(&self, shop: &ShopDomain) -> StorageResult<u64> {
        Ok(self
            .app_data
            .write()
            .await
            .remove(shop)
            .map_or(0, |entries| entries.len() as u64))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn stats(&self) -> StorageResult<StorageStats> {
        let sessions = self.sessions.read().await;
        let shops: HashSet<&ShopDomain> = sessions
            .values()
            .filter(|s| s.has_access_token())
            .map(|s| &s.shop)
            .collect();
        Ok(StorageStats {
            session_count: sessions.len() as u64,
            shop_count: shops.len() as u64,
        })
    }
}
