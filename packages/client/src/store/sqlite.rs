//! SQLite-backed secret store.
//!
//! Uses `rusqlite` (bundled SQLite) behind an `Arc<Mutex<Connection>>`; every
//! call runs inside `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `secrets`: one row per key. Capabilities are a JSON blob.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use fedicap::ApiCapabilities;
use rusqlite::{params, Connection, OptionalExtension};
use url::Url;

use super::{SecretStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS secrets (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const INSTANCE_URL: &str = "instance_url";
const ACCESS_TOKEN: &str = "access_token";
const API_CAPABILITIES: &str = "api_capabilities";

pub struct SqliteSecretStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSecretStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn get(&self, key: &'static str) -> Result<Option<String>, StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            conn.query_row(
                "SELECT value FROM secrets WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(map_err)
        })
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?
    }

    /// `None` deletes the key.
    async fn put(&self, key: &'static str, value: Option<String>) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            match value {
                Some(value) => conn.execute(
                    "INSERT INTO secrets (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                ),
                None => conn.execute("DELETE FROM secrets WHERE key = ?1", params![key]),
            }
            .map(|_| ())
            .map_err(map_err)
        })
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?
    }
}

fn map_err(e: rusqlite::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
    async fn instance_url(&self) -> Result<Url, StoreError> {
        let raw = self
            .get(INSTANCE_URL)
            .await?
            .ok_or(StoreError::Missing("instance URL"))?;
        Url::parse(&raw).map_err(|e| StoreError::Corrupt {
            what: "instance URL",
            reason: e.to_string(),
        })
    }

    async fn set_instance_url(&self, url: &Url) -> Result<(), StoreError> {
        self.put(INSTANCE_URL, Some(url.to_string())).await
    }

    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.get(ACCESS_TOKEN).await
    }

    async fn set_access_token(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.put(ACCESS_TOKEN, token.map(str::to_string)).await
    }

    async fn api_capabilities(&self) -> Result<ApiCapabilities, StoreError> {
        match self.get(API_CAPABILITIES).await? {
            Some(json) => serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
                what: "API capabilities",
                reason: format!("JSON error: {e}"),
            }),
            None => Ok(ApiCapabilities::default()),
        }
    }

    async fn set_api_capabilities(
        &self,
        capabilities: &ApiCapabilities,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(capabilities)
            .map_err(|e| StoreError::Internal(format!("JSON error: {e}")))?;
        self.put(API_CAPABILITIES, Some(json)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_store_contract() {
        let store = SqliteSecretStore::open_in_memory().unwrap();
        crate::store::tests::exercise(&store).await;
    }

    #[tokio::test]
    async fn corrupt_capabilities_are_reported() {
        let store = SqliteSecretStore::open_in_memory().unwrap();
        store
            .put(API_CAPABILITIES, Some("not json".into()))
            .await
            .unwrap();
        assert!(matches!(
            store.api_capabilities().await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let path = std::env::temp_dir().join(format!("fedicap-store-{}.db", std::process::id()));
        let path = path.to_str().unwrap().to_string();
        {
            let store = SqliteSecretStore::open(&path).unwrap();
            store.set_access_token(Some("persisted")).await.unwrap();
        }
        let reopened = SqliteSecretStore::open(&path).unwrap();
        assert_eq!(
            reopened.access_token().await.unwrap().as_deref(),
            Some("persisted")
        );
        let _ = std::fs::remove_file(&path);
    }
}
