//! Namespaced key/value persistence with expiration.
//!
//! `SessionStore` wraps a [`StorageBackend`] and never surfaces storage
//! failures to its callers: a failed write is logged and the value is kept
//! in an in-memory overlay for the rest of the session, a failed read falls
//! back to that overlay.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::fs::try_exists;
use tokio::sync::RwLock;

/// One persisted value and the moment it stops being readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

impl StoredItem {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Expiration used for session content and settings: 1 February 2099.
pub fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 2, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Storage mechanism behind the session store.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<StoredItem>>;
    async fn set_item(&self, namespace: &str, key: &str, item: StoredItem) -> Result<()>;
}

/// Backend that lives only as long as the process.
#[derive(Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<(String, String), StoredItem>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<StoredItem>> {
        let items = self.items.read().await;
        Ok(items
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_item(&self, namespace: &str, key: &str, item: StoredItem) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert((namespace.to_string(), key.to_string()), item);
        Ok(())
    }
}

/// Backend storing one JSON document per namespace.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new() -> Result<Self> {
        let data_dir = Self::get_data_dir()?;
        Ok(Self { data_dir })
    }

    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn get_data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("MDLIVE_DATA_DIR") {
            return Ok(PathBuf::from(dir).join("storage"));
        }
        let dirs = directories::ProjectDirs::from("com", "mdlive", "mdlive")
            .ok_or_else(|| anyhow::anyhow!("could not determine the project data directory"))?;
        Ok(dirs.data_dir().join("storage"))
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        let file_name: String = namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{}.json", file_name))
    }

    async fn read_namespace(&self, namespace: &str) -> Result<HashMap<String, StoredItem>> {
        let path = self.namespace_path(namespace);
        if !try_exists(&path).await? {
            return Ok(HashMap::new());
        }

        let json = fs::read_to_string(&path).await?;
        if json.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let items = serde_json::from_str(&json)
            .map_err(|e| anyhow::anyhow!("corrupt storage file {}: {}", path.display(), e))?;
        Ok(items)
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<StoredItem>> {
        let mut items = self.read_namespace(namespace).await?;
        Ok(items.remove(key))
    }

    async fn set_item(&self, namespace: &str, key: &str, item: StoredItem) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await?;

        let mut items = match self.read_namespace(namespace).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Discarding unreadable namespace '{}': {}", namespace, e);
                HashMap::new()
            }
        };

        let now = Utc::now();
        items.retain(|_, existing| !existing.is_expired_at(now));
        items.insert(key.to_string(), item);

        let path = self.namespace_path(namespace);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&items)?;
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

pub struct SessionStore {
    backend: Box<dyn StorageBackend>,
    overlay: HashMap<(String, String), StoredItem>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            overlay: HashMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Read a value; expired, missing and unreadable entries are all `None`.
    pub async fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.get_at(namespace, key, Utc::now()).await
    }

    pub async fn get_at(&self, namespace: &str, key: &str, now: DateTime<Utc>) -> Option<Value> {
        let slot = (namespace.to_string(), key.to_string());
        let item = match self.overlay.get(&slot) {
            Some(item) => Some(item.clone()),
            None => match self.backend.get_item(namespace, key).await {
                Ok(item) => item,
                Err(e) => {
                    log::warn!("Failed to read {}/{}: {}", namespace, key, e);
                    None
                }
            },
        };

        match item {
            Some(item) if item.is_expired_at(now) => {
                log::debug!("Entry {}/{} expired at {}", namespace, key, item.expires_at);
                None
            }
            Some(item) => Some(item.value),
            None => None,
        }
    }

    pub async fn get_typed<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let value = self.get(namespace, key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                log::warn!("Ignoring malformed entry {}/{}: {}", namespace, key, e);
                None
            }
        }
    }

    /// Overwrite a slot. Never fails from the caller's point of view.
    pub async fn set(&mut self, namespace: &str, key: &str, value: Value, expires_at: DateTime<Utc>) {
        let slot = (namespace.to_string(), key.to_string());
        let item = StoredItem { value, expires_at };

        match self.backend.set_item(namespace, key, item.clone()).await {
            Ok(()) => {
                self.overlay.remove(&slot);
            }
            Err(e) => {
                log::warn!(
                    "Failed to persist {}/{}, keeping it in memory for this session: {}",
                    namespace,
                    key,
                    e
                );
                self.overlay.insert(slot, item);
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.overlay.is_empty()
    }
}
