// src/store.rs
use crate::error::StoreError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable key names, one JSON document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Watchlist,
    Alerts,
    Theme,
    UserData,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Watchlist => "watchlist",
            StorageKey::Alerts => "alerts",
            StorageKey::Theme => "theme",
            StorageKey::UserData => "userData",
        }
    }
}

/// String key-value storage with synchronous writes.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(crate::lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        crate::lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        crate::lock(&self.entries).remove(key);
        Ok(())
    }
}

/// All keys live in one JSON object on disk. Every `set`/`delete` rewrites
/// the file (through a sibling temp file) before returning.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        info!("Opened store {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(crate::lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = crate::lock(&self.entries);
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = crate::lock(&self.entries);
        if let Some(previous) = entries.remove(key) {
            if let Err(e) = self.flush(&entries) {
                entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Typed view over a [`KeyValueStore`]: values are JSON-encoded.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        match self.store.get(key.as_str())? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key.as_str(), &raw)?;
        debug!("Persisted {} ({} bytes)", key.as_str(), raw.len());
        Ok(())
    }

    pub fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        self.store.delete(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("market-dashboard-{name}-{nanos}.json"))
    }

    #[test]
    fn typed_values_round_trip_through_memory() {
        let p = Persistence::in_memory();
        p.save(StorageKey::Watchlist, &vec!["AAPL", "MSFT"]).unwrap();
        let list: Vec<String> = p.load(StorageKey::Watchlist).unwrap().unwrap();
        assert_eq!(list, vec!["AAPL", "MSFT"]);
        p.remove(StorageKey::Watchlist).unwrap();
        assert!(p.load::<Vec<String>>(StorageKey::Watchlist).unwrap().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = scratch_path("reopen");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("theme", "\"dark\"").unwrap();
            store.set("watchlist", "[\"TSLA\"]").unwrap();
            store.delete("watchlist").unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(store.get("watchlist").unwrap(), None);
        fs::remove_file(path).ok();
    }

    #[test]
    fn deleting_missing_key_is_ok() {
        let path = scratch_path("missing");
        let store = JsonFileStore::open(&path).unwrap();
        store.delete("alerts").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_value_is_reported() {
        let store = Arc::new(MemoryStore::new());
        store.set("alerts", "not json").unwrap();
        let p = Persistence::new(store);
        assert!(matches!(
            p.load::<Vec<u64>>(StorageKey::Alerts),
            Err(StoreError::Json(_))
        ));
    }
}
