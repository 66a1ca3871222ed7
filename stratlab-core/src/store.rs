//! Key-value persistence for bot-side state (alerts, journal).
//!
//! State is kept as JSON strings under string keys, the way a browser keeps
//! localStorage. `MemoryStore` is the in-process implementation; anything
//! else (a file, a database) can sit behind the same trait.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storing '{key}' needs {needed} bytes but only {available} remain")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("value under '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Option<String>;
    /// All keys in ascending order.
    fn keys(&self) -> Vec<String>;
}

/// In-memory store with an optional byte quota over keys plus values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |v| key.len() + v.len());
            let available = quota.saturating_sub(self.used_bytes() - replaced);
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Read and decode a JSON value. `Ok(None)` when the key is absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("b", "2".into()).unwrap();
        store.set("a", "1".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.remove("a").as_deref(), Some("1"));
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn json_helpers_round_trip() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "levels", &vec![1.5, 2.5]).unwrap();
        let levels: Option<Vec<f64>> = load_json(&store, "levels").unwrap();
        assert_eq!(levels, Some(vec![1.5, 2.5]));
        let missing: Option<Vec<f64>> = load_json(&store, "nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn corrupt_value_is_reported_with_key() {
        let mut store = MemoryStore::new();
        store.set("alerts", "{not json".into()).unwrap();
        let err = load_json::<Vec<u32>, _>(&store, "alerts").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "alerts"));
    }

    #[test]
    fn quota_is_enforced_and_replacement_reuses_space() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "12345".into()).unwrap();
        // replacing the same key frees its old bytes first
        store.set("k", "123456789".into()).unwrap();
        let err = store.set("x", "1".into()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 2,
                available: 0,
                ..
            }
        ));
        assert_eq!(store.used_bytes(), 10);
    }
}
