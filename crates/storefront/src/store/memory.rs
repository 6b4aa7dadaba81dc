//! In-process backend.
//!
//! Share one `Arc<MemoryStore>` between several [`super::JsonStore`]s to
//! model independent contexts (tabs) over the same storage.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

use super::{ContextId, KeyValueStore, Notifier, RawWrite, StorageEvent, StoreError};

/// Volatile key-value backend held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    notifier: Notifier,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            notifier: Notifier::new(),
        }
    }

    /// Create a store pre-seeded with raw values.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            notifier: Notifier::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, writes: &[RawWrite], origin: ContextId) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
            for write in writes {
                match &write.value {
                    Some(value) => {
                        entries.insert(write.key.clone(), value.clone());
                    }
                    None => {
                        entries.remove(&write.key);
                    }
                }
            }
        }
        self.notifier.publish(writes, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.notifier.subscribe()
    }
}
