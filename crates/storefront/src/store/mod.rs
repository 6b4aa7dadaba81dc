//! Persistent key-value store adapter.
//!
//! A [`KeyValueStore`] backend holds raw strings under named keys, the way a
//! browser's local storage does. [`JsonStore`] sits on top and speaks typed
//! values: reads never fail (missing or corrupt data yields the caller's
//! default), writes overwrite unconditionally.
//!
//! Every write is announced as a [`StorageEvent`] to every adapter sharing
//! the backend. The event carries the writer's [`ContextId`] so a context can
//! tell its own writes from foreign ones.

mod file;
mod memory;
#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;

pub use file::FileStore;
pub use memory::MemoryStore;

/// How many unread notifications a subscriber may lag behind.
const NOTIFY_CAPACITY: usize = 64;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Identifies one execution context (one cart session) sharing a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a fresh, process-unique context id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Notification that a key was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// The context that wrote it.
    pub origin: ContextId,
}

/// A single raw write. `None` removes the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWrite {
    pub key: String,
    pub value: Option<String>,
}

/// Raw string key-value backend.
///
/// Implementations must apply a `write` call as a unit: either every entry
/// lands or none does.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Apply a set of writes atomically and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written; nothing is
    /// applied in that case.
    fn write(&self, writes: &[RawWrite], origin: ContextId) -> Result<(), StoreError>;

    /// Receive a [`StorageEvent`] for every key written from now on.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Fan-out of storage events shared by the backends.
#[derive(Debug)]
pub(crate) struct Notifier {
    sender: broadcast::Sender<StorageEvent>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, writes: &[RawWrite], origin: ContextId) {
        for write in writes {
            // No receivers is fine; nobody is listening yet.
            let _ = self.sender.send(StorageEvent {
                key: write.key.clone(),
                origin,
            });
        }
    }
}

/// A group of typed writes committed together.
#[derive(Debug, Default)]
pub struct Batch {
    writes: Vec<RawWrite>,
}

impl Batch {
    /// Start an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialize` if the value cannot be serialized.
    pub fn set<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Result<Self, StoreError> {
        self.writes.push(RawWrite {
            key: key.to_owned(),
            value: Some(serde_json::to_string(value)?),
        });
        Ok(self)
    }

    /// Queue removal of `key`.
    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        self.writes.push(RawWrite {
            key: key.to_owned(),
            value: None,
        });
        self
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Typed JSON view over a shared backend, bound to one context.
///
/// Cloning keeps the same [`ContextId`]; use [`JsonStore::new`] on the same
/// backend to model another context.
#[derive(Clone)]
pub struct JsonStore {
    backend: Arc<dyn KeyValueStore>,
    origin: ContextId,
}

impl std::fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl JsonStore {
    /// Bind a new context to `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            origin: ContextId::next(),
        }
    }

    /// This context's id.
    #[must_use]
    pub const fn origin(&self) -> ContextId {
        self.origin
    }

    /// The shared backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Load the value under `key`, or `default` when it is absent, empty or
    /// does not parse. Failures are logged, never returned.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, error = %e, "Store read failed, using default");
                return default;
            }
        };

        if raw.trim().is_empty() {
            return default;
        }

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unparsable stored value");
                default
            }
        }
    }

    /// Serialize `value` and write it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.commit(Batch::new().set(key, value)?)
    }

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.commit(Batch::new().remove(key))
    }

    /// Write every entry of `batch` as one unit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend write fails; nothing is written.
    pub fn commit(&self, batch: Batch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.backend.write(&batch.writes, self.origin)
    }

    /// Subscribe to writes from every context on this backend.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.backend.subscribe()
    }
}
