//! Test backends.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use super::{ContextId, KeyValueStore, MemoryStore, RawWrite, StorageEvent, StoreError};

/// Memory backend whose writes can be switched off, like a full disk.
#[derive(Debug, Default)]
pub struct FailingWrites {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FailingWrites {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write from now on. Reads keep working.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl KeyValueStore for FailingWrites {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn write(&self, writes: &[RawWrite], origin: ContextId) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: PathBuf::from("memory"),
                source: io::Error::other("no space left"),
            });
        }
        self.inner.write(writes, origin)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }
}
