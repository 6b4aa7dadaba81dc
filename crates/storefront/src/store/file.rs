//! File-backed backend.
//!
//! All keys live in one JSON object on disk, mapping each key to its raw
//! string value. The file is re-read on every access so separate processes
//! see each other's writes (last writer wins). Writes go to a uniquely named
//! sibling temp file that is synced and then renamed over the original, so a
//! batch lands whole or not at all, even with several processes writing.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tokio::sync::broadcast;

use super::{ContextId, KeyValueStore, Notifier, RawWrite, StorageEvent, StoreError};

type Entries = BTreeMap<String, String>;

/// Key-value backend persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
    notifier: Notifier,
}

impl FileStore {
    /// Use `path` as the backing file. It is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            notifier: Notifier::new(),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, treating as empty"
                );
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
                parent
            }
            None => Path::new("."),
        };

        let bytes = serde_json::to_vec_pretty(entries)?;
        // Dropped (and deleted) on any early return.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn write(&self, writes: &[RawWrite], origin: ContextId) -> Result<(), StoreError> {
        {
            let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
            let mut entries = self.read_entries()?;
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
            self.write_entries(&entries)?;
        }
        self.notifier.publish(writes, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn set(key: &str, value: &str) -> RawWrite {
        RawWrite {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("shop.json"));
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shop.json");

        FileStore::new(&path)
            .write(&[set("cart", "[]"), set("user", "null")], ContextId::next())
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("user").unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        fs::write(&path, "]]] definitely not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("cart").unwrap(), None);

        store.write(&[set("cart", "[]")], ContextId::next()).unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_two_handles_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        let first = FileStore::new(&path);
        let second = FileStore::new(&path);

        first.write(&[set("orders", "[1]")], ContextId::next()).unwrap();
        assert_eq!(second.get("orders").unwrap().as_deref(), Some("[1]"));

        second
            .write(
                &[RawWrite {
                    key: "orders".to_string(),
                    value: None,
                }],
                ContextId::next(),
            )
            .unwrap();
        assert_eq!(first.get("orders").unwrap(), None);
    }

    #[test]
    fn test_concurrent_writers_never_leave_a_torn_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("shop.json"));

        let writers: Vec<_> = (0..4)
            .map(|n| {
                let path = Arc::clone(&path);
                thread::spawn(move || {
                    // One handle per thread behaves like a separate process.
                    let store = FileStore::new(path.as_path());
                    let key = format!("key{n}");
                    let payload = serde_json::to_string(&vec![n; 500 * (n + 1)]).unwrap();
                    for _ in 0..25 {
                        store
                            .write(&[set(&key, &payload)], ContextId::next())
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let bytes = fs::read(path.as_path()).unwrap();
        let entries: Entries = serde_json::from_slice(&bytes).unwrap();
        assert!(!entries.is_empty());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("shop.json")]);
    }
}
