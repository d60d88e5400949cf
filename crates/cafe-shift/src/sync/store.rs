use crate::schedule::RawShiftRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

pub const SHIFTS_KEY: &str = "cafe_shifts";
pub const LAST_STAFF_ID_KEY: &str = "cafe_last_staff_id";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value persistence for cached snapshots and viewer preferences.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Stores every key in a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

/// Reads the cached record list. A value that is not a list of records is
/// treated as an empty cache.
pub fn read_cached_shifts<S>(store: &S) -> Result<Vec<RawShiftRecord>, StoreError>
where
    S: SnapshotStore + ?Sized,
{
    let Some(value) = store.get(SHIFTS_KEY)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_value(value) {
        Ok(records) => Ok(records),
        Err(err) => {
            warn!(error = %err, key = SHIFTS_KEY, "ignoring unreadable shift cache");
            Ok(Vec::new())
        }
    }
}

/// Replaces the cached record list wholesale.
pub fn write_cached_shifts<S>(store: &S, records: &[RawShiftRecord]) -> Result<(), StoreError>
where
    S: SnapshotStore + ?Sized,
{
    store.put(SHIFTS_KEY, serde_json::to_value(records)?)
}

pub fn last_viewer<S>(store: &S) -> Result<Option<String>, StoreError>
where
    S: SnapshotStore + ?Sized,
{
    Ok(store
        .get(LAST_STAFF_ID_KEY)?
        .and_then(|value| value.as_str().map(str::to_string))
        .filter(|id| !id.is_empty()))
}

pub fn remember_viewer<S>(store: &S, staff_id: &str) -> Result<(), StoreError>
where
    S: SnapshotStore + ?Sized,
{
    store.put(LAST_STAFF_ID_KEY, Value::String(staff_id.to_string()))
}
