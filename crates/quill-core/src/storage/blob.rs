//! Single-blob record storage
//!
//! Keeps every post in one JSON array file, the way a client-side store
//! persists its whole collection under a single key. Every mutation is a
//! read-modify-write cycle held under a mutex and committed with an atomic
//! replace of the file.
//!
//! Entries that fail to decode are reported per id and written back
//! untouched, so one damaged entry never takes the rest of the blob with it.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::Value;

use super::error::{IoAction, StorageError, StorageResult};
use super::files::{atomic_write, to_pretty_json};
use super::{LoadedRecord, RecordStore};
use crate::models::Post;

/// All posts in one JSON array file
#[derive(Debug)]
pub struct BlobRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl BlobRecordStore {
    /// Open a blob store at `path`
    ///
    /// The file is not created until the first write. An existing file that
    /// is not a JSON array is rejected rather than replaced.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        store.load_entries()?;
        Ok(store)
    }

    /// Path of the blob file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_entries(&self) -> StorageResult<Vec<Value>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_io(e, self.path.clone(), IoAction::Read)),
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<Value>>(&data)
            .map_err(|e| StorageError::invalid_record(self.path.clone(), e))
    }

    fn save_entries(&self, entries: &[Value]) -> StorageResult<()> {
        let bytes = to_pretty_json(entries)?;
        atomic_write(&self.path, &bytes)
    }

    fn decode(&self, entry: &Value) -> StorageResult<Post> {
        Post::deserialize(entry)
            .map_err(|e| StorageError::invalid_record(self.path.clone(), e))
    }
}

/// Id of an array entry, if it carries a string `id`
fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id")?.as_str()
}

/// Entries that can be addressed by id, first occurrence of each id only
///
/// Entries without a string id and later duplicates are skipped with a
/// warning. They stay in the file untouched.
fn addressable_entries(entries: &[Value]) -> Vec<(&str, &Value)> {
    let mut seen = HashSet::new();
    let mut addressable = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(id) = entry_id(entry) else {
            tracing::warn!(index, "skipping blob entry without a string id");
            continue;
        };
        if !seen.insert(id) {
            tracing::warn!(index, id = %id, "skipping duplicate blob entry");
            continue;
        }
        addressable.push((id, entry));
    }

    addressable
}

impl RecordStore for BlobRecordStore {
    fn read(&self, id: &str) -> StorageResult<Option<Post>> {
        let _guard = self.guard();
        let entries = self.load_entries()?;
        entries
            .iter()
            .find(|entry| entry_id(entry) == Some(id))
            .map(|entry| self.decode(entry))
            .transpose()
    }

    fn write(&self, post: &Post) -> StorageResult<()> {
        let _guard = self.guard();
        let mut entries = self.load_entries()?;
        let value = serde_json::to_value(post)?;

        match entries
            .iter()
            .position(|entry| entry_id(entry) == Some(post.id.as_str()))
        {
            Some(idx) => entries[idx] = value,
            None => entries.push(value),
        }

        self.save_entries(&entries)
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        let _guard = self.guard();
        let mut entries = self.load_entries()?;
        let before = entries.len();
        entries.retain(|entry| entry_id(entry) != Some(id));

        if entries.len() == before {
            return Ok(false);
        }

        self.save_entries(&entries)?;
        Ok(true)
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        let _guard = self.guard();
        let entries = self.load_entries()?;
        Ok(addressable_entries(&entries)
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect())
    }

    fn load_all(&self) -> StorageResult<Vec<LoadedRecord>> {
        let _guard = self.guard();
        let entries = self.load_entries()?;
        Ok(addressable_entries(&entries)
            .into_iter()
            .map(|(id, entry)| (id.to_string(), self.decode(entry).map(Some)))
            .collect())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
