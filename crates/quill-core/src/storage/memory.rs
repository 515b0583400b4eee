//! In-memory record storage
//!
//! Nothing is persisted; the collection lives as long as the value. Used by
//! tests and by callers that embed the core without a data directory.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::error::StorageResult;
use super::RecordStore;
use crate::models::Post;

/// Process-local post records
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<String, Post>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryRecordStore {
    fn read(&self, id: &str) -> StorageResult<Option<Post>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(id).cloned())
    }

    fn write(&self, post: &Post) -> StorageResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(post.id.clone(), post.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Ok(records.remove(id).is_some())
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.keys().cloned().collect())
    }

    fn contains(&self, id: &str) -> StorageResult<bool> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.contains_key(id))
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
