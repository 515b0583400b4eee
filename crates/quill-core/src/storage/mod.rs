//! Storage layer
//!
//! Posts are kept in a `RecordStore`: a durable key-value collection of
//! JSON records keyed by post id. Three backends are provided:
//!
//! - **FileRecordStore**: one `{id}.json` file per post (default)
//! - **BlobRecordStore**: every post in a single JSON array file
//! - **MemoryRecordStore**: process-local map, for tests and embedding
//!
//! File-backed writes go through a temp file and an atomic rename, so a
//! reader never sees a partially written record.

pub mod blob;
pub mod error;
pub mod files;
pub mod memory;

pub use blob::BlobRecordStore;
pub use error::{IoAction, StorageError, StorageResult};
pub use files::FileRecordStore;
pub use memory::MemoryRecordStore;

use crate::config::{Config, StorageKind};
use crate::models::Post;

/// One enumerated record: its id and the outcome of reading it
///
/// `Ok(None)` means the record vanished between enumeration and read.
pub type LoadedRecord = (String, StorageResult<Option<Post>>);

/// Durable collection of post records keyed by id
pub trait RecordStore: Send + Sync {
    /// Read one record; `Ok(None)` if no record has this id
    fn read(&self, id: &str) -> StorageResult<Option<Post>>;

    /// Create or replace the record for `post.id`
    ///
    /// Must be durable before returning `Ok`.
    fn write(&self, post: &Post) -> StorageResult<()>;

    /// Remove a record; returns `false` if it did not exist
    fn remove(&self, id: &str) -> StorageResult<bool>;

    /// Ids of every stored record, in a deterministic order
    fn ids(&self) -> StorageResult<Vec<String>>;

    /// Check whether a record exists, even if it cannot be decoded
    fn contains(&self, id: &str) -> StorageResult<bool> {
        Ok(self.ids()?.iter().any(|existing| existing == id))
    }

    /// Read every record, keeping per-record failures separate
    fn load_all(&self) -> StorageResult<Vec<LoadedRecord>> {
        Ok(self
            .ids()?
            .into_iter()
            .map(|id| {
                let result = self.read(&id);
                (id, result)
            })
            .collect())
    }

    /// Human-readable location, used in logs and status output
    fn describe(&self) -> String;
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn read(&self, id: &str) -> StorageResult<Option<Post>> {
        (**self).read(id)
    }

    fn write(&self, post: &Post) -> StorageResult<()> {
        (**self).write(post)
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        (**self).remove(id)
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        (**self).ids()
    }

    fn contains(&self, id: &str) -> StorageResult<bool> {
        (**self).contains(id)
    }

    fn load_all(&self) -> StorageResult<Vec<LoadedRecord>> {
        (**self).load_all()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open the record store selected by the configuration
pub fn open_record_store(config: &Config) -> StorageResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match config.storage {
        StorageKind::Files => Box::new(FileRecordStore::open(config.posts_dir())?),
        StorageKind::Blob => Box::new(BlobRecordStore::open(config.blob_path())?),
    };
    tracing::debug!(location = %store.describe(), "opened record store");
    Ok(store)
}
