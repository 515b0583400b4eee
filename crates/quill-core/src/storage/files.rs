//! One-file-per-post record storage
//!
//! Each post lives in `<dir>/<id>.json` as indented JSON. Writes use an
//! atomic replace (temp file, fsync, rename) so a failed or concurrent
//! write never leaves a torn record behind, and a failure on one id never
//! touches another id's file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use super::error::{IoAction, StorageError, StorageResult};
use super::RecordStore;
use crate::models::{is_valid_id, Post};

const RECORD_EXTENSION: &str = "json";

/// Directory of per-post JSON files
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Path of the record file for an id
    ///
    /// `None` for ids that could name a file outside the directory.
    pub fn record_path(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_id(id) {
            tracing::debug!(id = %id, "rejecting malformed record id");
            return None;
        }
        Some(self.dir.join(format!("{}.{}", id, RECORD_EXTENSION)))
    }
}

impl RecordStore for FileRecordStore {
    fn read(&self, id: &str) -> StorageResult<Option<Post>> {
        let Some(path) = self.record_path(id) else {
            return Ok(None);
        };
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_io(e, path, IoAction::Read)),
        };

        let post: Post =
            serde_json::from_str(&data).map_err(|e| StorageError::invalid_record(path.clone(), e))?;

        if post.id != id {
            return Err(StorageError::invalid_record(
                path,
                format!("record id '{}' does not match its file name", post.id),
            ));
        }

        Ok(Some(post))
    }

    fn write(&self, post: &Post) -> StorageResult<()> {
        let path = self
            .record_path(&post.id)
            .ok_or_else(|| StorageError::InvalidId {
                id: post.id.clone(),
            })?;
        let bytes = to_pretty_json(post)?;
        atomic_write(&path, &bytes)
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        let Some(path) = self.record_path(id) else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                sync_dir(&self.dir)?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(e, path, IoAction::Delete)),
        }
    }

    fn ids(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| StorageError::from_io(e, self.dir.clone(), IoAction::Read))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            if let Some(id) = record_id(&entry.path()) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn contains(&self, id: &str) -> StorageResult<bool> {
        let Some(path) = self.record_path(id) else {
            return Ok(false);
        };
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(e, path, IoAction::Read)),
        }
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Id for a record file name, or `None` for temp files and other files
fn record_id(path: &Path) -> Option<String> {
    if path.extension()? != RECORD_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if !is_valid_id(stem) {
        return None;
    }
    Some(stem.to_string())
}

/// Serialize with four-space indentation and a trailing newline
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named hidden temp file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
/// 4. Sync the directory so the rename itself survives a crash
///
/// The unique name keeps two concurrent writers of the same target from
/// sharing a temp file; whichever rename lands last wins.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = write_and_sync(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }
    sync_dir(parent)
}

/// Flush directory entries (creates, renames, removals) to disk
#[cfg(unix)]
fn sync_dir(dir: &Path) -> StorageResult<()> {
    File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|e| StorageError::from_io(e, dir.to_path_buf(), IoAction::Write))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StorageResult<()> {
    Ok(())
}

fn write_and_sync(path: &Path, data: &[u8]) -> StorageResult<()> {
    let to_err = |e: io::Error| StorageError::from_io(e, path.to_path_buf(), IoAction::Write);

    let mut file = File::create(path).map_err(to_err)?;
    file.write_all(data).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{timestamp_now, PostFormat};
    use tempfile::TempDir;

    fn post(id: &str, title: &str) -> Post {
        let now = timestamp_now();
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            format: PostFormat::Markdown,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();

        assert!(store.read("abc").unwrap().is_none());

        let original = post("abc", "First");
        store.write(&original).unwrap();

        assert!(store.contains("abc").unwrap());
        assert_eq!(store.read("abc").unwrap(), Some(original));
    }

    #[test]
    fn test_record_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        store.write(&post("abc", "First")).unwrap();

        let raw = fs::read_to_string(store.record_path("abc").unwrap()).unwrap();
        assert!(raw.starts_with("{\n    \"id\": \"abc\""));
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\"createdAt\""));
    }

    #[test]
    fn test_overwrite_replaces_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();

        store.write(&post("abc", "First")).unwrap();
        store.write(&post("abc", "Second")).unwrap();

        assert_eq!(store.read("abc").unwrap().unwrap().title, "Second");
        assert_eq!(store.ids().unwrap(), vec!["abc"]);
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        store.write(&post("abc", "First")).unwrap();

        assert!(store.remove("abc").unwrap());
        assert!(!store.remove("abc").unwrap());
        assert!(store.read("abc").unwrap().is_none());
    }

    #[test]
    fn test_ids_ignore_temp_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        store.write(&post("b", "B")).unwrap();
        store.write(&post("a", "A")).unwrap();

        fs::write(temp_dir.path().join(".a.json.1234.tmp"), "{").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(temp_dir.path().join("with space.json"), "{}").unwrap();
        fs::create_dir(temp_dir.path().join("sub.json")).unwrap();

        assert_eq!(store.ids().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_record_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        fs::write(store.record_path("bad").unwrap(), "{ not json").unwrap();

        let err = store.read("bad").unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
        // Still counts as existing, so ids are never reused over it
        assert!(store.contains("bad").unwrap());
    }

    #[test]
    fn test_mismatched_id_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        store.write(&post("abc", "First")).unwrap();
        fs::rename(store.record_path("abc").unwrap(), store.record_path("xyz").unwrap()).unwrap();

        assert!(matches!(
            store.read("xyz"),
            Err(StorageError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_load_all_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        store.write(&post("good", "Good")).unwrap();
        fs::write(store.record_path("bad").unwrap(), "[]").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);

        let (bad_id, bad) = &loaded[0];
        assert_eq!(bad_id, "bad");
        assert!(bad.is_err());

        let (good_id, good) = &loaded[1];
        assert_eq!(good_id, "good");
        assert_eq!(good.as_ref().unwrap().as_ref().unwrap().title, "Good");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");

        // No temp files left behind
        let leftovers: Vec<_> = fs::read_dir(nested_path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_malformed_ids_never_leave_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path().join("posts")).unwrap();
        let outside = temp_dir.path().join("victim.json");
        fs::write(&outside, "outside").unwrap();

        assert!(store.record_path("../victim").is_none());
        assert!(store.read("../victim").unwrap().is_none());
        assert!(!store.contains("../victim").unwrap());
        assert!(!store.remove("../victim").unwrap());
        assert!(matches!(
            store.write(&post("../victim", "Escaped")),
            Err(StorageError::InvalidId { .. })
        ));
        assert_eq!(fs::read_to_string(&outside).unwrap(), "outside");
    }

    #[test]
    fn test_failed_rename_keeps_other_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).unwrap();
        let sibling = post("sibling", "Untouched");
        store.write(&sibling).unwrap();

        // A non-empty directory where the record file should go
        let blocker = temp_dir.path().join("blocked.json");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("inner"), "x").unwrap();

        let err = store.write(&post("blocked", "Blocked")).unwrap_err();
        assert!(matches!(err, StorageError::AtomicWriteFailed { .. }));

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert!(blocker.join("inner").exists());
        assert_eq!(store.read("sibling").unwrap(), Some(sibling));
    }

    #[test]
    fn test_contains_reports_io_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("posts");
        let store = FileRecordStore::open(&dir).unwrap();

        assert!(!store.contains("missing").unwrap());
        fs::create_dir(dir.join("folder.json")).unwrap();
        assert!(!store.contains("folder").unwrap());

        // The store directory replaced by a plain file
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "").unwrap();
        assert!(store.contains("abc").is_err());
    }

    #[test]
    fn test_open_fails_when_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("posts");
        fs::write(&file_path, "").unwrap();

        let err = FileRecordStore::open(&file_path).unwrap_err();
        assert!(matches!(err, StorageError::CreateDirectory { .. }));
    }
}
