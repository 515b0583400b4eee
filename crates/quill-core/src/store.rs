//! Post store
//!
//! `PostStore` owns the authoritative post collection. It assigns ids and
//! timestamps, enforces the non-empty title/content invariant, and commits
//! every mutation to its `RecordStore` before returning.
//!
//! ## Usage
//!
//! ```ignore
//! let store = PostStore::new(FileRecordStore::open("posts")?);
//!
//! let post = store.create(PostDraft::new("Hello", "**hi**"))?;
//! let posts = store.list()?; // most recently updated first
//! ```
//!
//! ## Consistency
//!
//! Each operation touches exactly one record. Concurrent writes to the same
//! id are not merged; the last write to complete wins.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::error::{PostError, PostResult};
use crate::models::{timestamp_now, Post, PostChanges, PostDraft, PostFormat};
use crate::storage::RecordStore;

/// Attempts at drawing an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Message used for every empty title/content rejection
pub const REQUIRED_FIELDS_MESSAGE: &str = "Title and content are required.";

/// Authoritative post collection backed by a record store
pub struct PostStore<R: RecordStore> {
    records: R,
}

impl<R: RecordStore> PostStore<R> {
    /// Create a store over the given records
    pub fn new(records: R) -> Self {
        Self { records }
    }

    /// The underlying record store
    pub fn records(&self) -> &R {
        &self.records
    }

    /// All posts, most recently updated first
    ///
    /// Records that cannot be read or decoded are skipped with a warning.
    pub fn list(&self) -> PostResult<Vec<Post>> {
        let mut posts = Vec::new();

        for (id, result) in self.records.load_all()? {
            match result {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => {
                    tracing::debug!(id = %id, "record vanished during listing");
                }
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "skipping unreadable post");
                }
            }
        }

        posts.sort_by(newest_first);
        Ok(posts)
    }

    /// One post by id
    pub fn get(&self, id: &str) -> PostResult<Post> {
        self.records
            .read(id)?
            .ok_or_else(|| PostError::not_found(id))
    }

    /// Create a post with a fresh id and timestamps
    pub fn create(&self, draft: PostDraft) -> PostResult<Post> {
        validate_fields(&draft.title, &draft.content)?;

        let id = self.fresh_id()?;
        let post = Post::from_draft(id, draft, timestamp_now());
        self.records.write(&post)?;

        tracing::debug!(id = %post.id, "created post");
        Ok(post)
    }

    /// Apply caller-settable changes to an existing post
    ///
    /// Absent fields keep their stored values; an unrecognized format keeps
    /// the stored format.
    pub fn update(&self, id: &str, changes: PostChanges) -> PostResult<Post> {
        let existing = self.get(id)?;

        let title = match changes.title {
            Some(title) => title.trim().to_string(),
            None => existing.title.clone(),
        };
        let content = changes.content.unwrap_or_else(|| existing.content.clone());
        let format = changes
            .format
            .as_deref()
            .and_then(PostFormat::parse)
            .unwrap_or(existing.format);

        validate_fields(&title, &content)?;

        let updated = Post {
            title,
            content,
            format,
            updated_at: timestamp_now().max(existing.created_at),
            ..existing
        };
        self.records.write(&updated)?;

        tracing::debug!(id = %updated.id, "updated post");
        Ok(updated)
    }

    /// Permanently remove a post
    pub fn delete(&self, id: &str) -> PostResult<()> {
        if !self.records.remove(id)? {
            return Err(PostError::not_found(id));
        }

        tracing::debug!(id = %id, "deleted post");
        Ok(())
    }

    /// Draw a random id not used by any stored record
    fn fresh_id(&self) -> PostResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = Uuid::new_v4().to_string();
            if !self.records.contains(&id)? {
                return Ok(id);
            }
            tracing::warn!(id = %id, "generated id already in use, drawing another");
        }
        Err(PostError::IdExhausted)
    }
}

/// Reject a title or content that is empty after trimming
pub fn validate_fields(title: &str, content: &str) -> PostResult<()> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(PostError::validation(REQUIRED_FIELDS_MESSAGE));
    }
    Ok(())
}

/// `updated_at` descending, then `created_at` descending, then id ascending
fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
