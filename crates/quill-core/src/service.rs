//! Post use-case service.
//!
//! # Responsibility
//! - Accept raw caller input (`NewPost`, `PostChanges`, id strings).
//! - Normalize it: trim ids and titles, default unknown formats.
//! - Reject malformed ids before they reach storage.
//! - Delegate lifecycle and persistence to `PostStore`.
//!
//! # Invariants
//! - Ids reaching the store match `[A-Za-z0-9_-]+`.
//! - Callers never choose ids or timestamps.

use crate::error::{PostError, PostResult};
use crate::models::{is_valid_id, NewPost, Post, PostChanges, PostDraft, PostFormat};
use crate::render;
use crate::storage::RecordStore;
use crate::store::PostStore;

/// A `[[id]]` reference found in a post, and whether its target exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub exists: bool,
}

/// Validation facade over a `PostStore`
pub struct PostService<R: RecordStore> {
    store: PostStore<R>,
}

impl<R: RecordStore> PostService<R> {
    /// Creates a service over the given record store.
    pub fn new(records: R) -> Self {
        Self {
            store: PostStore::new(records),
        }
    }

    /// Lists all posts, most recently updated first.
    pub fn list(&self) -> PostResult<Vec<Post>> {
        self.store.list()
    }

    /// Gets one post.
    pub fn get(&self, id: &str) -> PostResult<Post> {
        let id = sanitize_id(id)?;
        self.store.get(id)
    }

    /// Creates a post from a raw payload.
    ///
    /// Missing title or content count as empty; an absent or unknown format
    /// becomes markdown.
    pub fn create(&self, input: NewPost) -> PostResult<Post> {
        let draft = PostDraft {
            title: input.title.unwrap_or_default().trim().to_string(),
            content: input.content.unwrap_or_default(),
            format: PostFormat::parse_or_default(input.format.as_deref()),
        };
        self.store.create(draft)
    }

    /// Applies a raw change set to an existing post.
    pub fn update(&self, id: &str, changes: PostChanges) -> PostResult<Post> {
        let id = sanitize_id(id)?;
        self.store.update(id, changes)
    }

    /// Deletes a post.
    pub fn delete(&self, id: &str) -> PostResult<()> {
        let id = sanitize_id(id)?;
        self.store.delete(id)
    }

    /// Renders one post's content for display.
    pub fn render(&self, id: &str) -> PostResult<String> {
        Ok(render::render_post(&self.get(id)?))
    }

    /// Resolves the `[[id]]` references in one post against the store.
    pub fn references(&self, id: &str) -> PostResult<Vec<Reference>> {
        let post = self.get(id)?;
        render::references(&post.content)
            .into_iter()
            .map(|target| {
                let exists = self.store.records().contains(&target)?;
                Ok(Reference { id: target, exists })
            })
            .collect()
    }
}

/// Trim an id and check its shape
pub fn sanitize_id(id: &str) -> PostResult<&str> {
    let trimmed = id.trim();
    if !is_valid_id(trimmed) {
        return Err(PostError::validation("invalid post id"));
    }
    Ok(trimmed)
}
