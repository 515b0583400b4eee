//! Post operation errors

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by `PostStore` and `PostService`
#[derive(Error, Debug)]
pub enum PostError {
    /// Input rejected: empty title or content, malformed id
    #[error("{0}")]
    Validation(String),

    /// No post has this id
    #[error("Post not found: {id}")]
    NotFound { id: String },

    /// Every generated id collided with an existing record
    #[error("Could not allocate an unused post id")]
    IdExhausted,

    /// The record store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PostError {
    pub fn validation(message: impl Into<String>) -> Self {
        PostError::Validation(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        PostError::NotFound { id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PostError::Validation(_))
    }
}

/// Result type for post operations
pub type PostResult<T> = Result<T, PostError>;
