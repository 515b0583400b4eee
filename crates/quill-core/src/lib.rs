//! Quill Core Library
//!
//! This crate provides the core functionality for Quill, a minimal personal
//! blogging tool: posts written in a restricted markdown dialect or raw HTML,
//! stored one file per post or as a single JSON blob.
//!
//! # Architecture
//!
//! - **PostService**: validates and normalizes caller input
//! - **PostStore**: owns the post lifecycle (ids, timestamps, invariants)
//! - **RecordStore**: durable per-id records (files, blob, or memory)
//! - **render**: markdown to HTML, then `[[id]]` reference links
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let service = PostService::new(open_record_store(&config)?);
//!
//! let post = service.create(NewPost::new("Hello", "**hi**"))?;
//! let html = service.render(&post.id)?;
//! ```
//!
//! # Modules
//!
//! - `service`: Input validation facade (main entry point)
//! - `store`: Post lifecycle over a record store
//! - `storage`: Record store trait and backends
//! - `models`: Post and input types
//! - `render`: Markdown rendering and reference linking
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod service;
pub mod storage;
pub mod store;

pub use config::{Config, StorageKind};
pub use error::{PostError, PostResult};
pub use models::{NewPost, Post, PostChanges, PostDraft, PostFormat};
pub use render::{linkify, render, render_page, render_post};
pub use service::{PostService, Reference};
pub use storage::{
    open_record_store, BlobRecordStore, FileRecordStore, MemoryRecordStore, RecordStore,
    StorageError, StorageResult,
};
pub use store::PostStore;
