//! Storage abstractions for article and note persistence.
//!
//! Two logical collections, Articles and Notes, keyed by opaque id.
//! Backends enforce link uniqueness and apply note-id list changes as
//! atomic append/remove operations.
//!
//! ## Local Directory Structure
//!
//! ```text
//! storage/
//! ├── articles.json         # Articles in insertion order
//! └── notes.json            # Notes keyed by id
//! ```

mod collections;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticleId, ArticleStub, Note, NoteId};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Trait for article storage backends.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert an article for `stub` unless one with the same link exists.
    ///
    /// Returns the stored article and `true` if it was created by this call.
    /// Concurrent calls with the same link create at most one article.
    async fn create_article_if_absent(&self, stub: ArticleStub) -> Result<(Article, bool)>;

    /// List articles matching `filter`, in storage order.
    async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>>;

    async fn get_article(&self, id: &ArticleId) -> Result<Article>;

    async fn set_saved(&self, id: &ArticleId, saved: bool) -> Result<Article>;

    async fn create_note(&self, title: &str) -> Result<Note>;

    async fn get_note(&self, id: &NoteId) -> Result<Note>;

    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    /// Append `note_id` to the article's notes if not already present.
    async fn push_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article>;

    /// Remove `note_id` from the article's notes; absent ids are a no-op.
    async fn pull_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article>;
}
