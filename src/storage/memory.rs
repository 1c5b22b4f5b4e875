//! In-memory storage backend.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticleId, ArticleStub, Note, NoteId};
use crate::storage::ArticleStore;
use crate::storage::collections::Collections;

/// Volatile store, used for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn note_count(&self) -> usize {
        self.state.read().await.notes().len()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create_article_if_absent(&self, stub: ArticleStub) -> Result<(Article, bool)> {
        self.state.write().await.create_article_if_absent(stub)
    }

    async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        Ok(self.state.read().await.list_articles(filter))
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.state.read().await.get_article(id)
    }

    async fn set_saved(&self, id: &ArticleId, saved: bool) -> Result<Article> {
        let (article, _) = self.state.write().await.set_saved(id, saved)?;
        Ok(article)
    }

    async fn create_note(&self, title: &str) -> Result<Note> {
        Ok(self.state.write().await.create_note(title))
    }

    async fn get_note(&self, id: &NoteId) -> Result<Note> {
        self.state.read().await.get_note(id)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.state.write().await.delete_note(id)?;
        Ok(())
    }

    async fn push_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        let (article, _) = self.state.write().await.push_note_id(article_id, note_id)?;
        Ok(article)
    }

    async fn pull_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        let (article, _) = self.state.write().await.pull_note_id(article_id, note_id)?;
        Ok(article)
    }
}
