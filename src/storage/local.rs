//! Local filesystem storage implementation.
//!
//! Keeps both collections in memory behind a single async mutex and flushes
//! the touched collection to disk before releasing it. A mutation only
//! becomes visible once its file write has succeeded.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── articles.json         # Vec<Article>, insertion order
//! └── notes.json            # Vec<Note>
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleFilter, ArticleId, ArticleStub, Note, NoteId};
use crate::storage::ArticleStore;
use crate::storage::collections::Collections;

const ARTICLES_KEY: &str = "articles.json";
const NOTES_KEY: &str = "notes.json";

/// Which collection file a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touched {
    Articles,
    Notes,
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    root_dir: PathBuf,
    state: Mutex<Collections>,
}

impl LocalStorage {
    /// Open storage rooted at the given directory, loading existing records.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let articles: Vec<Article> = read_json(&root_dir.join(ARTICLES_KEY))
            .await?
            .unwrap_or_default();
        let notes: Vec<Note> = read_json(&root_dir.join(NOTES_KEY))
            .await?
            .unwrap_or_default();

        log::info!(
            "Opened storage at {} ({} articles, {} notes)",
            root_dir.display(),
            articles.len(),
            notes.len()
        );

        Ok(Self {
            state: Mutex::new(Collections::from_parts(articles, notes)?),
            root_dir,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    async fn flush(&self, collections: &Collections, touched: Touched) -> Result<()> {
        let (key, result) = match touched {
            Touched::Articles => (
                ARTICLES_KEY,
                self.write_json(ARTICLES_KEY, collections.articles()).await,
            ),
            Touched::Notes => (NOTES_KEY, self.write_json(NOTES_KEY, &collections.notes()).await),
        };
        result.map_err(|e| AppError::store(format!("failed to persist {key}: {e}")))
    }

    /// Apply `op` to a copy of the collections, persist it, then publish it.
    ///
    /// `op` returns its value and whether anything changed; unchanged
    /// collections are not rewritten.
    async fn mutate<T>(
        &self,
        touched: Touched,
        op: impl FnOnce(&mut Collections) -> Result<(T, bool)>,
    ) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let (value, changed) = op(&mut next)?;
        if changed {
            self.flush(&next, touched).await?;
            *state = next;
        }
        Ok(value)
    }
}

/// Read JSON data, returning None if the file doesn't exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

#[async_trait]
impl ArticleStore for LocalStorage {
    async fn create_article_if_absent(&self, stub: ArticleStub) -> Result<(Article, bool)> {
        self.mutate(Touched::Articles, |c| {
            let (article, created) = c.create_article_if_absent(stub)?;
            Ok(((article, created), created))
        })
        .await
    }

    async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        Ok(self.state.lock().await.list_articles(filter))
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.state.lock().await.get_article(id)
    }

    async fn set_saved(&self, id: &ArticleId, saved: bool) -> Result<Article> {
        self.mutate(Touched::Articles, |c| c.set_saved(id, saved)).await
    }

    async fn create_note(&self, title: &str) -> Result<Note> {
        self.mutate(Touched::Notes, |c| Ok((c.create_note(title), true)))
            .await
    }

    async fn get_note(&self, id: &NoteId) -> Result<Note> {
        self.state.lock().await.get_note(id)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.mutate(Touched::Notes, |c| {
            c.delete_note(id)?;
            Ok(((), true))
        })
        .await
    }

    async fn push_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        self.mutate(Touched::Articles, |c| c.push_note_id(article_id, note_id))
            .await
    }

    async fn pull_note_id(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        self.mutate(Touched::Articles, |c| c.pull_note_id(article_id, note_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).await.unwrap();

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = tokio::fs::read(tmp.path().join("test.txt")).await.unwrap();
        assert_eq!(data, b"hello".to_vec());
        assert!(!tmp.path().join("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_open_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path().join("fresh")).await.unwrap();

        let articles = storage.list_articles(ArticleFilter::unsaved()).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();

        let (article_id, note_id) = {
            let storage = LocalStorage::open(tmp.path()).await.unwrap();
            let (article, created) = storage
                .create_article_if_absent(ArticleStub::new("Title", "https://example.com/1", ""))
                .await
                .unwrap();
            assert!(created);
            storage.set_saved(&article.id, true).await.unwrap();
            let note = storage.create_note("remember this").await.unwrap();
            storage.push_note_id(&article.id, &note.id).await.unwrap();
            (article.id, note.id)
        };

        let storage = LocalStorage::open(tmp.path()).await.unwrap();
        let article = storage.get_article(&article_id).await.unwrap();
        assert!(article.saved);
        assert_eq!(article.note_ids, vec![note_id.clone()]);
        assert_eq!(
            storage.get_note(&note_id).await.unwrap().title,
            "remember this"
        );

        let (_, created) = storage
            .create_article_if_absent(ArticleStub::new("Again", "https://example.com/1", ""))
            .await
            .unwrap();
        assert!(!created);
    }

    #[tokio::test]
    async fn test_delete_note_persists() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).await.unwrap();
        let note = storage.create_note("temp").await.unwrap();
        storage.delete_note(&note.id).await.unwrap();

        let reopened = LocalStorage::open(tmp.path()).await.unwrap();
        assert!(reopened.get_note(&note.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_flush_is_not_published() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).await.unwrap();
        // A directory where the temp file should go makes the write fail.
        std::fs::create_dir_all(tmp.path().join("articles.tmp")).unwrap();

        let err = storage
            .create_article_if_absent(ArticleStub::new("t", "https://example.com/x", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));

        let articles = storage.list_articles(ArticleFilter::unsaved()).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("articles.json"), b"{not json").unwrap();

        assert!(matches!(
            LocalStorage::open(tmp.path()).await,
            Err(AppError::Json(_))
        ));
    }
}
