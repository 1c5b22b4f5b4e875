// src/services/relations.rs

//! Attaching and detaching notes.
//!
//! Attach and detach each touch two records (the note and the article's
//! note list). The store gives no multi-record transaction, so each is a
//! two-step operation with compensation, and a failure between the steps is
//! returned as `AttachIncomplete` / `DetachIncomplete` naming the note.

use std::sync::Arc;

use futures::future;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleDetail, ArticleId, NoteId};
use crate::storage::ArticleStore;

/// Manages the article → note relation.
#[derive(Clone)]
pub struct RelationManager {
    store: Arc<dyn ArticleStore>,
}

impl RelationManager {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Create a note and append it to the article's notes.
    pub async fn attach_note(&self, article_id: &ArticleId, title: &str) -> Result<Article> {
        // No note is created for an article that does not exist.
        self.store.get_article(article_id).await?;

        let note = self.store.create_note(title).await?;

        match self.store.push_note_id(article_id, &note.id).await {
            Ok(article) => {
                log::debug!("Attached note {} to article {}", note.id, article_id);
                Ok(article)
            }
            Err(push_err) => {
                let note_removed = match self.store.delete_note(&note.id).await {
                    Ok(()) => true,
                    Err(e) => {
                        log::error!("Failed to remove unattached note {}: {}", note.id, e);
                        false
                    }
                };
                log::warn!(
                    "Attach of note {} to article {} failed: {}",
                    note.id,
                    article_id,
                    push_err
                );
                Err(AppError::AttachIncomplete {
                    article_id: article_id.clone(),
                    note_id: note.id,
                    note_removed,
                    reason: push_err.to_string(),
                })
            }
        }
    }

    /// Delete a note, then remove it from the article's notes.
    ///
    /// The note must be referenced by the article. A referenced note that is
    /// already gone from storage is treated as deleted, which lets a retry
    /// repair an earlier `DetachIncomplete`.
    pub async fn detach_note(&self, article_id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        let article = self.store.get_article(article_id).await?;
        if !article.has_note(note_id) {
            return Err(AppError::not_found("Note", note_id));
        }

        match self.store.delete_note(note_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::warn!(
                    "Note {} referenced by article {} was already missing",
                    note_id,
                    article_id
                );
            }
            Err(e) => return Err(e),
        }

        self.store
            .pull_note_id(article_id, note_id)
            .await
            .map_err(|e| {
                log::warn!(
                    "Note {} deleted but still referenced by article {}: {}",
                    note_id,
                    article_id,
                    e
                );
                AppError::DetachIncomplete {
                    article_id: article_id.clone(),
                    note_id: note_id.clone(),
                    reason: e.to_string(),
                }
            })
    }

    /// Load an article and resolve its notes.
    ///
    /// Ids whose note no longer exists are listed in `unresolved`.
    pub async fn article_with_notes(&self, article_id: &ArticleId) -> Result<ArticleDetail> {
        let article = self.store.get_article(article_id).await?;

        let lookups = future::join_all(
            article
                .note_ids
                .iter()
                .map(|id| async move { (id, self.store.get_note(id).await) }),
        )
        .await;

        let mut notes = Vec::new();
        let mut unresolved = Vec::new();
        for (id, result) in lookups {
            match result {
                Ok(note) => notes.push(note),
                Err(e) if e.is_not_found() => unresolved.push(id.clone()),
                Err(e) => return Err(e),
            }
        }

        Ok(ArticleDetail {
            article,
            notes,
            unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::{ArticleFilter, ArticleStub, Note};
    use crate::storage::MemoryStore;

    /// Memory store whose individual operations can be switched to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_push: AtomicBool,
        fail_pull: AtomicBool,
        fail_delete: AtomicBool,
    }

    fn outage() -> AppError {
        AppError::store("storage unavailable")
    }

    #[async_trait]
    impl ArticleStore for FlakyStore {
        async fn create_article_if_absent(&self, stub: ArticleStub) -> Result<(Article, bool)> {
            self.inner.create_article_if_absent(stub).await
        }
        async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
            self.inner.list_articles(filter).await
        }
        async fn get_article(&self, id: &ArticleId) -> Result<Article> {
            self.inner.get_article(id).await
        }
        async fn set_saved(&self, id: &ArticleId, saved: bool) -> Result<Article> {
            self.inner.set_saved(id, saved).await
        }
        async fn create_note(&self, title: &str) -> Result<Note> {
            self.inner.create_note(title).await
        }
        async fn get_note(&self, id: &NoteId) -> Result<Note> {
            self.inner.get_note(id).await
        }
        async fn delete_note(&self, id: &NoteId) -> Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.delete_note(id).await
        }
        async fn push_note_id(&self, a: &ArticleId, n: &NoteId) -> Result<Article> {
            if self.fail_push.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.push_note_id(a, n).await
        }
        async fn pull_note_id(&self, a: &ArticleId, n: &NoteId) -> Result<Article> {
            if self.fail_pull.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.pull_note_id(a, n).await
        }
    }

    async fn setup() -> (Arc<FlakyStore>, RelationManager, Article) {
        let store = Arc::new(FlakyStore::default());
        let (article, _) = store
            .create_article_if_absent(ArticleStub::new("t", "https://example.com/a", "s"))
            .await
            .unwrap();
        let manager = RelationManager::new(store.clone());
        (store, manager, article)
    }

    #[tokio::test]
    async fn test_attach_then_detach_round_trip() {
        let (store, manager, article) = setup().await;
        let keep = manager.attach_note(&article.id, "keep").await.unwrap();
        let before = keep.note_ids.clone();

        let attached = manager.attach_note(&article.id, "x").await.unwrap();
        assert_eq!(attached.note_ids.len(), 2);
        let note_id = attached.note_ids[1].clone();
        assert_eq!(store.get_note(&note_id).await.unwrap().title, "x");

        let detached = manager.detach_note(&article.id, &note_id).await.unwrap();
        assert_eq!(detached.note_ids, before);
        assert!(store.get_note(&note_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_attach_to_missing_article_creates_nothing() {
        let (store, manager, _) = setup().await;
        let missing = ArticleId::from("missing");

        let err = manager.attach_note(&missing, "x").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.inner.note_count().await, 0);
    }

    #[tokio::test]
    async fn test_attach_push_failure_reports_and_removes_note() {
        let (store, manager, article) = setup().await;
        store.fail_push.store(true, Ordering::SeqCst);

        let err = manager.attach_note(&article.id, "x").await.unwrap_err();
        match err {
            AppError::AttachIncomplete {
                note_id,
                note_removed,
                ..
            } => {
                assert!(note_removed);
                assert!(store.get_note(&note_id).await.unwrap_err().is_not_found());
            }
            other => panic!("expected AttachIncomplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attach_failure_with_failed_cleanup_names_orphan() {
        let (store, manager, article) = setup().await;
        store.fail_push.store(true, Ordering::SeqCst);
        store.fail_delete.store(true, Ordering::SeqCst);

        let err = manager.attach_note(&article.id, "x").await.unwrap_err();
        let AppError::AttachIncomplete {
            note_id,
            note_removed,
            ..
        } = err
        else {
            panic!("expected AttachIncomplete");
        };
        assert!(!note_removed);
        // The orphan is still there and can be cleaned up by id.
        assert_eq!(store.get_note(&note_id).await.unwrap().title, "x");
    }

    #[tokio::test]
    async fn test_detach_pull_failure_is_detectable_and_repairable() {
        let (store, manager, article) = setup().await;
        let attached = manager.attach_note(&article.id, "x").await.unwrap();
        let note_id = attached.note_ids[0].clone();

        store.fail_pull.store(true, Ordering::SeqCst);
        let err = manager.detach_note(&article.id, &note_id).await.unwrap_err();
        assert!(matches!(err, AppError::DetachIncomplete { .. }));

        let detail = manager.article_with_notes(&article.id).await.unwrap();
        assert!(detail.notes.is_empty());
        assert_eq!(detail.unresolved, vec![note_id.clone()]);
        assert!(!detail.is_consistent());

        store.fail_pull.store(false, Ordering::SeqCst);
        let repaired = manager.detach_note(&article.id, &note_id).await.unwrap();
        assert!(repaired.note_ids.is_empty());
    }

    #[tokio::test]
    async fn test_detach_delete_failure_leaves_relation_intact() {
        let (store, manager, article) = setup().await;
        let attached = manager.attach_note(&article.id, "x").await.unwrap();
        let note_id = attached.note_ids[0].clone();

        store.fail_delete.store(true, Ordering::SeqCst);
        assert!(matches!(
            manager.detach_note(&article.id, &note_id).await,
            Err(AppError::Store(_))
        ));

        let detail = manager.article_with_notes(&article.id).await.unwrap();
        assert_eq!(detail.notes.len(), 1);
        assert!(detail.is_consistent());
    }

    #[tokio::test]
    async fn test_detach_unrelated_note_is_not_found() {
        let (store, manager, article) = setup().await;
        let stray = store.create_note("elsewhere").await.unwrap();

        let err = manager.detach_note(&article.id, &stray.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.get_note(&stray.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_article_with_notes_in_order() {
        let (_, manager, article) = setup().await;
        manager.attach_note(&article.id, "one").await.unwrap();
        manager.attach_note(&article.id, "two").await.unwrap();

        let detail = manager.article_with_notes(&article.id).await.unwrap();
        let titles: Vec<_> = detail.notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two"]);
        assert!(detail.is_consistent());
    }

    #[tokio::test]
    async fn test_article_with_notes_missing_article() {
        let (_, manager, _) = setup().await;
        let err = manager
            .article_with_notes(&ArticleId::from("missing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
