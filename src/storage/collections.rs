//! In-memory article and note collections shared by the store backends.
//!
//! Every method runs to completion without yielding, so a backend that holds
//! its lock across a call gets atomic check-then-insert and list mutation.

use std::collections::{BTreeMap, HashMap};

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleFilter, ArticleId, ArticleStub, Note, NoteId};

#[derive(Debug, Clone, Default)]
pub(crate) struct Collections {
    /// Articles in insertion order
    articles: Vec<Article>,
    by_id: HashMap<ArticleId, usize>,
    by_link: HashMap<String, usize>,
    notes: BTreeMap<NoteId, Note>,
}

impl Collections {
    /// Rebuild collections from persisted records, rejecting duplicate keys.
    pub fn from_parts(articles: Vec<Article>, notes: Vec<Note>) -> Result<Self> {
        let mut collections = Self::default();
        for article in articles {
            if collections.by_id.contains_key(&article.id) {
                return Err(AppError::store(format!(
                    "duplicate article id {} in storage",
                    article.id
                )));
            }
            if collections.by_link.contains_key(&article.link) {
                return Err(AppError::store(format!(
                    "duplicate article link {} in storage",
                    article.link
                )));
            }
            collections.insert_article(article);
        }
        for note in notes {
            if collections.notes.insert(note.id.clone(), note).is_some() {
                return Err(AppError::store("duplicate note id in storage"));
            }
        }
        Ok(collections)
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn notes(&self) -> Vec<&Note> {
        self.notes.values().collect()
    }

    fn insert_article(&mut self, article: Article) {
        let idx = self.articles.len();
        self.by_id.insert(article.id.clone(), idx);
        self.by_link.insert(article.link.clone(), idx);
        self.articles.push(article);
    }

    fn article_mut(&mut self, id: &ArticleId) -> Result<&mut Article> {
        let idx = *self
            .by_id
            .get(id)
            .ok_or_else(|| AppError::not_found("Article", id))?;
        Ok(&mut self.articles[idx])
    }

    /// Insert a new article unless one with the same link exists.
    ///
    /// Returns the stored article and whether it was created.
    pub fn create_article_if_absent(&mut self, stub: ArticleStub) -> Result<(Article, bool)> {
        if stub.link.trim().is_empty() {
            return Err(AppError::validation("article link is empty"));
        }
        if let Some(&idx) = self.by_link.get(&stub.link) {
            return Ok((self.articles[idx].clone(), false));
        }
        let article = Article::from_stub(ArticleId::generate(), stub);
        self.insert_article(article.clone());
        Ok((article, true))
    }

    pub fn list_articles(&self, filter: ArticleFilter) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.by_id
            .get(id)
            .map(|&idx| self.articles[idx].clone())
            .ok_or_else(|| AppError::not_found("Article", id))
    }

    /// Set the saved flag. The bool reports whether the flag changed.
    pub fn set_saved(&mut self, id: &ArticleId, saved: bool) -> Result<(Article, bool)> {
        let article = self.article_mut(id)?;
        let changed = article.saved != saved;
        article.saved = saved;
        Ok((article.clone(), changed))
    }

    pub fn create_note(&mut self, title: &str) -> Note {
        let note = Note {
            id: NoteId::generate(),
            title: title.to_string(),
        };
        self.notes.insert(note.id.clone(), note.clone());
        note
    }

    pub fn get_note(&self, id: &NoteId) -> Result<Note> {
        self.notes
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Note", id))
    }

    pub fn delete_note(&mut self, id: &NoteId) -> Result<Note> {
        self.notes
            .remove(id)
            .ok_or_else(|| AppError::not_found("Note", id))
    }

    /// Append a note id unless already present.
    pub fn push_note_id(
        &mut self,
        article_id: &ArticleId,
        note_id: &NoteId,
    ) -> Result<(Article, bool)> {
        let article = self.article_mut(article_id)?;
        let changed = !article.has_note(note_id);
        if changed {
            article.note_ids.push(note_id.clone());
        }
        Ok((article.clone(), changed))
    }

    /// Remove a note id; absent ids are a no-op.
    pub fn pull_note_id(
        &mut self,
        article_id: &ArticleId,
        note_id: &NoteId,
    ) -> Result<(Article, bool)> {
        let article = self.article_mut(article_id)?;
        let before = article.note_ids.len();
        article.note_ids.retain(|id| id != note_id);
        let changed = article.note_ids.len() != before;
        Ok((article.clone(), changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(link: &str) -> ArticleStub {
        ArticleStub::new(format!("title {link}"), link, "")
    }

    #[test]
    fn test_create_dedups_on_link() {
        let mut c = Collections::default();
        let (first, created) = c.create_article_if_absent(stub("L1")).unwrap();
        assert!(created);

        let (second, created) = c
            .create_article_if_absent(ArticleStub::new("other", "L1", "other"))
            .unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(second.title, "title L1");
        assert_eq!(c.articles().len(), 1);
    }

    #[test]
    fn test_create_rejects_empty_link() {
        let mut c = Collections::default();
        let err = c.create_article_if_absent(stub("  ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut c = Collections::default();
        let (a, _) = c.create_article_if_absent(stub("L1")).unwrap();
        let (b, _) = c.create_article_if_absent(stub("L2")).unwrap();
        let (d, _) = c.create_article_if_absent(stub("L3")).unwrap();
        c.set_saved(&b.id, true).unwrap();

        let unsaved: Vec<_> = c
            .list_articles(ArticleFilter::unsaved())
            .into_iter()
            .map(|x| x.id)
            .collect();
        assert_eq!(unsaved, vec![a.id, d.id]);
        assert_eq!(c.list_articles(ArticleFilter::saved())[0].id, b.id);
    }

    #[test]
    fn test_push_is_idempotent_and_pull_tolerates_absent() {
        let mut c = Collections::default();
        let (a, _) = c.create_article_if_absent(stub("L1")).unwrap();
        let note = c.create_note("x");

        let (_, changed) = c.push_note_id(&a.id, &note.id).unwrap();
        assert!(changed);
        let (updated, changed) = c.push_note_id(&a.id, &note.id).unwrap();
        assert!(!changed);
        assert_eq!(updated.note_ids, vec![note.id.clone()]);

        let (updated, changed) = c.pull_note_id(&a.id, &note.id).unwrap();
        assert!(changed);
        assert!(updated.note_ids.is_empty());
        let (_, changed) = c.pull_note_id(&a.id, &note.id).unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_missing_records() {
        let mut c = Collections::default();
        assert!(c.get_article(&ArticleId::from("nope")).unwrap_err().is_not_found());
        assert!(c.set_saved(&ArticleId::from("nope"), true).unwrap_err().is_not_found());
        assert!(c.delete_note(&NoteId::from("nope")).unwrap_err().is_not_found());
        assert!(
            c.push_note_id(&ArticleId::from("nope"), &NoteId::from("n"))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_from_parts_rejects_duplicate_links() {
        let a = Article::from_stub(ArticleId::from("1"), stub("L1"));
        let b = Article::from_stub(ArticleId::from("2"), stub("L1"));
        assert!(Collections::from_parts(vec![a, b], vec![]).is_err());
    }
}
