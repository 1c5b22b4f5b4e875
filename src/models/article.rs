// src/models/article.rs

//! Article records and the stubs they are created from.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Note, NoteId};

/// Opaque article identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ArticleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unpersisted article candidate produced by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleStub {
    /// Headline text (empty if the item had no title element)
    pub title: String,

    /// Article URL, the dedup key
    pub link: String,

    /// Teaser text (empty if the item had no summary element)
    pub summary: String,
}

impl ArticleStub {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
        }
    }
}

/// A stored article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,

    pub title: String,

    /// Unique across all articles
    pub link: String,

    pub summary: String,

    /// Whether the user kept this article
    #[serde(default)]
    pub saved: bool,

    /// Attached notes, in attach order, without duplicates
    #[serde(rename = "notes", default)]
    pub note_ids: Vec<NoteId>,
}

impl Article {
    /// Build a fresh unsaved article from an extracted stub.
    pub fn from_stub(id: ArticleId, stub: ArticleStub) -> Self {
        Self {
            id,
            title: stub.title,
            link: stub.link,
            summary: stub.summary,
            saved: false,
            note_ids: Vec::new(),
        }
    }

    pub fn has_note(&self, note_id: &NoteId) -> bool {
        self.note_ids.contains(note_id)
    }
}

/// Filter for listing articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArticleFilter {
    pub saved: bool,
}

impl ArticleFilter {
    pub fn saved() -> Self {
        Self { saved: true }
    }

    pub fn unsaved() -> Self {
        Self { saved: false }
    }

    pub fn matches(&self, article: &Article) -> bool {
        article.saved == self.saved
    }
}

/// An article together with its resolved notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub article: Article,

    /// Notes that exist, in the article's `notes` order
    pub notes: Vec<Note>,

    /// Referenced note ids that no longer exist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<NoteId>,
}

impl ArticleDetail {
    pub fn is_consistent(&self) -> bool {
        self.unresolved.is_empty()
    }
}
