// src/services/lifecycle.rs

//! Saved/unsaved lifecycle of an article.
//!
//! Two states, no terminal state. Both transitions are idempotent, and
//! unsaving never removes the record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Article, ArticleId};
use crate::storage::ArticleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleState {
    Unsaved,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Save,
    Unsave,
}

impl ArticleState {
    pub fn from_flag(saved: bool) -> Self {
        if saved { Self::Saved } else { Self::Unsaved }
    }

    pub fn is_saved(self) -> bool {
        self == Self::Saved
    }

    /// Next state after `transition`. Every transition is valid from every state.
    pub fn apply(self, transition: Transition) -> Self {
        match (self, transition) {
            (_, Transition::Save) => Self::Saved,
            (_, Transition::Unsave) => Self::Unsaved,
        }
    }
}

impl Article {
    pub fn state(&self) -> ArticleState {
        ArticleState::from_flag(self.saved)
    }
}

/// Applies lifecycle transitions against the store.
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn ArticleStore>,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Mark an article saved. Fails with `NotFound` if it does not exist.
    pub async fn save(&self, id: &ArticleId) -> Result<Article> {
        self.transition(id, Transition::Save).await
    }

    /// Clear the saved flag. The article stays in storage.
    pub async fn unsave(&self, id: &ArticleId) -> Result<Article> {
        self.transition(id, Transition::Unsave).await
    }

    async fn transition(&self, id: &ArticleId, transition: Transition) -> Result<Article> {
        // The target does not depend on the current state, so a single
        // store write is enough.
        let target = ArticleState::Unsaved.apply(transition);
        let article = self.store.set_saved(id, target.is_saved()).await?;
        log::info!("Article {} is now {:?}", id, article.state());
        Ok(article)
    }
}
