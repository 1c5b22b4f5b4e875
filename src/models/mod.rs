// src/models/mod.rs

//! Domain models for the application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod article;
mod config;
mod note;
mod report;

// Re-export all public types
pub use article::{Article, ArticleDetail, ArticleFilter, ArticleId, ArticleStub};
pub(crate) use config::parse_selector;
pub use config::{Config, ExtractorConfig, FetcherConfig, IngestConfig, StorageConfig};
pub use note::{Note, NoteId};
pub use report::{CandidateOutcome, CandidateStatus, RunReport};
