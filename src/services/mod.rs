//! Service layer for the application.
//!
//! This module contains the business logic for:
//! - Document retrieval (`Fetcher`, `HttpFetcher`)
//! - Candidate extraction (`Extractor`)
//! - The saved/unsaved lifecycle (`Lifecycle`)
//! - Note attach/detach (`RelationManager`)

mod extractor;
mod fetcher;
mod lifecycle;
mod relations;

pub use extractor::{Extraction, Extractor};
pub use fetcher::{Fetcher, HttpFetcher};
pub use lifecycle::{ArticleState, Lifecycle, Transition};
pub use relations::RelationManager;
