// src/pipeline/ingest.rs

//! Article ingestion pipeline.
//!
//! Fetch → extract → dedup-insert. A failed fetch or extract aborts the run
//! before any store write. Per-candidate store failures are recorded in the
//! report and do not stop the remaining candidates.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{ArticleStub, CandidateOutcome, CandidateStatus, Config, RunReport};
use crate::services::{Extractor, Fetcher};
use crate::storage::ArticleStore;

/// A candidate after in-pass deduplication.
enum Candidate {
    /// First occurrence of its link in this pass
    Insert(ArticleStub),
    /// Link already seen earlier in this pass
    Repeat(String),
}

/// Orchestrates one ingestion pass over the configured endpoint.
pub struct IngestPipeline {
    endpoint: String,
    max_concurrent: usize,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
    store: Arc<dyn ArticleStore>,
}

impl IngestPipeline {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<Extractor>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            endpoint: config.fetcher.endpoint.clone(),
            max_concurrent: config.ingest.max_concurrent.max(1),
            fetcher,
            extractor,
            store,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one pass and return the aggregated report.
    ///
    /// Returns only after every candidate write has settled.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        log::info!("Ingesting articles from {}", self.endpoint);

        let raw = self.fetcher.fetch(&self.endpoint).await?;
        let candidates = self.extract_candidates(&raw)?;
        log::info!("Extracted {} candidates", candidates.len());

        let outcomes = self.store_candidates(candidates).await;
        let report = RunReport::from_outcomes(&self.endpoint, outcomes, started_at);

        log::info!(
            "Ingest complete: {} created, {} skipped, {} failed",
            report.created,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    /// Parse the document and collect its stubs.
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    fn extract_candidates(&self, raw: &str) -> Result<Vec<ArticleStub>> {
        let extraction = self.extractor.extract(raw)?;
        Ok(extraction.stubs().collect())
    }

    /// Dedup-insert every candidate, preserving extraction order in the result.
    async fn store_candidates(&self, candidates: Vec<ArticleStub>) -> Vec<CandidateOutcome> {
        let mut seen = HashSet::new();
        let jobs: Vec<Candidate> = candidates
            .into_iter()
            .map(|stub| {
                // Blank links go to the store so they are reported as failures.
                if stub.link.trim().is_empty() || seen.insert(stub.link.clone()) {
                    Candidate::Insert(stub)
                } else {
                    Candidate::Repeat(stub.link)
                }
            })
            .collect();

        stream::iter(jobs)
            .map(|job| async move {
                match job {
                    Candidate::Insert(stub) => self.insert_candidate(stub).await,
                    Candidate::Repeat(link) => {
                        log::debug!("Skipping repeated link {}", link);
                        CandidateOutcome {
                            link,
                            status: CandidateStatus::Skipped,
                        }
                    }
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn insert_candidate(&self, stub: ArticleStub) -> CandidateOutcome {
        let link = stub.link.clone();
        let status = match self.store.create_article_if_absent(stub).await {
            Ok((article, true)) => {
                log::debug!("Created article {} for {}", article.id, link);
                CandidateStatus::Created { id: article.id }
            }
            Ok((_, false)) => CandidateStatus::Skipped,
            Err(e) if e.is_conflict() => CandidateStatus::Skipped,
            Err(e) => {
                log::warn!("Failed to store article {}: {}", link, e);
                CandidateStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        CandidateOutcome { link, status }
    }
}
