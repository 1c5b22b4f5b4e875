// src/models/report.rs

//! Ingestion run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ArticleId;

/// Outcome of a single candidate's dedup-insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateStatus {
    /// A new article was stored
    Created { id: ArticleId },
    /// An article with the same link already existed
    Skipped,
    /// The store rejected or failed the write
    Failed { error: String },
}

/// Candidate outcome keyed by link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateOutcome {
    pub link: String,
    #[serde(flatten)]
    pub status: CandidateStatus,
}

/// Aggregated result of one ingestion pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Document the candidates were extracted from
    pub source: String,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Per-candidate outcomes, in extraction order
    pub outcomes: Vec<CandidateOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Tally outcomes into a report.
    pub fn from_outcomes(
        source: impl Into<String>,
        outcomes: Vec<CandidateOutcome>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut report = Self {
            source: source.into(),
            created: 0,
            skipped: 0,
            failed: 0,
            outcomes: Vec::with_capacity(outcomes.len()),
            started_at,
            finished_at: Utc::now(),
        };
        for outcome in outcomes {
            match outcome.status {
                CandidateStatus::Created { .. } => report.created += 1,
                CandidateStatus::Skipped => report.skipped += 1,
                CandidateStatus::Failed { .. } => report.failed += 1,
            }
            report.outcomes.push(outcome);
        }
        report
    }

    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed
    }

    /// Ids of articles created in this run.
    pub fn created_ids(&self) -> Vec<&ArticleId> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                CandidateStatus::Created { id } => Some(id),
                _ => None,
            })
            .collect()
    }
}
