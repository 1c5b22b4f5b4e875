//! Pipeline entry points.
//!
//! - `IngestPipeline`: fetch the configured page and dedup-insert its articles

pub mod ingest;

pub use ingest::IngestPipeline;
