//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior and source endpoint
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Selectors used to pull candidates out of the document
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Ingestion run settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Where records are persisted
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.endpoint.trim().is_empty() {
            return Err(AppError::validation("fetcher.endpoint is empty"));
        }
        url::Url::parse(&self.fetcher.endpoint)?;
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.ingest.max_concurrent == 0 {
            return Err(AppError::validation("ingest.max_concurrent must be > 0"));
        }
        if self.extractor.link_attr.trim().is_empty() {
            return Err(AppError::validation("extractor.link_attr is empty"));
        }
        for selector in [
            &self.extractor.item_selector,
            &self.extractor.title_selector,
            &self.extractor.summary_selector,
        ] {
            if selector.trim().is_empty() {
                return Err(AppError::validation("extractor selectors must not be empty"));
            }
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into `AppError::Selector`.
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// HTTP client settings and the document to ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Page the articles are scraped from
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// CSS selectors for pulling article candidates out of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Selector for each candidate node
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// Matched against the item's direct children for the title
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Matched against the item's direct children for the summary
    #[serde(default = "defaults::summary_selector")]
    pub summary_selector: String,

    /// Attribute on the item holding the link
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Resolve relative links against the fetched endpoint
    #[serde(default = "defaults::resolve_links")]
    pub resolve_links: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            item_selector: defaults::item_selector(),
            title_selector: defaults::title_selector(),
            summary_selector: defaults::summary_selector(),
            link_attr: defaults::link_attr(),
            resolve_links: defaults::resolve_links(),
        }
    }
}

/// Ingestion run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum concurrent store writes per run
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `articles.json` and `notes.json`
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Fetcher defaults
    pub fn endpoint() -> String {
        "https://www.nytimes.com/section/arts".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; newsnotes/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Extractor defaults
    pub fn item_selector() -> String {
        "li a".into()
    }
    pub fn title_selector() -> String {
        "h2".into()
    }
    pub fn summary_selector() -> String {
        "p".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn resolve_links() -> bool {
        true
    }

    // Ingest defaults
    pub fn max_concurrent() -> usize {
        8
    }

    // Storage defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("storage")
    }
}
