// src/services/extractor.rs

//! Candidate extraction.
//!
//! Turns a raw HTML document into article stubs using configured CSS
//! selectors. Extraction is a pure transform: no I/O, no persistence.
//! Items missing a title or summary element still yield a stub with that
//! field left empty.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ArticleStub, Config, ExtractorConfig, parse_selector};
use crate::utils::{normalize_whitespace, resolve_url};

/// Extracts article stubs from raw documents.
#[derive(Debug, Clone)]
pub struct Extractor {
    item_sel: Selector,
    title_sel: Selector,
    summary_sel: Selector,
    link_attr: String,
    base_url: Option<Url>,
}

impl Extractor {
    /// Build an extractor from selector settings. Links are left as found.
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            item_sel: parse_selector(&config.item_selector)?,
            title_sel: parse_selector(&config.title_selector)?,
            summary_sel: parse_selector(&config.summary_selector)?,
            link_attr: config.link_attr.clone(),
            base_url: None,
        })
    }

    /// Build an extractor for the configured endpoint, resolving relative
    /// links against it when `resolve_links` is on.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = Self::new(&config.extractor)?;
        if config.extractor.resolve_links {
            extractor.with_base_url(&config.fetcher.endpoint)
        } else {
            Ok(extractor)
        }
    }

    /// Resolve relative links against `base`.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        self.base_url = Some(Url::parse(base)?);
        Ok(self)
    }

    /// Parse a raw document.
    ///
    /// Fails with `AppError::Parse` only when the input is blank; any other
    /// text parses, and a document without matching items yields no stubs.
    pub fn extract(&self, raw: &str) -> Result<Extraction<'_>> {
        if raw.trim().is_empty() {
            return Err(AppError::parse("document is empty"));
        }
        Ok(Extraction {
            document: Html::parse_document(raw),
            extractor: self,
        })
    }

    fn stub_from_item(&self, item: ElementRef<'_>) -> ArticleStub {
        let title = Self::child_text(item, &self.title_sel);
        let summary = Self::child_text(item, &self.summary_sel);
        let raw_link = item.value().attr(&self.link_attr).unwrap_or("").trim();

        let link = match &self.base_url {
            Some(base) if !raw_link.is_empty() => resolve_url(base, raw_link),
            _ => raw_link.to_string(),
        };

        ArticleStub {
            title,
            link,
            summary,
        }
    }

    /// Text of the item's direct children matching `selector`.
    fn child_text(item: ElementRef<'_>, selector: &Selector) -> String {
        let raw: String = item
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| selector.matches(child))
            .flat_map(|child| child.text())
            .collect();
        normalize_whitespace(&raw)
    }
}

/// A parsed document bound to the extractor that will read it.
///
/// `stubs` can be called any number of times; each call walks the document
/// again from the start.
pub struct Extraction<'a> {
    document: Html,
    extractor: &'a Extractor,
}

impl Extraction<'_> {
    /// Lazily yield one stub per matching item, in document order.
    pub fn stubs(&self) -> impl Iterator<Item = ArticleStub> + '_ {
        self.document
            .select(&self.extractor.item_sel)
            .map(|item| self.extractor.stub_from_item(item))
    }

    pub fn count(&self) -> usize {
        self.document.select(&self.extractor.item_sel).count()
    }
}
