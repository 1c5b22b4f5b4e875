// src/app.rs

//! Operation surface exposed to adapters (CLI, routing layers).

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Article, ArticleDetail, ArticleFilter, ArticleId, Config, NoteId, RunReport};
use crate::pipeline::IngestPipeline;
use crate::services::{Extractor, Fetcher, HttpFetcher, Lifecycle, RelationManager};
use crate::storage::ArticleStore;

/// Wires the store, pipeline, lifecycle and relation manager together.
pub struct NewsDesk {
    store: Arc<dyn ArticleStore>,
    pipeline: IngestPipeline,
    lifecycle: Lifecycle,
    relations: RelationManager,
}

impl NewsDesk {
    /// Build a desk that fetches over HTTP.
    pub fn from_config(config: &Config, store: Arc<dyn ArticleStore>) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
        Self::with_fetcher(config, store, fetcher)
    }

    pub fn with_fetcher(
        config: &Config,
        store: Arc<dyn ArticleStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        config.validate()?;
        let extractor = Arc::new(Extractor::from_config(config)?);
        Ok(Self {
            pipeline: IngestPipeline::new(config, fetcher, extractor, Arc::clone(&store)),
            lifecycle: Lifecycle::new(Arc::clone(&store)),
            relations: RelationManager::new(Arc::clone(&store)),
            store,
        })
    }

    pub async fn list_unsaved(&self) -> Result<Vec<Article>> {
        self.store.list_articles(ArticleFilter::unsaved()).await
    }

    pub async fn list_saved(&self) -> Result<Vec<Article>> {
        self.store.list_articles(ArticleFilter::saved()).await
    }

    pub async fn ingest(&self) -> Result<RunReport> {
        self.pipeline.run().await
    }

    pub async fn article_detail(&self, id: &ArticleId) -> Result<ArticleDetail> {
        self.relations.article_with_notes(id).await
    }

    pub async fn attach_note(&self, id: &ArticleId, title: &str) -> Result<Article> {
        self.relations.attach_note(id, title).await
    }

    pub async fn detach_note(&self, id: &ArticleId, note_id: &NoteId) -> Result<Article> {
        self.relations.detach_note(id, note_id).await
    }

    pub async fn save(&self, id: &ArticleId) -> Result<Article> {
        self.lifecycle.save(id).await
    }

    pub async fn unsave(&self, id: &ArticleId) -> Result<Article> {
        self.lifecycle.unsave(id).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStore;

    const PAGE: &str = r#"
        <html><body><section><ol>
          <li><a href="/2024/06/01/arts/museum.html"><h2>Museum reopens</h2><p>After renovation.</p></a></li>
          <li><a href="/2024/06/02/arts/opera.html"><h2>Opera review</h2><p>A bold staging.</p></a></li>
        </ol></section></body></html>
    "#;

    async fn desk(server: &MockServer) -> NewsDesk {
        let mut config = Config::default();
        config.fetcher.endpoint = format!("{}/section/arts", server.uri());
        config.fetcher.timeout_secs = 5;
        NewsDesk::from_config(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/section/arts"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        let desk = desk(&server).await;

        let report = desk.ingest().await.unwrap();
        assert_eq!((report.created, report.skipped, report.failed), (2, 0, 0));
        let report = desk.ingest().await.unwrap();
        assert_eq!((report.created, report.skipped, report.failed), (0, 2, 0));

        let unsaved = desk.list_unsaved().await.unwrap();
        assert_eq!(unsaved.len(), 2);
        assert_eq!(
            unsaved[0].link,
            format!("{}/2024/06/01/arts/museum.html", server.uri())
        );
        let id = unsaved[0].id.clone();

        desk.save(&id).await.unwrap();
        assert_eq!(desk.list_saved().await.unwrap().len(), 1);
        assert_eq!(desk.list_unsaved().await.unwrap().len(), 1);

        let article = desk.attach_note(&id, "go on Sunday").await.unwrap();
        let note_id = article.note_ids[0].clone();
        let detail = desk.article_detail(&id).await.unwrap();
        assert_eq!(detail.notes[0].title, "go on Sunday");

        let article = desk.detach_note(&id, &note_id).await.unwrap();
        assert!(article.note_ids.is_empty());

        desk.unsave(&id).await.unwrap();
        assert!(desk.list_saved().await.unwrap().is_empty());
        assert_eq!(desk.article_detail(&id).await.unwrap().article.id, id);
    }

    #[tokio::test]
    async fn test_server_error_fails_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let desk = desk(&server).await;

        assert!(matches!(desk.ingest().await, Err(AppError::Fetch { .. })));
        assert!(desk.list_unsaved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.ingest.max_concurrent = 0;
        assert!(NewsDesk::from_config(&config, Arc::new(MemoryStore::new())).is_err());
    }
}
