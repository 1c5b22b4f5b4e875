// src/services/fetcher.rs

//! Remote document retrieval.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;
use crate::utils::http::create_async_client;

/// Retrieves a raw document from a remote endpoint.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Return the document body, or `AppError::Fetch` on network failure,
    /// non-success status, or timeout. No retries.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a configured reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn describe(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            "request timed out".to_string()
        } else if let Some(status) = err.status() {
            format!("unexpected status {status}")
        } else {
            err.to_string()
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, Self::describe(&e)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::fetch(url, Self::describe(&e)))
    }
}
