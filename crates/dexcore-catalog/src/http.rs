//! HTTP client for the catalog service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::wire::{decode_detail, decode_index};
use crate::{CatalogError, CatalogSource, DetailRecord, IndexEntry, LookupKey};

/// Catalog backed by the remote JSON service.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    index_limit: u32,
}

impl HttpCatalog {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, index_limit: u32) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index_limit,
        })
    }

    pub fn index_url(&self) -> String {
        format!("{}/pokemon?limit={}", self.base_url, self.index_limit)
    }

    pub fn detail_url(&self, key: LookupKey) -> String {
        format!("{}/pokemon/{key}", self.base_url)
    }

    async fn get_bytes(&self, url: &str) -> Result<(StatusCode, Vec<u8>), CatalogError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, CatalogError> {
        let url = self.index_url();
        tracing::debug!(%url, "fetching index");

        let (status, body) = self.get_bytes(&url).await?;
        if !status.is_success() {
            return Err(CatalogError::Transport(format!("HTTP {status} from {url}")));
        }

        decode_index(&body)
    }

    async fn fetch_detail(&self, key: LookupKey) -> Result<DetailRecord, CatalogError> {
        let url = self.detail_url(key);
        tracing::debug!(%url, key, "fetching detail");

        let (status, body) = self.get_bytes(&url).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(key));
        }
        if !status.is_success() {
            return Err(CatalogError::Transport(format!("HTTP {status} from {url}")));
        }

        decode_detail(&body)
    }
}
