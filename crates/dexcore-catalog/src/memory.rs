//! In-memory catalog for tests and development.
//!
//! Records, per-key latencies and injected failures are scripted up front;
//! every call is appended to a log so callers can assert exactly which
//! requests were issued. Latencies use `tokio::time::sleep`, so paused-clock
//! tests control them deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{CatalogError, CatalogSource, DetailRecord, IndexEntry, LookupKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCall {
    Index,
    Detail(LookupKey),
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    index: Vec<IndexEntry>,
    records: HashMap<LookupKey, DetailRecord>,
    index_failure: Option<CatalogError>,
    detail_failures: HashMap<LookupKey, CatalogError>,
    index_latency: Duration,
    detail_latency: HashMap<LookupKey, Duration>,
    default_detail_latency: Duration,
    calls: Mutex<Vec<CatalogCall>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index = names
            .into_iter()
            .map(|name| IndexEntry { name: name.into() })
            .collect();
        self
    }

    pub fn with_record(mut self, record: DetailRecord) -> Self {
        self.records.insert(record.id, record);
        self
    }

    pub fn with_index_failure(mut self, error: CatalogError) -> Self {
        self.index_failure = Some(error);
        self
    }

    pub fn with_detail_failure(mut self, key: LookupKey, error: CatalogError) -> Self {
        self.detail_failures.insert(key, error);
        self
    }

    pub fn with_index_latency(mut self, latency: Duration) -> Self {
        self.index_latency = latency;
        self
    }

    pub fn with_detail_latency(mut self, key: LookupKey, latency: Duration) -> Self {
        self.detail_latency.insert(key, latency);
        self
    }

    pub fn with_default_detail_latency(mut self, latency: Duration) -> Self {
        self.default_detail_latency = latency;
        self
    }

    /// Calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn detail_calls(&self) -> Vec<LookupKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CatalogCall::Detail(key) => Some(key),
                CatalogCall::Index => None,
            })
            .collect()
    }

    fn record_call(&self, call: CatalogCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, CatalogError> {
        self.record_call(CatalogCall::Index);
        if !self.index_latency.is_zero() {
            tokio::time::sleep(self.index_latency).await;
        }

        match &self.index_failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.index.clone()),
        }
    }

    async fn fetch_detail(&self, key: LookupKey) -> Result<DetailRecord, CatalogError> {
        self.record_call(CatalogCall::Detail(key));
        let latency = self
            .detail_latency
            .get(&key)
            .copied()
            .unwrap_or(self.default_detail_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.detail_failures.get(&key) {
            return Err(error.clone());
        }

        self.records
            .get(&key)
            .cloned()
            .ok_or(CatalogError::NotFound(key))
    }
}
