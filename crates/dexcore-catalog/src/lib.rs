//! Record model and read access to the remote catalog service.
//!
//! [`CatalogSource`] is the seam between the lookup pipeline and the
//! network: [`HttpCatalog`] talks to the real service, [`InMemoryCatalog`]
//! serves scripted records for tests.

mod error;
mod http;
mod memory;
mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::CatalogError;
pub use http::HttpCatalog;
pub use memory::{CatalogCall, InMemoryCatalog};
pub use wire::{decode_detail, decode_index};

/// Validated identifier of a single catalog record.
pub type LookupKey = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: LookupKey,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<TypeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    pub type_name: String,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns every index entry in service order, in a single request.
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, CatalogError>;

    async fn fetch_detail(&self, key: LookupKey) -> Result<DetailRecord, CatalogError>;
}
