use serde::Deserialize;

use crate::{CatalogError, DetailRecord, IndexEntry, LookupKey, TypeSlot};

#[derive(Deserialize)]
struct IndexPage {
    results: Vec<IndexItem>,
}

#[derive(Deserialize)]
struct IndexItem {
    name: String,
}

#[derive(Deserialize)]
struct DetailPayload {
    id: LookupKey,
    name: String,
    #[serde(default)]
    sprites: Sprites,
    #[serde(default)]
    types: Vec<TypeEntry>,
}

#[derive(Deserialize, Default)]
struct Sprites {
    front_default: Option<String>,
    #[serde(default)]
    other: Option<OtherSprites>,
}

#[derive(Deserialize)]
struct OtherSprites {
    #[serde(default)]
    home: Option<HomeSprites>,
}

#[derive(Deserialize)]
struct HomeSprites {
    front_default: Option<String>,
}

#[derive(Deserialize)]
struct TypeEntry {
    slot: u32,
    #[serde(rename = "type")]
    kind: NamedRef,
}

#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

impl Sprites {
    /// Home artwork first, then the default front sprite. Empty strings count
    /// as absent.
    fn resolve(self) -> Option<String> {
        let home = self
            .other
            .and_then(|other| other.home)
            .and_then(|home| home.front_default);

        home.into_iter()
            .chain(self.front_default)
            .find(|url| !url.trim().is_empty())
    }
}

pub fn decode_index(body: &[u8]) -> Result<Vec<IndexEntry>, CatalogError> {
    let page: IndexPage = serde_json::from_slice(body).map_err(CatalogError::decode)?;
    Ok(page
        .results
        .into_iter()
        .map(|item| IndexEntry { name: item.name })
        .collect())
}

pub fn decode_detail(body: &[u8]) -> Result<DetailRecord, CatalogError> {
    let payload: DetailPayload = serde_json::from_slice(body).map_err(CatalogError::decode)?;
    Ok(DetailRecord {
        id: payload.id,
        name: payload.name,
        image_url: payload.sprites.resolve(),
        types: payload
            .types
            .into_iter()
            .map(|entry| TypeSlot {
                slot: entry.slot,
                type_name: entry.kind.name,
            })
            .collect(),
    })
}
