use dexcore_catalog::DetailRecord;
use dexcore_lookup::{capitalize_first, format_record_number, KeyRange};

use crate::coordinator::{Coordinator, LoadPhase};

/// Everything the presentation layer needs, derived from coordinator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// The index could not be loaded; nothing else is shown.
    Fatal { message: String },
    Ready(Screen),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub input: String,
    pub range_hint: String,
    pub index: Vec<String>,
    pub detail: Option<DetailView>,
    pub detail_error: Option<String>,
    pub index_loading: bool,
    pub detail_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub number: String,
    pub image_url: Option<String>,
    pub alt_text: String,
    pub types: Vec<TypeLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLabel {
    pub slot: u32,
    pub label: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::Ready(Screen {
            input: String::new(),
            range_hint: KeyRange::default().hint(),
            index: Vec::new(),
            detail: None,
            detail_error: None,
            index_loading: false,
            detail_loading: false,
        })
    }
}

impl ViewState {
    pub(crate) fn derive(coordinator: &Coordinator) -> Self {
        if let Some(message) = coordinator.index_error() {
            return Self::Fatal {
                message: message.to_string(),
            };
        }

        Self::Ready(Screen {
            input: coordinator.raw_input().to_string(),
            range_hint: coordinator.key_range().hint(),
            index: coordinator
                .index()
                .iter()
                .map(|entry| capitalize_first(&entry.name))
                .collect(),
            detail: coordinator.detail().map(DetailView::from_record),
            detail_error: coordinator.error().map(|e| e.message.clone()),
            index_loading: coordinator.index_phase() == LoadPhase::Loading,
            detail_loading: coordinator.is_detail_loading(),
        })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl DetailView {
    pub fn from_record(record: &DetailRecord) -> Self {
        let alt_text = if record.name.is_empty() {
            "Pokémon image".to_string()
        } else {
            record.name.clone()
        };

        Self {
            title: capitalize_first(&record.name),
            number: format_record_number(record.id),
            image_url: record.image_url.clone(),
            alt_text,
            types: record
                .types
                .iter()
                .map(|t| TypeLabel {
                    slot: t.slot,
                    label: capitalize_first(&t.type_name),
                })
                .collect(),
        }
    }
}
