// Preset catalogue
//
// The translator only consumes the PresetCatalogue trait. InMemoryCatalogue is
// the implementation used by the service; it is loaded from a JSON document
// whose entries carry either raw biquad bands or parametric filters that are
// designed into biquads by the biquad module.

pub mod biquad;
pub mod memory;

pub use biquad::{DEVICE_SAMPLE_RATE, FilterDefinition, FilterType};
pub use memory::InMemoryCatalogue;

use crate::device::{INPUT_COUNT, InputIndex};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Catalogue error types
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate preset id: {0}")]
    DuplicateId(String),

    #[error("Preset {id} has {count} filters, at most {max} are supported")]
    TooManyFilters { id: String, count: usize, max: usize },

    #[error("Invalid filter in preset {id}: {reason}")]
    InvalidFilter { id: String, reason: String },

    #[error("Preset {0} defines both bands and filters")]
    AmbiguousEntry(String),
}

pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// One biquad section in device convention
///
/// Feedback coefficients are stored sign-inverted, which is what the unit
/// expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterBand {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl FilterBand {
    pub fn new(coefficients: [f64; 5]) -> Self {
        let [b0, b1, b2, a1, a2] = coefficients;
        Self { b0, b1, b2, a1, a2 }
    }

    pub fn coefficients(&self) -> [f64; 5] {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
    }
}

/// A loadable preset with its descriptive metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Release year, when the catalogue knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub audio_types: Vec<String>,
    pub content_type: String,
    #[serde(skip)]
    pub bands: [Vec<FilterBand>; INPUT_COUNT],
}

impl PresetEntry {
    /// Filter bands to program onto one input, in band order
    pub fn bands_for(&self, input: InputIndex) -> &[FilterBand] {
        &self.bands[input.get() as usize]
    }
}

/// Search criteria, every provided field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Matches if the entry's author is any of these (case-insensitive)
    pub authors: Vec<String>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub year: Option<u16>,
    pub audio_type: Option<String>,
    pub content_type: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.title.is_none()
            && self.year.is_none()
            && self.audio_type.is_none()
            && self.content_type.is_none()
    }

    pub fn matches(&self, entry: &PresetEntry) -> bool {
        if !self.authors.is_empty()
            && !self
                .authors
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&entry.author))
        {
            return false;
        }
        if let Some(title) = &self.title {
            if !entry
                .title
                .to_lowercase()
                .contains(&title.to_lowercase())
            {
                return false;
            }
        }
        if self.year.is_some_and(|year| entry.year != Some(year)) {
            return false;
        }
        if let Some(audio_type) = &self.audio_type {
            if !entry
                .audio_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(audio_type))
            {
                return false;
            }
        }
        if let Some(content_type) = &self.content_type {
            if !entry.content_type.eq_ignore_ascii_case(content_type) {
                return false;
            }
        }
        true
    }
}

/// Catalogue status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueMetadata {
    pub version: String,
    pub loaded: bool,
    pub count: usize,
}

/// Lookup, search and enumeration over presets
pub trait PresetCatalogue: Send + Sync {
    /// Find a preset by id
    fn resolve(&self, id: &str) -> Option<PresetEntry>;

    /// Entries matching all provided filters, empty filters match everything
    fn search(&self, filters: &SearchFilters) -> Vec<PresetEntry>;

    fn authors(&self) -> BTreeSet<String>;

    fn content_types(&self) -> BTreeSet<String>;

    fn years(&self) -> BTreeSet<u16>;

    fn audio_types(&self) -> BTreeSet<String>;

    fn metadata(&self) -> CatalogueMetadata;
}
