// In-memory preset catalogue loaded from a JSON document

use crate::catalogue::biquad::{DEVICE_SAMPLE_RATE, FilterDefinition};
use crate::catalogue::{
    CatalogueError, CatalogueMetadata, CatalogueResult, FilterBand, PresetCatalogue, PresetEntry,
    SearchFilters,
};
use crate::device::PEQ_BAND_COUNT;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// On-disk catalogue document
#[derive(Debug, Deserialize)]
struct CatalogueDocument {
    version: String,
    #[serde(default)]
    entries: Vec<CatalogueRecord>,
}

/// On-disk catalogue entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogueRecord {
    id: String,
    title: String,
    #[serde(default)]
    author: String,
    year: Option<u16>,
    #[serde(default)]
    audio_types: Vec<String>,
    #[serde(default)]
    content_type: String,
    /// Ready-made biquads `[b0, b1, b2, a1, a2]` in device convention
    bands: Option<Vec<[f64; 5]>>,
    /// Parametric filters, designed at the device sample rate
    filters: Option<Vec<FilterDefinition>>,
}

impl CatalogueRecord {
    fn into_entry(self) -> CatalogueResult<PresetEntry> {
        let bands: Vec<FilterBand> = match (self.bands, self.filters) {
            (Some(_), Some(_)) => return Err(CatalogueError::AmbiguousEntry(self.id)),
            (Some(bands), None) => bands.into_iter().map(FilterBand::new).collect(),
            (None, Some(filters)) => {
                let mut designed = Vec::with_capacity(filters.len());
                for filter in &filters {
                    if let Some(reason) = filter.check(DEVICE_SAMPLE_RATE) {
                        return Err(CatalogueError::InvalidFilter {
                            id: self.id,
                            reason,
                        });
                    }
                    designed.push(filter.design(DEVICE_SAMPLE_RATE));
                }
                designed
            }
            (None, None) => Vec::new(),
        };

        if bands.len() > PEQ_BAND_COUNT {
            return Err(CatalogueError::TooManyFilters {
                id: self.id,
                count: bands.len(),
                max: PEQ_BAND_COUNT,
            });
        }

        Ok(PresetEntry {
            id: self.id,
            title: self.title,
            author: self.author,
            year: self.year,
            audio_types: self.audio_types,
            content_type: self.content_type,
            bands: [bands.clone(), bands],
        })
    }
}

/// Catalogue held entirely in memory, in publication order
#[derive(Debug, Clone)]
pub struct InMemoryCatalogue {
    version: String,
    loaded: bool,
    entries: Vec<PresetEntry>,
    /// Preset id -> position in `entries`
    index: HashMap<String, usize>,
}

impl InMemoryCatalogue {
    /// Build a catalogue from already constructed entries
    ///
    /// # Errors
    /// Returns an error on duplicate ids or entries with more bands than an
    /// input can hold.
    pub fn new(version: impl Into<String>, entries: Vec<PresetEntry>) -> CatalogueResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let widest = entry.bands.iter().map(Vec::len).max().unwrap_or(0);
            if widest > PEQ_BAND_COUNT {
                return Err(CatalogueError::TooManyFilters {
                    id: entry.id.clone(),
                    count: widest,
                    max: PEQ_BAND_COUNT,
                });
            }
            if index.insert(entry.id.clone(), position).is_some() {
                return Err(CatalogueError::DuplicateId(entry.id.clone()));
            }
        }

        Ok(Self {
            version: version.into(),
            loaded: true,
            entries,
            index,
        })
    }

    /// A catalogue with nothing loaded
    pub fn empty() -> Self {
        Self {
            version: String::new(),
            loaded: false,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Parse a catalogue document
    pub fn from_json_str(json: &str) -> CatalogueResult<Self> {
        let document: CatalogueDocument = serde_json::from_str(json)?;
        let entries = document
            .entries
            .into_iter()
            .map(CatalogueRecord::into_entry)
            .collect::<CatalogueResult<Vec<_>>>()?;
        Self::new(document.version, entries)
    }

    /// Read and parse a catalogue document from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogueResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let catalogue = Self::from_json_str(&json)?;
        log::info!(
            "Loaded catalogue version {} with {} entries from {}",
            catalogue.version,
            catalogue.entries.len(),
            path.as_ref().display()
        );
        Ok(catalogue)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn distinct<T: Ord>(&self, field: impl Fn(&PresetEntry) -> T) -> BTreeSet<T> {
        self.entries.iter().map(field).collect()
    }
}

impl PresetCatalogue for InMemoryCatalogue {
    fn resolve(&self, id: &str) -> Option<PresetEntry> {
        self.index.get(id).map(|&i| self.entries[i].clone())
    }

    fn search(&self, filters: &SearchFilters) -> Vec<PresetEntry> {
        self.entries
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect()
    }

    fn authors(&self) -> BTreeSet<String> {
        self.distinct(|e| e.author.clone())
    }

    fn content_types(&self) -> BTreeSet<String> {
        self.distinct(|e| e.content_type.clone())
    }

    fn years(&self) -> BTreeSet<u16> {
        self.entries.iter().filter_map(|e| e.year).collect()
    }

    fn audio_types(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .flat_map(|e| e.audio_types.iter().cloned())
            .collect()
    }

    fn metadata(&self) -> CatalogueMetadata {
        CatalogueMetadata {
            version: self.version.clone(),
            loaded: self.loaded,
            count: self.entries.len(),
        }
    }
}
