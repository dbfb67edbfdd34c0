//! Domain types shared by ingestion and search.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::distance::score_to_distance;
use crate::fields::MetadataField;

/// Descriptive metadata attached to an image at ingestion time.
///
/// - `identifier`: unique per indexed image when present (file path, URL, ...)
/// - `title`: display caption
/// - `tags`/`location`: free text
/// - `latitude`/`longitude`: string-encoded numbers, stored verbatim
///
/// A caption is never searched implicitly; turn it into a [`SearchQuery`]
/// with [`SearchQuery::from_caption`] when that is what the caller wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayMetadata {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "lat")]
    pub latitude: Option<String>,
    #[serde(alias = "lng")]
    pub longitude: Option<String>,
}

impl DisplayMetadata {
    /// Metadata carrying only a title; every other field is absent.
    pub fn named(name: impl Into<String>) -> Self {
        Self { title: Some(name.into()), ..Self::default() }
    }

    /// The value written to `field` when this metadata is attached to a record.
    /// The secondary id repeats the identifier as analyzed text.
    pub fn value(&self, field: MetadataField) -> Option<&str> {
        let v = match field {
            MetadataField::Identifier | MetadataField::SecondaryId => &self.identifier,
            MetadataField::Title => &self.title,
            MetadataField::Tags => &self.tags,
            MetadataField::Location => &self.location,
            MetadataField::Latitude => &self.latitude,
            MetadataField::Longitude => &self.longitude,
        };
        v.as_deref()
    }
}

/// Free-text keyword query. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Returns `None` for empty text, which searchers treat as "no query".
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() { None } else { Some(Self(text)) }
    }

    /// Uses a caption as the literal query text.
    pub fn from_caption(metadata: &DisplayMetadata) -> Option<Self> {
        metadata.title.clone().and_then(Self::new)
    }

    /// Query for "more like this stored item's caption". Only the title is
    /// carried over; tags and location are not.
    pub fn from_record(record: &Record) -> Option<Self> {
        record.get(MetadataField::Title).and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit exchanged with the index engine: the seven metadata fields plus
/// whatever feature vectors the record builder extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<MetadataField, String>,
    features: BTreeMap<String, Vec<f32>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a record from values read back out of an index.
    pub fn from_parts(fields: BTreeMap<MetadataField, String>, features: BTreeMap<String, Vec<f32>>) -> Self {
        Self { fields, features }
    }

    pub fn with_feature(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.features.insert(name.into(), values);
        self
    }

    pub fn feature(&self, name: &str) -> Option<&[f32]> {
        self.features.get(name).map(Vec::as_slice)
    }

    pub fn features(&self) -> &BTreeMap<String, Vec<f32>> {
        &self.features
    }

    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (MetadataField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn has_metadata(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Writes every metadata field in one step, replacing all previous
    /// metadata. `None` leaves the record untouched. Absent values are left
    /// out rather than written as empty strings.
    pub fn attach_metadata(&mut self, metadata: Option<&DisplayMetadata>) {
        let Some(metadata) = metadata else { return };
        self.fields = MetadataField::ALL
            .into_iter()
            .filter_map(|field| metadata.value(field).map(|v| (field, v.to_string())))
            .collect();
    }

    /// Reads the display metadata back out of the record.
    pub fn metadata(&self) -> DisplayMetadata {
        let owned = |field| self.get(field).map(str::to_string);
        DisplayMetadata {
            identifier: owned(MetadataField::Identifier),
            title: owned(MetadataField::Title),
            tags: owned(MetadataField::Tags),
            location: owned(MetadataField::Location),
            latitude: owned(MetadataField::Latitude),
            longitude: owned(MetadataField::Longitude),
        }
    }
}

/// One ranked hit. Lower `distance` is better; `rank` is the 0-based
/// position in the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub distance: f32,
    pub record: Record,
    pub rank: usize,
}

/// Ranked hits plus the largest distance among them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    results: Vec<SearchResult>,
    max_distance: f32,
}

impl SearchHits {
    /// Builds hits from `(score, record)` pairs in the order given, converting
    /// each score into a distance.
    pub fn from_scored<I>(scored: I) -> Self
    where
        I: IntoIterator<Item = (f32, Record)>,
    {
        let mut max_distance = 0.0_f32;
        let results = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (score, record))| {
                let distance = score_to_distance(score);
                max_distance = max_distance.max(distance);
                SearchResult { distance, record, rank }
            })
            .collect();
        Self { results, max_distance }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn get(&self, position: usize) -> Option<&SearchResult> {
        self.results.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.results.iter()
    }

    /// Distance at `position` scaled into `[0, 1]` by the max distance.
    pub fn normalized_distance(&self, position: usize) -> Option<f32> {
        let hit = self.get(position)?;
        if self.max_distance > 0.0 { Some(hit.distance / self.max_distance) } else { Some(0.0) }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

impl IntoIterator for SearchHits {
    type Item = SearchResult;
    type IntoIter = std::vec::IntoIter<SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchHits {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Groups of records considered to show the same image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDuplicates {
    pub groups: Vec<Vec<Record>>,
}
