//! The fixed set of metadata fields every indexed record may carry.
//!
//! Field names and storage policy are part of the on-disk contract with the
//! index engine and must not change once an index has been built.

use serde::{Deserialize, Serialize};

/// How a field's value is written to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStorage {
    /// Stored and indexed as a single untokenized term.
    Exact,
    /// Stored and run through the metadata analyzer.
    Analyzed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetadataField {
    Identifier,
    SecondaryId,
    Title,
    Tags,
    Location,
    Latitude,
    Longitude,
}

impl MetadataField {
    pub const ALL: [MetadataField; 7] = [
        MetadataField::Identifier,
        MetadataField::SecondaryId,
        MetadataField::Title,
        MetadataField::Tags,
        MetadataField::Location,
        MetadataField::Latitude,
        MetadataField::Longitude,
    ];

    /// Fields searched by keyword queries.
    pub const KEYWORD_FIELDS: [MetadataField; 3] =
        [MetadataField::Title, MetadataField::Tags, MetadataField::Location];

    pub fn name(self) -> &'static str {
        match self {
            MetadataField::Identifier => "identifier",
            MetadataField::SecondaryId => "dbid",
            MetadataField::Title => "title",
            MetadataField::Tags => "tags",
            MetadataField::Location => "location",
            MetadataField::Latitude => "lat",
            MetadataField::Longitude => "lng",
        }
    }

    pub fn storage(self) -> FieldStorage {
        match self {
            MetadataField::Identifier | MetadataField::Latitude | MetadataField::Longitude => FieldStorage::Exact,
            MetadataField::SecondaryId | MetadataField::Title | MetadataField::Tags | MetadataField::Location => {
                FieldStorage::Analyzed
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
