use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, StopWordFilter, TextAnalyzer, TokenizerManager};

use imagedb_core::fields::{FieldStorage, MetadataField};

use crate::tokenizer::CjkBigramTokenizer;

pub const METADATA_TOKENIZER: &str = "metadata_text";
pub const FEATURES_FIELD: &str = "features";

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let analyzed_indexing = TextFieldIndexing::default()
        .set_tokenizer(METADATA_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let analyzed = TextOptions::default().set_indexing_options(analyzed_indexing).set_stored();
    for field in MetadataField::ALL {
        match field.storage() {
            FieldStorage::Exact => schema_builder.add_text_field(field.name(), STRING | STORED),
            FieldStorage::Analyzed => schema_builder.add_text_field(field.name(), analyzed.clone()),
        };
    }
    let _features_field = schema_builder.add_text_field(FEATURES_FIELD, STORED);
    schema_builder.build()
}

pub fn metadata_analyzer() -> TextAnalyzer {
    let stop_words = vec![
        "a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if",
    ];
    TextAnalyzer::builder(CjkBigramTokenizer)
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
        .build()
}

pub fn register_tokenizer(tokenizers: &TokenizerManager) {
    tokenizers.register(METADATA_TOKENIZER, metadata_analyzer());
}

/// Resolved schema handles for the metadata fields, in `MetadataField::ALL` order.
#[derive(Clone)]
pub struct IndexFields {
    metadata: [Field; 7],
    pub features: Field,
}

impl IndexFields {
    pub fn resolve(schema: &Schema) -> tantivy::Result<Self> {
        let mut metadata = [Field::from_field_id(0); 7];
        for (slot, field) in metadata.iter_mut().zip(MetadataField::ALL) {
            *slot = schema.get_field(field.name())?;
        }
        let features = schema.get_field(FEATURES_FIELD)?;
        Ok(Self { metadata, features })
    }

    pub fn get(&self, field: MetadataField) -> Field {
        self.metadata[field as usize]
    }

    pub fn keyword_fields(&self) -> Vec<Field> {
        MetadataField::KEYWORD_FIELDS.into_iter().map(|f| self.get(f)).collect()
    }
}
