use std::collections::BTreeMap;
use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::TermQuery;
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, Searcher, TantivyDocument, Term};
use tracing::{debug, info};

use imagedb_core::config::DEFAULT_WRITER_HEAP_BYTES;
use imagedb_core::error::{Error, Result};
use imagedb_core::traits::RecordIndexer;
use imagedb_core::{MetadataField, Record};

use crate::tantivy_utils::{build_schema, register_tokenizer, IndexFields};

/// A tantivy index holding image records under the fixed metadata schema.
pub struct ImageIndex {
    index: Index,
    reader: IndexReader,
    fields: IndexFields,
    writer_heap_bytes: usize,
}

impl ImageIndex {
    /// Creates a fresh index in `index_dir`, deleting whatever was there.
    pub fn create(index_dir: &Path) -> Result<Self> {
        if index_dir.exists() { std::fs::remove_dir_all(index_dir)?; }
        std::fs::create_dir_all(index_dir)?;
        let index = Index::create_in_dir(index_dir, build_schema()).map_err(Error::index)?;
        info!(dir = %index_dir.display(), "created image index");
        Self::from_index(index)
    }

    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir).map_err(Error::index)?;
        Self::from_index(index)
    }

    /// Opens `index_dir` if it already holds an index, otherwise creates one.
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        if index_dir.join("meta.json").exists() { Self::open(index_dir) } else { Self::create(index_dir) }
    }

    pub fn create_in_ram() -> Result<Self> {
        Self::from_index(Index::create_in_ram(build_schema()))
    }

    fn from_index(index: Index) -> Result<Self> {
        register_tokenizer(index.tokenizers());
        let fields = IndexFields::resolve(&index.schema()).map_err(Error::index)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(Error::index)?;
        Ok(Self { index, reader, fields, writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES })
    }

    pub fn with_writer_heap_bytes(mut self, bytes: usize) -> Self {
        self.writer_heap_bytes = bytes;
        self
    }

    /// Snapshot of the index as of the last commit.
    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    pub fn num_records(&self) -> u64 {
        self.searcher().num_docs()
    }

    /// Writes `records` in a single commit. Records with an identifier
    /// replace any stored record sharing it.
    /// A batch holding an invalid record is rejected before anything is written.
    pub fn index_records(&self, records: &[Record]) -> Result<usize> {
        let docs = records.iter().map(|r| self.document_from_record(r)).collect::<Result<Vec<_>>>()?;
        let mut writer: tantivy::IndexWriter = self.index.writer(self.writer_heap_bytes).map_err(Error::index)?;
        for (record, doc) in records.iter().zip(docs) {
            if let Some(id) = record.get(MetadataField::Identifier) {
                writer.delete_term(Term::from_field_text(self.fields.get(MetadataField::Identifier), id));
            }
            writer.add_document(doc).map_err(Error::index)?;
        }
        writer.commit().map_err(Error::index)?;
        self.reader.reload().map_err(Error::index)?;
        info!(count = records.len(), "committed image records");
        Ok(records.len())
    }

    pub fn record(&self, searcher: &Searcher, address: DocAddress) -> Result<Record> {
        let doc: TantivyDocument = searcher.doc(address).map_err(Error::index)?;
        self.record_from_document(&doc)
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Result<Record> {
        let searcher = self.searcher();
        let term = Term::from_field_text(self.fields.get(MetadataField::Identifier), identifier);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let top = searcher.search(&query, &TopDocs::with_limit(1)).map_err(Error::index)?;
        match top.into_iter().next() {
            Some((_, address)) => self.record(&searcher, address),
            None => Err(Error::NotFound(format!("no record with identifier '{identifier}'"))),
        }
    }

    fn document_from_record(&self, record: &Record) -> Result<TantivyDocument> {
        let mut doc = TantivyDocument::default();
        for (field, value) in record.fields() {
            doc.add_text(self.fields.get(field), value);
        }
        // JSON has no encoding for NaN or infinity; they would read back as null.
        if let Some((name, _)) = record.features().iter().find(|(_, v)| v.iter().any(|x| !x.is_finite())) {
            return Err(Error::InvalidRecord(format!("feature '{name}' holds a non-finite value")));
        }
        if !record.features().is_empty() {
            doc.add_text(self.fields.features, serde_json::to_string(record.features())?);
        }
        Ok(doc)
    }

    fn record_from_document(&self, doc: &TantivyDocument) -> Result<Record> {
        let mut fields = BTreeMap::new();
        for field in MetadataField::ALL {
            if let Some(value) = doc.get_first(self.fields.get(field)).and_then(|v| v.as_str()) {
                fields.insert(field, value.to_string());
            }
        }
        let features = match doc.get_first(self.fields.features).and_then(|v| v.as_str()) {
            Some(json) => serde_json::from_str(json)?,
            None => BTreeMap::new(),
        };
        debug!(fields = fields.len(), "loaded stored record");
        Ok(Record::from_parts(fields, features))
    }
}

impl RecordIndexer for ImageIndex {
    fn index(&self, records: &[Record]) -> Result<usize> {
        self.index_records(records)
    }
}
