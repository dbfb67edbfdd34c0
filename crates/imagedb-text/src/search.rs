use image::DynamicImage;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, PhraseQuery, Query, QueryClone, QueryParser};
use tantivy::tokenizer::TokenizerManager;
use tracing::debug;

use imagedb_core::error::{Error, Result};
use imagedb_core::traits::ImageSearcher;
use imagedb_core::{DisplayMetadata, ImageDuplicates, Record, SearchHits, SearchQuery};

use crate::index::ImageIndex;
use crate::tantivy_utils::{build_schema, register_tokenizer, IndexFields};

/// Matches a keyword phrase against the title, tags and location of indexed
/// images. Any analyzed token of the phrase may match (OR semantics).
/// Relevance scores are reported as distances (`1 / score`).
pub struct KeywordSearcher {
    max_hits: usize,
    query_parser: QueryParser,
}

impl KeywordSearcher {
    pub fn new(max_hits: usize) -> Result<Self> {
        if max_hits == 0 {
            return Err(Error::InvalidConfig("max_hits must be at least 1".to_string()));
        }
        let schema = build_schema();
        let fields = IndexFields::resolve(&schema).map_err(Error::index)?;
        let tokenizers = TokenizerManager::default();
        register_tokenizer(&tokenizers);
        let query_parser = QueryParser::new(schema, fields.keyword_fields(), tokenizers);
        Ok(Self { max_hits, query_parser })
    }

    pub fn max_hits(&self) -> usize {
        self.max_hits
    }

    /// Searches with a caption the caller explicitly wants used as query text.
    pub fn search_with_metadata(
        &self,
        image: Option<&DynamicImage>,
        metadata: Option<&DisplayMetadata>,
        index: &ImageIndex,
    ) -> Result<Option<SearchHits>> {
        let query = metadata.and_then(SearchQuery::from_caption);
        self.search(image, query.as_ref(), index)
    }

    fn run_query(&self, query: &SearchQuery, index: &ImageIndex) -> Result<SearchHits> {
        let parsed = self.query_parser.parse_query(query.as_str()).map_err(|e| {
            debug!(query = %query, error = %e, "query rejected");
            Error::QueryParse { query: query.to_string(), reason: e.to_string() }
        })?;
        let parsed = relax_phrases(parsed);
        let searcher = index.searcher();
        let top_docs = searcher.search(&parsed, &TopDocs::with_limit(self.max_hits)).map_err(Error::index)?;
        let mut scored = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            scored.push((score, index.record(&searcher, address)?));
        }
        let hits = SearchHits::from_scored(scored);
        debug!(query = %query, hits = hits.len(), max_distance = hits.max_distance(), "keyword search");
        Ok(hits)
    }
}

/// The parser turns a word that analyzes to several tokens (an unspaced CJK
/// run, `car,red`) into a phrase. Phrases are rewritten into a union of their
/// terms so each token matches on its own.
fn relax_phrases(query: Box<dyn Query>) -> Box<dyn Query> {
    if let Some(phrase) = query.as_ref().downcast_ref::<PhraseQuery>() {
        return Box::new(BooleanQuery::new_multiterms_query(phrase.phrase_terms()));
    }
    if let Some(boolean) = query.as_ref().downcast_ref::<BooleanQuery>() {
        let clauses = boolean
            .clauses()
            .iter()
            .map(|(occur, clause)| (*occur, relax_phrases(clause.box_clone())))
            .collect();
        return Box::new(BooleanQuery::new(clauses));
    }
    query
}

impl ImageSearcher for KeywordSearcher {
    type Index = ImageIndex;

    /// The image is not used; only the query text is searched. No query
    /// yields `Ok(None)`.
    fn search(&self, _image: Option<&DynamicImage>, query: Option<&SearchQuery>, index: &ImageIndex) -> Result<Option<SearchHits>> {
        match query {
            Some(query) => self.run_query(query, index).map(Some),
            None => Ok(None),
        }
    }

    fn search_record(&self, reference: &Record, index: &ImageIndex) -> Result<Option<SearchHits>> {
        self.search(None, SearchQuery::from_record(reference).as_ref(), index)
    }

    fn find_duplicates(&self, _index: &ImageIndex) -> Result<ImageDuplicates> {
        Err(Error::NotImplemented("keyword searcher cannot find duplicates"))
    }
}
