use image::DynamicImage;

use crate::error::Result;
use crate::types::{ImageDuplicates, Record, SearchHits, SearchQuery};

/// Turns a decoded bitmap into a record carrying one feature family.
/// Metadata is attached afterwards by the document builder.
pub trait RecordBuilder: Send + Sync {
    fn build_record(&self, image: &DynamicImage) -> Result<Record>;
}

impl<F> RecordBuilder for F
where
    F: Fn(&DynamicImage) -> Result<Record> + Send + Sync,
{
    fn build_record(&self, image: &DynamicImage) -> Result<Record> {
        self(image)
    }
}

pub trait RecordIndexer: Send + Sync {
    fn index(&self, records: &[Record]) -> Result<usize>;
}

/// Searches an index for images. `Ok(None)` is the no-result outcome used
/// when a searcher has nothing to search with.
pub trait ImageSearcher {
    type Index: ?Sized;

    fn search(&self, image: Option<&DynamicImage>, query: Option<&SearchQuery>, index: &Self::Index) -> Result<Option<SearchHits>>;

    fn search_image(&self, image: &DynamicImage, index: &Self::Index) -> Result<Option<SearchHits>> {
        self.search(Some(image), None, index)
    }

    fn search_record(&self, reference: &Record, index: &Self::Index) -> Result<Option<SearchHits>>;

    fn find_duplicates(&self, index: &Self::Index) -> Result<ImageDuplicates>;
}
