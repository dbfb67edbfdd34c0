use std::io::Read;
use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use imagedb_core::error::{Error, Result};
use imagedb_core::traits::RecordBuilder;
use imagedb_core::{DisplayMetadata, Record};

/// Builds index records from images.
///
/// Decoding failures abort the call with [`Error::Decode`]; no partial record
/// is ever returned. Feature extraction is delegated to `B`.
pub struct DocumentBuilder<B> {
    features: B,
}

impl<B: RecordBuilder> DocumentBuilder<B> {
    pub fn new(features: B) -> Self {
        Self { features }
    }

    pub fn build_record(&self, bytes: &[u8], metadata: Option<&DisplayMetadata>) -> Result<Record> {
        let image = image::load_from_memory(bytes).map_err(Error::Decode)?;
        debug!(width = image.width(), height = image.height(), "decoded image");
        self.build_record_from_image(&image, metadata)
    }

    /// Reads the whole stream before decoding; a failed or short read counts
    /// as a decode failure.
    pub fn build_record_from_reader<R: Read>(&self, mut reader: R, metadata: Option<&DisplayMetadata>) -> Result<Record> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::Decode(image::ImageError::IoError(e)))?;
        self.build_record(&bytes, metadata)
    }

    pub fn build_record_from_path(&self, path: &Path, metadata: Option<&DisplayMetadata>) -> Result<Record> {
        let bytes = std::fs::read(path)?;
        self.build_record(&bytes, metadata)
    }

    pub fn build_record_from_image(&self, image: &DynamicImage, metadata: Option<&DisplayMetadata>) -> Result<Record> {
        let mut record = self.features.build_record(image)?;
        record.attach_metadata(metadata);
        Ok(record)
    }

    /// Uses `name` as the title and leaves every other field absent.
    pub fn build_named(&self, bytes: &[u8], name: &str) -> Result<Record> {
        self.build_record(bytes, Some(&DisplayMetadata::named(name)))
    }

    pub fn build_named_from_image(&self, image: &DynamicImage, name: &str) -> Result<Record> {
        self.build_record_from_image(image, Some(&DisplayMetadata::named(name)))
    }
}
