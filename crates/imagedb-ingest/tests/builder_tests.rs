use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imagedb_core::{DisplayMetadata, Error, MetadataField, Record};
use imagedb_ingest::features::COLOR_HISTOGRAM;
use imagedb_ingest::{DocumentBuilder, FeatureFamily};

fn red_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

fn car_metadata() -> DisplayMetadata {
    DisplayMetadata {
        identifier: Some("img-001".to_string()),
        title: Some("red car".to_string()),
        tags: Some("vehicle".to_string()),
        location: Some("garage".to_string()),
        latitude: Some("48.2082".to_string()),
        longitude: Some("16.3738".to_string()),
    }
}

#[test]
fn build_record_attaches_all_metadata() {
    let builder = DocumentBuilder::new(FeatureFamily::Plain);
    let record = builder.build_record(&red_png(), Some(&car_metadata())).expect("build");

    assert_eq!(record.metadata(), car_metadata());
    assert_eq!(record.get(MetadataField::SecondaryId), Some("img-001"));
    assert!(record.features().is_empty());
}

#[test]
fn build_record_without_metadata_has_no_fields() {
    let builder = DocumentBuilder::new(FeatureFamily::Plain);
    let record = builder.build_record(&red_png(), None).expect("build");
    assert!(!record.has_metadata());
    assert!(MetadataField::ALL.iter().all(|f| record.get(*f).is_none()));
}

#[test]
fn malformed_bytes_fail_with_decode_error() {
    let builder = DocumentBuilder::new(FeatureFamily::Plain);
    let err = builder.build_record(b"definitely not an image", Some(&car_metadata())).unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");

    let mut truncated = red_png();
    truncated.truncate(truncated.len() / 2);
    let err = builder.build_record_from_reader(Cursor::new(truncated), None).unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[test]
fn named_overload_sets_title_only() {
    let builder = DocumentBuilder::new(FeatureFamily::Plain);
    let record = builder.build_named(&red_png(), "sunset.jpg").expect("build");
    assert_eq!(record.get(MetadataField::Title), Some("sunset.jpg"));
    assert!(record.get(MetadataField::Identifier).is_none());
    assert_eq!(record.fields().count(), 1);

    let image = image::load_from_memory(&red_png()).expect("decode");
    let record = builder.build_named_from_image(&image, "sunset.jpg").expect("build");
    assert_eq!(record.get(MetadataField::Title), Some("sunset.jpg"));
}

#[test]
fn color_histogram_is_normalized_per_channel() {
    let builder = DocumentBuilder::new(FeatureFamily::ColorHistogram { bins: 4 });
    let record = builder.build_record(&red_png(), None).expect("build");
    let hist = record.feature(COLOR_HISTOGRAM).expect("histogram");
    assert_eq!(hist.len(), 12);
    // red saturates the top red bucket, green and blue sit in bucket 0
    assert_eq!(hist[3], 1.0);
    assert_eq!(hist[4], 1.0);
    assert_eq!(hist[8], 1.0);
    let sum: f32 = hist.iter().sum();
    assert!((sum - 3.0).abs() < 1e-6);
}

#[test]
fn invalid_histogram_bins_are_rejected() {
    let builder = DocumentBuilder::new(FeatureFamily::ColorHistogram { bins: 0 });
    assert!(matches!(builder.build_record(&red_png(), None), Err(Error::InvalidConfig(_))));
}

#[test]
fn injected_closure_acts_as_record_builder() {
    let builder = DocumentBuilder::new(|image: &DynamicImage| -> imagedb_core::Result<Record> {
        Ok(Record::new().with_feature("size", vec![image.width() as f32, image.height() as f32]))
    });
    let record = builder.build_record(&red_png(), Some(&car_metadata())).expect("build");
    assert_eq!(record.feature("size"), Some(&[4.0, 4.0][..]));
    assert_eq!(record.get(MetadataField::Title), Some("red car"));
}

#[test]
fn missing_file_is_io_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let builder = DocumentBuilder::new(FeatureFamily::Plain);
    let err = builder.build_record_from_path(&tmp.path().join("nope.png"), None).unwrap_err();
    assert!(matches!(err, Error::Io(_)));

    let path = tmp.path().join("ok.png");
    std::fs::write(&path, red_png()).unwrap();
    assert!(builder.build_record_from_path(&path, None).is_ok());
}
