use image::DynamicImage;

use imagedb_core::error::{Error, Result};
use imagedb_core::traits::RecordBuilder;
use imagedb_core::Record;

pub const COLOR_HISTOGRAM: &str = "color_histogram";

/// Built-in record builders, one per feature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFamily {
    /// No visual features; the record only carries metadata.
    Plain,
    /// Per-channel RGB histogram with `bins` buckets per channel, each
    /// channel normalized to sum to 1.
    ColorHistogram { bins: usize },
}

impl RecordBuilder for FeatureFamily {
    fn build_record(&self, image: &DynamicImage) -> Result<Record> {
        match *self {
            FeatureFamily::Plain => Ok(Record::new()),
            FeatureFamily::ColorHistogram { bins } => {
                let hist = color_histogram(image, bins)?;
                Ok(Record::new().with_feature(COLOR_HISTOGRAM, hist))
            }
        }
    }
}

fn color_histogram(image: &DynamicImage, bins: usize) -> Result<Vec<f32>> {
    if bins == 0 || bins > 256 {
        return Err(Error::InvalidConfig(format!("histogram bins must be in 1..=256, got {bins}")));
    }
    let rgb = image.to_rgb8();
    let mut counts = vec![0u64; bins * 3];
    for pixel in rgb.pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            counts[channel * bins + usize::from(*value) * bins / 256] += 1;
        }
    }
    let total = u64::from(rgb.width()) * u64::from(rgb.height());
    if total == 0 {
        return Ok(vec![0.0; bins * 3]);
    }
    Ok(counts.into_iter().map(|c| c as f32 / total as f32).collect())
}
