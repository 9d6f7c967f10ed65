use dota_state::ColorScheme;
use image::RgbImage;

use crate::config::ColorRanges;

/// Quantization step of [`SaturatedMode`]'s colour histogram
const BUCKET_SIZE: u8 = 32;
const BUCKETS_PER_CHANNEL: usize = 256 / BUCKET_SIZE as usize;

/// Estimates the single dominant colour of a region.
///
/// Implementations must be deterministic for a fixed input.
pub trait DominantColor {
    fn dominant_color(&self, region: &RgbImage) -> Option<[u8; 3]>;
}

/// One-cluster k-means: the mean of every pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanColor;

impl DominantColor for MeanColor {
    fn dominant_color(&self, region: &RgbImage) -> Option<[u8; 3]> {
        let n = region.width() as u64 * region.height() as u64;
        if n == 0 {
            return None;
        }
        let mut sums = [0u64; 3];
        for px in region.pixels() {
            for c in 0..3 {
                sums[c] += px[c] as u64;
            }
        }
        Some(sums.map(|s| (s / n) as u8))
    }
}

/// Mean colour of the most populated histogram bucket among saturated pixels.
///
/// Name text covers a small share of a slot, so averaging everything mostly
/// measures the dark background. Grey and white pixels carry no team colour
/// and are skipped; if nothing saturated remains there is no dominant colour.
#[derive(Debug, Clone, Copy)]
pub struct SaturatedMode {
    pub min_saturation: u8,
}

impl Default for SaturatedMode {
    fn default() -> Self {
        Self { min_saturation: 40 }
    }
}

impl DominantColor for SaturatedMode {
    fn dominant_color(&self, region: &RgbImage) -> Option<[u8; 3]> {
        let mut counts = vec![0u32; BUCKETS_PER_CHANNEL.pow(3)];
        let mut sums = vec![[0u64; 3]; BUCKETS_PER_CHANNEL.pow(3)];

        for px in region.pixels() {
            let rgb = px.0;
            let spread = rgb.iter().max().unwrap_or(&0) - rgb.iter().min().unwrap_or(&0);
            if spread < self.min_saturation {
                continue;
            }
            let bucket = rgb
                .iter()
                .fold(0usize, |acc, &v| acc * BUCKETS_PER_CHANNEL + (v / BUCKET_SIZE) as usize);
            counts[bucket] += 1;
            for c in 0..3 {
                sums[bucket][c] += rgb[c] as u64;
            }
        }

        // Ties go to the lowest bucket index
        let (bucket, &count) = counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        if count == 0 {
            return None;
        }
        let n = count as u64;
        Some(sums[bucket].map(|s| (s / n) as u8))
    }
}

/// Classifies a slot's highlight colour against the calibrated team ranges
pub struct MaskSelector<'c, E> {
    ranges: &'c ColorRanges,
    estimator: &'c E,
}

impl<'c, E: DominantColor> MaskSelector<'c, E> {
    pub fn new(ranges: &'c ColorRanges, estimator: &'c E) -> Self {
        Self { ranges, estimator }
    }

    pub fn classify(&self, region: &RgbImage) -> ColorScheme {
        match self.estimator.dominant_color(region) {
            Some(rgb) => classify_color(rgb, self.ranges),
            None => ColorScheme::Unknown,
        }
    }
}

pub fn classify_color(rgb: [u8; 3], ranges: &ColorRanges) -> ColorScheme {
    if ranges.green.contains(rgb) {
        ColorScheme::Green
    } else if ranges.red.contains(rgb) {
        ColorScheme::Red
    } else {
        ColorScheme::Unknown
    }
}
