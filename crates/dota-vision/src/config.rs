//! Calibration constants for the draft reader.
//!
//! Every threshold the engine uses lives here so that it can be tuned from a
//! JSON file and overridden in tests. Defaults were calibrated on 2560x1440
//! draft screenshots; the geometry is stored as fractions of the frame so it
//! carries over to any resolution with the same aspect ratio.

use anyhow::{Context, Result};
use dota_state::{ColorScheme, SLOTS_PER_SIDE};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

const REFERENCE_WIDTH: f64 = 2560.0;
const REFERENCE_HEIGHT: f64 = 1440.0;

/// Name-text rows at the reference resolution, shared by both halves
const REFERENCE_ROWS: [(f64, f64); SLOTS_PER_SIDE] = [
    (193.0, 233.0),
    (410.0, 450.0),
    (628.0, 668.0),
    (845.0, 885.0),
    (1062.0, 1102.0),
];
const REFERENCE_LEFT_COLUMN: (f64, f64) = (464.0, 773.0);
const REFERENCE_RIGHT_COLUMN: (f64, f64) = (1789.0, 2099.0);

/// A `[min, max)` span expressed as a fraction of a frame dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    fn from_reference((min, max): (f64, f64), reference: f64) -> Self {
        Self {
            min: min / reference,
            max: max / reference,
        }
    }

    fn validate(&self, what: &'static str) -> Result<(), ConfigError> {
        for ratio in [self.min, self.max] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::RatioOutOfRange { what, ratio });
            }
        }
        if self.min >= self.max {
            return Err(ConfigError::InvertedBand {
                what,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Vertical bands, top to bottom; slot `i` uses `rows[i % 5]`
    pub rows: [Band; SLOTS_PER_SIDE],
    /// Horizontal span of slots 0..5
    pub left: Band,
    /// Horizontal span of slots 5..10
    pub right: Band,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            rows: REFERENCE_ROWS.map(|row| Band::from_reference(row, REFERENCE_HEIGHT)),
            left: Band::from_reference(REFERENCE_LEFT_COLUMN, REFERENCE_WIDTH),
            right: Band::from_reference(REFERENCE_RIGHT_COLUMN, REFERENCE_WIDTH),
        }
    }
}

/// Inclusive per-channel bounds in RGB order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub lo: [u8; 3],
    pub hi: [u8; 3],
}

impl ChannelRange {
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        (0..3).all(|c| self.lo[c] <= rgb[c] && rgb[c] <= self.hi[c])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRanges {
    pub red: ChannelRange,
    pub green: ChannelRange,
}

impl ColorRanges {
    pub fn for_scheme(&self, scheme: ColorScheme) -> Option<&ChannelRange> {
        match scheme {
            ColorScheme::Red => Some(&self.red),
            ColorScheme::Green => Some(&self.green),
            ColorScheme::Unknown => None,
        }
    }
}

impl Default for ColorRanges {
    fn default() -> Self {
        Self {
            red: ChannelRange {
                lo: [145, 30, 21],
                hi: [205, 60, 35],
            },
            green: ChannelRange {
                lo: [20, 120, 20],
                hi: [70, 255, 70],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// A candidate must be closer than `len / divisor + len % divisor`
    pub divisor: usize,
    /// Stop scanning at the first candidate this close
    pub early_exit_distance: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            divisor: 3,
            early_exit_distance: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbortPolicy {
    /// Identification aborts once more than this many slots are unresolved
    pub error_budget: u32,
    /// How many errors an unresolved slot 0 counts for. Slot 0 failing
    /// usually means the frame is not a draft screen at all; raising this
    /// above `error_budget` turns it into an immediate abort.
    pub lead_slot_weight: u32,
}

impl Default for AbortPolicy {
    fn default() -> Self {
        Self {
            error_budget: 4,
            lead_slot_weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreValidatorConfig {
    /// Stray glyph sequences the recognizer produces on empty regions
    pub garbage_tokens: Vec<String>,
    /// Shorter outputs are rejected unless they name a hero exactly
    pub min_len: usize,
}

impl Default for PreValidatorConfig {
    fn default() -> Self {
        Self {
            garbage_tokens: vec!["Bn".to_string(), "Be".to_string()],
            min_len: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur applied to each slot before isolation; 0 disables it
    pub blur_sigma: f32,
    /// Inverted-intensity cutoff of the last-resort binarization
    pub threshold_cutoff: u8,
    /// Pixels whose channel spread is below this are ignored when
    /// estimating the highlight colour
    pub min_saturation: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            threshold_cutoff: 115,
            min_saturation: 40,
        }
    }
}

/// All tunables of one identification call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub geometry: GeometryConfig,
    pub colors: ColorRanges,
    pub matching: MatchConfig,
    pub abort: AbortPolicy,
    pub validator: PreValidatorConfig,
    pub preprocess: PreprocessConfig,
}

impl EngineConfig {
    /// Load and validate a JSON config. Missing sections keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        tracing::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for row in &self.geometry.rows {
            row.validate("row")?;
        }
        self.geometry.left.validate("left column")?;
        self.geometry.right.validate("right column")?;

        for (name, range) in [("red", &self.colors.red), ("green", &self.colors.green)] {
            if (0..3).any(|c| range.lo[c] > range.hi[c]) {
                return Err(ConfigError::InvertedChannelRange(name));
            }
        }

        if self.matching.divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        Ok(())
    }
}
