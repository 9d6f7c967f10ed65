use thiserror::Error;

use crate::geometry::Rect;

/// The frame cannot be mapped onto the draft layout. Fatal for the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Slot {slot} region is empty: {rect:?}")]
    Degenerate { slot: usize, rect: Rect },

    #[error("Slot {slot} region {rect:?} exceeds the {width}x{height} frame")]
    OutOfBounds {
        slot: usize,
        rect: Rect,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{what} ratio {ratio} is outside 0.0..=1.0")]
    RatioOutOfRange { what: &'static str, ratio: f64 },

    #[error("{what} band is empty or inverted: {min}..{max}")]
    InvertedBand {
        what: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{0} colour range has lo > hi")]
    InvertedChannelRange(&'static str),

    #[error("Match divisor must be positive")]
    ZeroDivisor,
}
