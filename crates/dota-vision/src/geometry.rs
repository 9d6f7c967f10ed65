use dota_state::{SLOTS_PER_SIDE, SLOT_COUNT};
use image::{RgbImage, SubImage};
use serde::{Deserialize, Serialize};

use crate::config::{Band, GeometryConfig};
use crate::error::GeometryError;

/// Absorbs float error so that ratios derived from exact pixel positions
/// truncate back onto those positions.
const RATIO_EPSILON: f64 = 1e-6;

/// Absolute pixel rectangle within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Map the draft layout onto a `width`x`height` frame.
///
/// Slots 0..5 use the left column and slots 5..10 the right one; both halves
/// walk the same five rows top to bottom.
pub fn resolve(
    config: &GeometryConfig,
    width: u32,
    height: u32,
) -> Result<[Rect; SLOT_COUNT], GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::InvalidDimensions { width, height });
    }

    let mut rects = [Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    }; SLOT_COUNT];

    for (slot, rect) in rects.iter_mut().enumerate() {
        let column = if slot < SLOTS_PER_SIDE {
            &config.left
        } else {
            &config.right
        };
        let row = &config.rows[slot % SLOTS_PER_SIDE];
        let (x0, x1) = scale_band(column, width);
        let (y0, y1) = scale_band(row, height);

        *rect = Rect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        };

        if rect.width == 0 || rect.height == 0 {
            return Err(GeometryError::Degenerate { slot, rect: *rect });
        }
        if rect.right() > width || rect.bottom() > height {
            return Err(GeometryError::OutOfBounds {
                slot,
                rect: *rect,
                width,
                height,
            });
        }
    }

    Ok(rects)
}

fn scale_band(band: &Band, dim: u32) -> (u32, u32) {
    (scale(band.min, dim), scale(band.max, dim))
}

fn scale(ratio: f64, dim: u32) -> u32 {
    (ratio * dim as f64 + RATIO_EPSILON).max(0.0).floor() as u32
}

/// Borrow a slot's pixels without copying them
pub fn slot_view<'a>(frame: &'a RgbImage, rect: &Rect) -> SubImage<&'a RgbImage> {
    image::imageops::crop_imm(frame, rect.x, rect.y, rect.width, rect.height)
}
