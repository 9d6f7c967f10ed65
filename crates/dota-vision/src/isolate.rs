use dota_state::ColorScheme;
use image::{GrayImage, Luma, RgbImage, SubImage};
use serde::{Deserialize, Serialize};

use crate::config::{ChannelRange, EngineConfig};

/// How a slot's text is separated from its background before recognition.
///
/// Every variant renders text dark on a light background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Isolation {
    /// Inverted intensity; white name text is the common case
    Inverse,
    /// Pixels inside the half's expected highlight colour
    SchemeMask(ColorScheme),
    /// Pixels inside the other team's colour, for a misclassified half
    OppositeMask(ColorScheme),
    /// Inverted intensity binarized at a fixed cutoff
    Threshold,
}

impl Isolation {
    /// Colour range this isolation keys on, if any
    pub fn mask_scheme(&self) -> Option<ColorScheme> {
        match *self {
            Isolation::SchemeMask(s) | Isolation::OppositeMask(s) => Some(s),
            Isolation::Inverse | Isolation::Threshold => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Isolation::Inverse => "inverse",
            Isolation::SchemeMask(ColorScheme::Green) => "green",
            Isolation::SchemeMask(_) => "red",
            Isolation::OppositeMask(ColorScheme::Green) => "opposite_green",
            Isolation::OppositeMask(_) => "opposite_red",
            Isolation::Threshold => "threshold",
        }
    }

    pub fn apply(&self, region: &RgbImage, config: &EngineConfig) -> GrayImage {
        match self {
            Isolation::Inverse => inverse(region),
            Isolation::SchemeMask(scheme) | Isolation::OppositeMask(scheme) => {
                match config.colors.for_scheme(*scheme) {
                    Some(range) => color_mask(region, range),
                    // No range to key on: nothing counts as text
                    None => GrayImage::from_pixel(region.width(), region.height(), Luma([255])),
                }
            }
            Isolation::Threshold => threshold(region, config.preprocess.threshold_cutoff),
        }
    }
}

/// Isolation attempts for a slot with the given scheme, in order
pub fn attempt_plan(scheme: ColorScheme) -> Vec<Isolation> {
    let mut plan = vec![Isolation::Inverse];
    if scheme.is_known() {
        plan.push(Isolation::SchemeMask(scheme));
        plan.push(Isolation::OppositeMask(scheme.opposite()));
    }
    plan.push(Isolation::Threshold);
    plan
}

/// Copy a slot out of the frame, smoothing it when `sigma` is positive
pub fn preprocess(view: &SubImage<&RgbImage>, sigma: f32) -> RgbImage {
    let region = view.to_image();
    if sigma > 0.0 {
        image::imageops::blur(&region, sigma)
    } else {
        region
    }
}

fn intensity(px: &image::Rgb<u8>) -> u8 {
    ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8
}

/// Light text becomes dark, dark background becomes light
pub fn inverse(region: &RgbImage) -> GrayImage {
    GrayImage::from_fn(region.width(), region.height(), |x, y| {
        Luma([255 - intensity(region.get_pixel(x, y))])
    })
}

/// Pixels inside `range` become black (text), everything else white
pub fn color_mask(region: &RgbImage, range: &ChannelRange) -> GrayImage {
    GrayImage::from_fn(region.width(), region.height(), |x, y| {
        if range.contains(region.get_pixel(x, y).0) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Inverted pixels darker than `cutoff` become black, the rest white
pub fn threshold(region: &RgbImage, cutoff: u8) -> GrayImage {
    GrayImage::from_fn(region.width(), region.height(), |x, y| {
        if 255 - intensity(region.get_pixel(x, y)) < cutoff {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}
