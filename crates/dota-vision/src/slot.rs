use dota_data::HeroRegistry;
use dota_state::ColorScheme;
use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::config::{EngineConfig, PreValidatorConfig};
use crate::isolate::{attempt_plan, Isolation};

/// Turns an isolated slot image into text.
///
/// Failures are reported as an empty string; the fallback chain treats them
/// like any other unreadable output.
pub trait Recognizer {
    fn recognize(&self, image: &GrayImage) -> String;
}

impl<F> Recognizer for F
where
    F: Fn(&GrayImage) -> String,
{
    fn recognize(&self, image: &GrayImage) -> String {
        self(image)
    }
}

/// Cheap plausibility check on recognizer output, run before fuzzy matching
pub struct PreValidator<'a> {
    config: &'a PreValidatorConfig,
    registry: &'a HeroRegistry,
}

impl<'a> PreValidator<'a> {
    pub fn new(config: &'a PreValidatorConfig, registry: &'a HeroRegistry) -> Self {
        Self { config, registry }
    }

    pub fn accepts(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        // Short hero names ("Io") are only legible as themselves
        if self.registry.get(text).is_some() {
            return true;
        }
        if self.config.garbage_tokens.iter().any(|t| t == text) {
            return false;
        }
        text.chars().count() >= self.config.min_len
    }
}

/// Output of running the isolation fallback chain on one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotReading {
    /// Winning attempt's text, or the last attempt's when all failed
    pub raw_text: String,
    pub success: bool,
    pub attempts: u32,
    /// Isolation that produced `raw_text` when `success` is set
    pub isolation: Option<Isolation>,
}

/// Try each isolation in turn until one yields plausible text.
pub fn resolve_slot<R>(
    index: usize,
    region: &RgbImage,
    scheme: ColorScheme,
    recognizer: &R,
    validator: &PreValidator<'_>,
    config: &EngineConfig,
) -> SlotReading
where
    R: Recognizer + ?Sized,
{
    let mut reading = SlotReading {
        raw_text: String::new(),
        success: false,
        attempts: 0,
        isolation: None,
    };

    for isolation in attempt_plan(scheme) {
        let image = isolation.apply(region, config);
        let text = recognizer.recognize(&image).trim().to_string();
        reading.attempts += 1;
        debug!(
            "Slot {} via {} mask: '{}'",
            index,
            isolation.label(),
            text
        );

        let accepted = validator.accepts(&text);
        reading.raw_text = text;
        if accepted {
            reading.success = true;
            reading.isolation = Some(isolation);
            break;
        }
    }

    reading
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::cell::RefCell;

    fn validator_fixture() -> (PreValidatorConfig, HeroRegistry) {
        (PreValidatorConfig::default(), HeroRegistry::builtin())
    }

    fn unblurred() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.preprocess.blur_sigma = 0.0;
        config
    }

    #[test]
    fn test_prevalidator_rejects_garbage() {
        let (config, registry) = validator_fixture();
        let validator = PreValidator::new(&config, &registry);
        assert!(!validator.accepts(""));
        assert!(!validator.accepts("   "));
        assert!(!validator.accepts("Bn"));
        assert!(!validator.accepts("Be"));
        assert!(!validator.accepts("Ax"));
        assert!(validator.accepts("Axe"));
        assert!(validator.accepts("Anti-Mage"));
    }

    #[test]
    fn test_prevalidator_allows_short_hero_names() {
        let (config, registry) = validator_fixture();
        let validator = PreValidator::new(&config, &registry);
        assert!(validator.accepts("Io"));
        assert!(validator.accepts("io"));
    }

    #[test]
    fn test_prevalidator_hero_named_like_garbage() {
        let config = PreValidatorConfig::default();
        let registry = HeroRegistry::new(vec![dota_data::Hero {
            id: 1,
            name: "Be".to_string(),
        }])
        .unwrap();
        let validator = PreValidator::new(&config, &registry);
        assert!(validator.accepts("Be"));
        assert!(!validator.accepts("Bn"));
    }

    #[test]
    fn test_first_plausible_attempt_wins() {
        let (vconfig, registry) = validator_fixture();
        let validator = PreValidator::new(&vconfig, &registry);
        let region = RgbImage::from_pixel(20, 10, Rgb([200, 200, 200]));
        let calls = RefCell::new(0u32);
        let recognizer = |_: &GrayImage| {
            *calls.borrow_mut() += 1;
            "Pudge\n".to_string()
        };

        let reading = resolve_slot(
            0,
            &region,
            ColorScheme::Green,
            &recognizer,
            &validator,
            &unblurred(),
        );
        assert!(reading.success);
        assert_eq!(reading.raw_text, "Pudge");
        assert_eq!(reading.attempts, 1);
        assert_eq!(reading.isolation, Some(Isolation::Inverse));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_falls_back_to_scheme_mask() {
        let (vconfig, registry) = validator_fixture();
        let validator = PreValidator::new(&vconfig, &registry);
        // Green text on a dark background
        let region = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([45, 200, 45])
            } else {
                Rgb([10, 10, 10])
            }
        });
        // Only a mask that blackens the left half reads as text
        let recognizer = |img: &GrayImage| {
            if img.get_pixel(0, 0)[0] == 0 && img.get_pixel(19, 0)[0] == 255 {
                "Viper".to_string()
            } else {
                "Bn".to_string()
            }
        };

        let reading = resolve_slot(
            3,
            &region,
            ColorScheme::Green,
            &recognizer,
            &validator,
            &unblurred(),
        );
        assert!(reading.success);
        assert_eq!(reading.attempts, 2);
        assert_eq!(
            reading.isolation,
            Some(Isolation::SchemeMask(ColorScheme::Green))
        );
    }

    #[test]
    fn test_opposite_mask_covers_misclassified_half() {
        let (vconfig, registry) = validator_fixture();
        let validator = PreValidator::new(&vconfig, &registry);
        let region = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([175, 45, 28])
            } else {
                Rgb([10, 10, 10])
            }
        });
        let recognizer = |img: &GrayImage| {
            if img.get_pixel(0, 0)[0] == 0 && img.get_pixel(19, 0)[0] == 255 {
                "Lina".to_string()
            } else {
                String::new()
            }
        };

        let reading = resolve_slot(
            6,
            &region,
            ColorScheme::Green,
            &recognizer,
            &validator,
            &unblurred(),
        );
        assert!(reading.success);
        assert_eq!(reading.attempts, 3);
        assert_eq!(
            reading.isolation,
            Some(Isolation::OppositeMask(ColorScheme::Red))
        );
    }

    #[test]
    fn test_exhausted_keeps_last_output() {
        let (vconfig, registry) = validator_fixture();
        let validator = PreValidator::new(&vconfig, &registry);
        let region = RgbImage::from_pixel(20, 10, Rgb([10, 10, 10]));
        let outputs = RefCell::new(vec!["Be", "", "Bn", "x"].into_iter());
        let recognizer =
            |_: &GrayImage| outputs.borrow_mut().next().unwrap_or_default().to_string();

        let reading = resolve_slot(
            1,
            &region,
            ColorScheme::Red,
            &recognizer,
            &validator,
            &unblurred(),
        );
        assert!(!reading.success);
        assert_eq!(reading.attempts, 4);
        assert_eq!(reading.raw_text, "x");
        assert_eq!(reading.isolation, None);
    }

    #[test]
    fn test_unknown_scheme_tries_two_isolations() {
        let (vconfig, registry) = validator_fixture();
        let validator = PreValidator::new(&vconfig, &registry);
        let region = RgbImage::from_pixel(20, 10, Rgb([10, 10, 10]));
        let recognizer = |_: &GrayImage| String::new();

        let reading = resolve_slot(
            2,
            &region,
            ColorScheme::Unknown,
            &recognizer,
            &validator,
            &unblurred(),
        );
        assert!(!reading.success);
        assert_eq!(reading.attempts, 2);
    }
}
