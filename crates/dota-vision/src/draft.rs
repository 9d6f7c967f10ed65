use dota_data::HeroRegistry;
use dota_state::{ColorScheme, DraftResult, Side, SlotReport, SLOT_COUNT};
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::color::{DominantColor, MaskSelector, SaturatedMode};
use crate::config::EngineConfig;
use crate::error::GeometryError;
use crate::geometry;
use crate::isolate;
use crate::name_matcher::NameMatcher;
use crate::slot::{resolve_slot, PreValidator, Recognizer};

/// Colour scheme carried from each half's anchor slot to the rest of the half
#[derive(Debug, Clone, Copy, Default)]
struct HalfSchemes {
    radiant: ColorScheme,
    dire: ColorScheme,
}

impl HalfSchemes {
    fn get(&self, side: Side) -> ColorScheme {
        match side {
            Side::Radiant => self.radiant,
            Side::Dire => self.dire,
        }
    }

    fn set(&mut self, side: Side, scheme: ColorScheme) {
        match side {
            Side::Radiant => self.radiant = scheme,
            Side::Dire => self.dire = scheme,
        }
    }
}

/// Identifies the ten heroes on a draft screenshot.
///
/// Holds only read-only state, so one reader can serve concurrent calls on
/// different frames.
pub struct DraftReader<'r, E = SaturatedMode> {
    registry: &'r HeroRegistry,
    config: EngineConfig,
    estimator: E,
}

impl<'r> DraftReader<'r> {
    pub fn new(registry: &'r HeroRegistry, config: EngineConfig) -> Self {
        let estimator = SaturatedMode {
            min_saturation: config.preprocess.min_saturation,
        };
        Self::with_estimator(registry, config, estimator)
    }
}

impl<'r, E: DominantColor> DraftReader<'r, E> {
    pub fn with_estimator(registry: &'r HeroRegistry, config: EngineConfig, estimator: E) -> Self {
        Self {
            registry,
            config,
            estimator,
        }
    }

    /// Read all ten slots in order, stopping early once the error budget is
    /// spent. Fails only when the frame does not fit the layout.
    pub fn identify<R>(&self, frame: &RgbImage, recognizer: &R) -> Result<DraftResult, GeometryError>
    where
        R: Recognizer + ?Sized,
    {
        let rects = geometry::resolve(&self.config.geometry, frame.width(), frame.height())?;
        let selector = MaskSelector::new(&self.config.colors, &self.estimator);
        let validator = PreValidator::new(&self.config.validator, self.registry);
        let matcher = NameMatcher::new(self.registry, self.config.matching);
        let policy = self.config.abort;

        let mut halves = HalfSchemes::default();
        let mut slots = Vec::with_capacity(SLOT_COUNT);
        let mut error_count = 0u32;
        let mut aborted = false;

        for (index, rect) in rects.iter().enumerate() {
            let side = Side::of_slot(index);
            let is_anchor = index == side.anchor_slot();
            let region = isolate::preprocess(
                &geometry::slot_view(frame, rect),
                self.config.preprocess.blur_sigma,
            );

            let scheme = if is_anchor {
                let scheme = self.anchor_scheme(&selector, &region, side, &halves);
                halves.set(side, scheme);
                scheme
            } else {
                halves.get(side)
            };

            let reading = resolve_slot(index, &region, scheme, recognizer, &validator, &self.config);

            let hero = if reading.success {
                matcher.resolve(&reading.raw_text).map(|m| m.hero.clone())
            } else {
                None
            };

            // Only a matched hero confirms the mask that read it
            if is_anchor && hero.is_some() {
                if let Some(confirmed) = reading.isolation.and_then(|i| i.mask_scheme()) {
                    if confirmed != scheme {
                        debug!("{:?} half confirmed as {:?} by slot {}", side, confirmed, index);
                    }
                    halves.set(side, confirmed);
                }
            }

            match &hero {
                Some(h) => info!("Slot {}: {} extracted", index, h.name),
                None => debug!(
                    "Slot {} unresolved after {} attempt(s), last text '{}'",
                    index, reading.attempts, reading.raw_text
                ),
            }

            let resolved = hero.is_some();
            slots.push(SlotReport {
                index,
                side,
                scheme,
                raw_text: reading.raw_text,
                hero,
                attempts: reading.attempts,
            });

            if !resolved {
                error_count += if index == 0 {
                    policy.lead_slot_weight
                } else {
                    1
                };
                if error_count > policy.error_budget {
                    warn!(
                        "Aborting draft read at slot {}: {} error(s) exceed budget of {}",
                        index, error_count, policy.error_budget
                    );
                    aborted = true;
                    break;
                }
            }
        }

        Ok(DraftResult::new(slots, aborted))
    }

    /// Classify an anchor slot. The two halves always carry different team
    /// colours, so an unreadable Dire anchor falls back to the opposite of
    /// the Radiant half.
    fn anchor_scheme(
        &self,
        selector: &MaskSelector<'_, E>,
        region: &RgbImage,
        side: Side,
        halves: &HalfSchemes,
    ) -> ColorScheme {
        let own = selector.classify(region);
        if own.is_known() || side == Side::Radiant {
            return own;
        }
        let inferred = halves.get(Side::Radiant).opposite();
        if inferred.is_known() {
            debug!("Dire half inferred as {:?} from Radiant half", inferred);
        }
        inferred
    }
}

/// Identify heroes with the default configuration.
pub fn identify<R>(
    frame: &RgbImage,
    registry: &HeroRegistry,
    recognizer: &R,
) -> Result<DraftResult, GeometryError>
where
    R: Recognizer + ?Sized,
{
    DraftReader::new(registry, EngineConfig::default()).identify(frame, recognizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use image::{GrayImage, Rgb};
    use std::cell::RefCell;

    const WIDTH: u32 = 2560;
    const HEIGHT: u32 = 1440;
    const BACKGROUND: Rgb<u8> = Rgb([8, 8, 8]);

    const DRAFT: [&str; SLOT_COUNT] = [
        "Anti-Mage",
        "Crystal Maiden",
        "Io",
        "Queen of Pain",
        "Earthshaker",
        "Nature's Prophet",
        "Pudge",
        "Keeper of the Light",
        "Axe",
        "Primal Beast",
    ];

    fn unblurred() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.preprocess.blur_sigma = 0.0;
        config
    }

    /// Grey level painted into slot `i`; distinct per slot so a fake
    /// recognizer can tell slots apart from the inverse isolation alone.
    fn slot_level(i: usize) -> u8 {
        30 + 20 * i as u8
    }

    fn slot_rects() -> [Rect; SLOT_COUNT] {
        geometry::resolve(&EngineConfig::default().geometry, WIDTH, HEIGHT).unwrap()
    }

    fn paint(frame: &mut RgbImage, rect: &Rect, color: Rgb<u8>) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                frame.put_pixel(x, y, color);
            }
        }
    }

    /// Frame whose slots are flat grey at `slot_level(i)`
    fn grey_frame() -> RgbImage {
        let mut frame = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
        for (i, rect) in slot_rects().iter().enumerate() {
            let v = slot_level(i);
            paint(&mut frame, rect, Rgb([v, v, v]));
        }
        frame
    }

    /// Slot shown to the recognizer by the inverse isolation, if any
    fn slot_of(img: &GrayImage) -> Option<usize> {
        let level = 255 - img.get_pixel(0, 0)[0];
        (0..SLOT_COUNT).find(|&i| slot_level(i) == level)
    }

    /// Reads `names[i]` from slot `i`; `None` entries read as garbage
    fn scripted(names: [Option<&'static str>; SLOT_COUNT]) -> impl Fn(&GrayImage) -> String {
        move |img: &GrayImage| match slot_of(img).and_then(|i| names[i]) {
            Some(name) => name.to_string(),
            None => "Bn".to_string(),
        }
    }

    fn ids_of(registry: &HeroRegistry, names: &[&str]) -> Vec<u32> {
        names.iter().map(|n| registry.get(n).unwrap().id).collect()
    }

    #[test]
    fn test_all_slots_resolved_in_order() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let result = reader
            .identify(&grey_frame(), &scripted(DRAFT.map(Some)))
            .unwrap();

        assert!(!result.aborted());
        assert_eq!(result.unresolved_count(), 0);
        assert!(result.is_complete());
        let ids: Vec<u32> = result
            .hero_ids()
            .into_iter()
            .map(|(_, id)| id.unwrap())
            .collect();
        assert_eq!(ids, ids_of(&registry, &DRAFT));
        assert!(result
            .slots()
            .iter()
            .enumerate()
            .all(|(i, s)| s.index == i && s.attempts == 1));
    }

    #[test]
    fn test_noisy_names_resolved() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut names = DRAFT.map(Some);
        names[1] = Some("Crystai Maiden");
        names[6] = Some("pudqe");
        let result = reader.identify(&grey_frame(), &scripted(names)).unwrap();

        assert_eq!(result.unresolved_count(), 0);
        assert_eq!(result.slots()[1].raw_text, "Crystai Maiden");
        assert_eq!(result.slots()[1].hero.as_ref().unwrap().name, "Crystal Maiden");
        assert_eq!(result.slots()[6].hero.as_ref().unwrap().name, "Pudge");
    }

    #[test]
    fn test_unmatchable_text_leaves_slot_unresolved() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut names = DRAFT.map(Some);
        names[3] = Some("Zzyzx Qwvk");
        let result = reader.identify(&grey_frame(), &scripted(names)).unwrap();

        assert!(!result.aborted());
        assert_eq!(result.unresolved_count(), 1);
        assert!(result.slots()[3].hero.is_none());
        assert_eq!(result.slots()[3].raw_text, "Zzyzx Qwvk");
    }

    #[test]
    fn test_aborts_after_five_unresolved() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut names = DRAFT.map(Some);
        for i in [2, 4, 5, 6, 7] {
            names[i] = None;
        }
        let result = reader.identify(&grey_frame(), &scripted(names)).unwrap();

        assert!(result.aborted());
        assert_eq!(result.slots().len(), 8);
        assert_eq!(result.unresolved_count(), 5);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_four_unresolved_stay_within_budget() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut names = DRAFT.map(Some);
        for i in [0, 3, 8, 9] {
            names[i] = None;
        }
        let result = reader.identify(&grey_frame(), &scripted(names)).unwrap();

        assert!(!result.aborted());
        assert_eq!(result.slots().len(), SLOT_COUNT);
        assert_eq!(result.unresolved_count(), 4);
        // Grey slots have no team colour: inverse then threshold
        assert_eq!(result.slots()[0].attempts, 2);
    }

    #[test]
    fn test_lead_slot_weight_aborts_immediately() {
        let registry = HeroRegistry::builtin();
        let mut config = unblurred();
        config.abort.lead_slot_weight = config.abort.error_budget + 1;
        let reader = DraftReader::new(&registry, config);
        let mut names = DRAFT.map(Some);
        names[0] = None;
        let result = reader.identify(&grey_frame(), &scripted(names)).unwrap();

        assert!(result.aborted());
        assert_eq!(result.slots().len(), 1);
        assert_eq!(result.unresolved_count(), 1);
    }

    #[test]
    fn test_geometry_error_processes_nothing() {
        let registry = HeroRegistry::builtin();
        let calls = RefCell::new(0u32);
        let recognizer = |_: &GrayImage| {
            *calls.borrow_mut() += 1;
            String::new()
        };
        let err = identify(&RgbImage::new(2560, 5), &registry, &recognizer).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { .. }));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_anchor_schemes_carry_across_halves() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut frame = grey_frame();
        let rects = slot_rects();
        paint(&mut frame, &rects[0], Rgb([45, 200, 45]));
        paint(&mut frame, &rects[5], Rgb([175, 45, 28]));
        let recognizer = |_: &GrayImage| "Lion".to_string();

        let result = reader.identify(&frame, &recognizer).unwrap();
        let schemes: Vec<ColorScheme> = result.slots().iter().map(|s| s.scheme).collect();
        assert_eq!(&schemes[..5], &[ColorScheme::Green; 5]);
        assert_eq!(&schemes[5..], &[ColorScheme::Red; 5]);
    }

    #[test]
    fn test_dire_anchor_inferred_from_radiant() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut frame = grey_frame();
        paint(&mut frame, &slot_rects()[0], Rgb([175, 45, 28]));
        let recognizer = |_: &GrayImage| "Lion".to_string();

        let result = reader.identify(&frame, &recognizer).unwrap();
        assert_eq!(result.slots()[0].scheme, ColorScheme::Red);
        assert_eq!(result.slots()[5].scheme, ColorScheme::Green);
        assert_eq!(result.slots()[9].scheme, ColorScheme::Green);
    }

    #[test]
    fn test_anchor_mask_confirms_half_scheme() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        // Slot 0 classifies green, but its text only reads through the red mask
        let mut frame = grey_frame();
        let rect = slot_rects()[0];
        paint(&mut frame, &rect, Rgb([45, 200, 45]));
        let red_rows = Rect {
            height: rect.height / 4,
            ..rect
        };
        paint(&mut frame, &red_rows, Rgb([175, 45, 28]));

        let recognizer = move |img: &GrayImage| {
            // A red-mask image of slot 0 is black on top and white below
            let (w, h) = img.dimensions();
            let red_mask = w == rect.width
                && h == rect.height
                && img.get_pixel(0, 0)[0] == 0
                && img.get_pixel(0, h - 1)[0] == 255;
            if red_mask {
                "Lion".to_string()
            } else if slot_of(img).is_some() {
                "Axe".to_string()
            } else {
                String::new()
            }
        };

        let result = reader.identify(&frame, &recognizer).unwrap();
        assert_eq!(result.slots()[0].scheme, ColorScheme::Green);
        assert_eq!(result.slots()[0].hero.as_ref().unwrap().name, "Lion");
        assert_eq!(result.slots()[1].scheme, ColorScheme::Red);
    }

    #[test]
    fn test_unmatched_anchor_text_keeps_half_scheme() {
        let registry = HeroRegistry::builtin();
        let reader = DraftReader::new(&registry, unblurred());
        let mut frame = grey_frame();
        paint(&mut frame, &slot_rects()[0], Rgb([45, 200, 45]));

        // Slot 0 goes first: inverse, green mask, then the opposite red mask
        let calls = RefCell::new(0u32);
        let recognizer = |img: &GrayImage| {
            *calls.borrow_mut() += 1;
            match *calls.borrow() {
                1 | 2 => "Bn".to_string(),
                3 => "Zzyzx Qwvk".to_string(),
                _ if slot_of(img).is_some() => "Axe".to_string(),
                _ => "Bn".to_string(),
            }
        };

        let result = reader.identify(&frame, &recognizer).unwrap();
        let lead = &result.slots()[0];
        assert_eq!(lead.attempts, 3);
        assert_eq!(lead.raw_text, "Zzyzx Qwvk");
        assert!(lead.hero.is_none());
        assert_eq!(result.slots()[1].scheme, ColorScheme::Green);
        assert_eq!(result.slots()[4].scheme, ColorScheme::Green);
    }
}
