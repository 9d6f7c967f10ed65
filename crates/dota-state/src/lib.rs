use dota_data::Hero;
use serde::{Deserialize, Serialize};

/// Number of hero-name slots on the draft screen
pub const SLOT_COUNT: usize = 10;

/// Slots per team; slots `0..5` are Radiant, `5..10` are Dire
pub const SLOTS_PER_SIDE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Radiant,
    Dire,
}

impl Side {
    pub fn of_slot(index: usize) -> Self {
        if index < SLOTS_PER_SIDE {
            Side::Radiant
        } else {
            Side::Dire
        }
    }

    /// First slot of this side, whose colour classification speaks for the
    /// whole half
    pub fn anchor_slot(self) -> usize {
        match self {
            Side::Radiant => 0,
            Side::Dire => SLOTS_PER_SIDE,
        }
    }
}

/// Highlight colour of a half of the draft screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    Unknown,
    Red,
    Green,
}

impl ColorScheme {
    /// The other team's colour; `Unknown` stays unknown
    pub fn opposite(self) -> Self {
        match self {
            ColorScheme::Red => ColorScheme::Green,
            ColorScheme::Green => ColorScheme::Red,
            ColorScheme::Unknown => ColorScheme::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != ColorScheme::Unknown
    }
}

/// Outcome of reading one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotReport {
    pub index: usize,
    pub side: Side,
    pub scheme: ColorScheme,
    /// Text returned by the recognizer for the winning (or last) attempt
    pub raw_text: String,
    pub hero: Option<Hero>,
    pub attempts: u32,
}

impl SlotReport {
    pub fn is_resolved(&self) -> bool {
        self.hero.is_some()
    }
}

/// Result of identifying the heroes on one draft screenshot.
///
/// `slots` only holds the slots processed before an abort, so callers must
/// check [`aborted`](Self::aborted) before assuming all ten were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    slots: Vec<SlotReport>,
    unresolved_count: usize,
    aborted: bool,
}

impl DraftResult {
    pub fn new(slots: Vec<SlotReport>, aborted: bool) -> Self {
        let unresolved_count = slots.iter().filter(|s| !s.is_resolved()).count();
        Self {
            slots,
            unresolved_count,
            aborted,
        }
    }

    pub fn slots(&self) -> &[SlotReport] {
        &self.slots
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved_count
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Every slot was processed and resolved
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.unresolved_count == 0 && self.slots.len() == SLOT_COUNT
    }

    /// `(slot index, hero id)` pairs in slot order, `None` for unresolved slots
    pub fn hero_ids(&self) -> Vec<(usize, Option<u32>)> {
        self.slots
            .iter()
            .map(|s| (s.index, s.hero.as_ref().map(|h| h.id)))
            .collect()
    }

    /// Resolved hero names joined with `|`, skipping unresolved slots
    pub fn names_line(&self) -> String {
        self.slots
            .iter()
            .filter_map(|s| s.hero.as_ref().map(|h| h.name.as_str()))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Resolved hero ids joined with `,`, skipping unresolved slots
    pub fn ids_csv(&self) -> String {
        self.slots
            .iter()
            .filter_map(|s| s.hero.as_ref().map(|h| h.id.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}
