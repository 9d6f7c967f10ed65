use dota_data::{Hero, HeroRegistry};
use tracing::debug;

use crate::config::MatchConfig;

/// A hero matched from recognizer output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatch<'r> {
    pub hero: &'r Hero,
    pub distance: usize,
}

/// Resolves noisy recognizer output to the closest hero name.
pub struct NameMatcher<'r> {
    registry: &'r HeroRegistry,
    config: MatchConfig,
}

impl<'r> NameMatcher<'r> {
    pub fn new(registry: &'r HeroRegistry, config: MatchConfig) -> Self {
        Self { registry, config }
    }

    /// Closest hero within the acceptance limit for `raw`, or `None`.
    ///
    /// Candidates are scanned circularly from `raw`'s sorted insertion point,
    /// so lexicographic neighbours are tried first. A candidate replaces the
    /// current best only when strictly closer, which makes ties first-found.
    /// The scan stops at the first candidate within `early_exit_distance`.
    pub fn resolve(&self, raw: &str) -> Option<NameMatch<'r>> {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() || self.registry.is_empty() {
            return None;
        }

        if let Some(hero) = self.registry.get(&lower) {
            debug!("Direct match: {}", hero.name);
            return Some(NameMatch { hero, distance: 0 });
        }

        let input: Vec<char> = lower.chars().collect();
        let limit = acceptance_limit(input.len(), self.config.divisor);
        let early_exit = self.config.early_exit_distance;
        let names = self.registry.names_lower();
        let start = self.registry.insertion_point(&lower);

        let mut best_distance = input.len();
        let mut best: Option<usize> = None;
        let mut scanned = 0;

        for step in 0..names.len() {
            let idx = (start + step) % names.len();
            scanned += 1;

            // Only distances that could be accepted or trigger the early exit matter
            let bound = limit.min(best_distance).saturating_sub(1).max(early_exit);
            let candidate: Vec<char> = names[idx].chars().collect();
            let Some(distance) = bounded_edit_distance(&input, &candidate, bound) else {
                continue;
            };

            if distance < limit && distance < best_distance {
                best_distance = distance;
                best = Some(idx);
            }
            if distance <= early_exit {
                break;
            }
        }

        let found = best.map(|idx| NameMatch {
            hero: &self.registry.heroes()[idx],
            distance: best_distance,
        });
        match &found {
            Some(m) => debug!(
                "'{}' matched {} at distance {} after {} candidates",
                raw, m.hero.name, m.distance, scanned
            ),
            None => debug!(
                "'{}' has no hero within distance {} ({} candidates)",
                raw, limit, scanned
            ),
        }
        found
    }
}

/// Exclusive edit-distance limit for an input of `len` characters:
/// `len / divisor + len % divisor`.
pub fn acceptance_limit(len: usize, divisor: usize) -> usize {
    let divisor = divisor.max(1);
    len / divisor + len % divisor
}

/// Levenshtein distance with unit costs, over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    // Distance never exceeds the longer length
    bounded_edit_distance(&a, &b, a.len().max(b.len())).unwrap_or(usize::MAX)
}

/// Levenshtein distance if it is at most `max`, otherwise `None`.
///
/// Single-row dynamic programme over the shorter string. Row minima never
/// decrease, so the computation stops once a whole row exceeds `max`.
pub fn bounded_edit_distance(a: &[char], b: &[char], max: usize) -> Option<usize> {
    let (short, long) = if a.len() > b.len() { (b, a) } else { (a, b) };
    if long.len() - short.len() > max {
        return None;
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, &lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
            row_min = row_min.min(row[j + 1]);
        }

        if row_min > max {
            return None;
        }
    }

    let distance = row[short.len()];
    (distance <= max).then_some(distance)
}
