use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// A draftable hero with its stable external id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hero {
    pub id: u32,
    pub name: String,
}

/// Errors raised while building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate hero name: {0}")]
    DuplicateName(String),

    #[error("Hero {id} has an empty name")]
    EmptyName { id: u32 },
}

/// Built-in hero catalog, keyed by the ids the stats site uses.
const BUILTIN_HEROES: &[(u32, &str)] = &[
    (1, "Anti-Mage"),
    (2, "Axe"),
    (3, "Bane"),
    (4, "Bloodseeker"),
    (5, "Crystal Maiden"),
    (6, "Drow Ranger"),
    (7, "Earthshaker"),
    (8, "Juggernaut"),
    (9, "Mirana"),
    (10, "Morphling"),
    (11, "Shadow Fiend"),
    (12, "Phantom Lancer"),
    (13, "Puck"),
    (14, "Pudge"),
    (15, "Razor"),
    (16, "Sand King"),
    (17, "Storm Spirit"),
    (18, "Sven"),
    (19, "Tiny"),
    (20, "Vengeful Spirit"),
    (21, "Windranger"),
    (22, "Zeus"),
    (23, "Kunkka"),
    (25, "Lina"),
    (26, "Lion"),
    (27, "Shadow Shaman"),
    (28, "Slardar"),
    (29, "Tidehunter"),
    (30, "Witch Doctor"),
    (31, "Lich"),
    (32, "Riki"),
    (33, "Enigma"),
    (34, "Tinker"),
    (35, "Sniper"),
    (36, "Necrophos"),
    (37, "Warlock"),
    (38, "Beastmaster"),
    (39, "Queen of Pain"),
    (40, "Venomancer"),
    (41, "Faceless Void"),
    (42, "Wraith King"),
    (43, "Death Prophet"),
    (44, "Phantom Assassin"),
    (45, "Pugna"),
    (46, "Templar Assassin"),
    (47, "Viper"),
    (48, "Luna"),
    (49, "Dragon Knight"),
    (50, "Dazzle"),
    (51, "Clockwerk"),
    (52, "Leshrac"),
    (53, "Nature's Prophet"),
    (54, "Lifestealer"),
    (55, "Dark Seer"),
    (56, "Clinkz"),
    (57, "Omniknight"),
    (58, "Enchantress"),
    (59, "Huskar"),
    (60, "Night Stalker"),
    (61, "Broodmother"),
    (62, "Bounty Hunter"),
    (63, "Weaver"),
    (64, "Jakiro"),
    (65, "Batrider"),
    (66, "Chen"),
    (67, "Spectre"),
    (68, "Ancient Apparition"),
    (69, "Doom"),
    (70, "Ursa"),
    (71, "Spirit Breaker"),
    (72, "Gyrocopter"),
    (73, "Alchemist"),
    (74, "Invoker"),
    (75, "Silencer"),
    (76, "Outworld Destroyer"),
    (77, "Lycan"),
    (78, "Brewmaster"),
    (79, "Shadow Demon"),
    (80, "Lone Druid"),
    (81, "Chaos Knight"),
    (82, "Meepo"),
    (83, "Treant Protector"),
    (84, "Ogre Magi"),
    (85, "Undying"),
    (86, "Rubick"),
    (87, "Disruptor"),
    (88, "Nyx Assassin"),
    (89, "Naga Siren"),
    (90, "Keeper of the Light"),
    (91, "Io"),
    (92, "Visage"),
    (93, "Slark"),
    (94, "Medusa"),
    (95, "Troll Warlord"),
    (96, "Centaur Warrunner"),
    (97, "Magnus"),
    (98, "Timbersaw"),
    (99, "Bristleback"),
    (100, "Tusk"),
    (101, "Skywrath Mage"),
    (102, "Abaddon"),
    (103, "Elder Titan"),
    (104, "Legion Commander"),
    (105, "Techies"),
    (106, "Ember Spirit"),
    (107, "Earth Spirit"),
    (108, "Underlord"),
    (109, "Terrorblade"),
    (110, "Phoenix"),
    (111, "Oracle"),
    (112, "Winter Wyvern"),
    (113, "Arc Warden"),
    (114, "Monkey King"),
    (119, "Dark Willow"),
    (120, "Pangolier"),
    (121, "Grimstroke"),
    (123, "Hoodwink"),
    (126, "Void Spirit"),
    (128, "Snapfire"),
    (129, "Mars"),
    (135, "Dawnbreaker"),
    (136, "Marci"),
    (137, "Primal Beast"),
];

/// Raw heroes.json file format
#[derive(Debug, Deserialize)]
struct HeroesFile {
    #[allow(dead_code)]
    version: Option<String>,
    heroes: Vec<Hero>,
}

/// Read-only hero catalog.
///
/// Heroes are kept sorted by lowercase name so that the matcher can start its
/// scan at the binary-search insertion point of a noisy input. Exact lookups
/// go through a lowercase-name index.
#[derive(Debug, Clone, Default)]
pub struct HeroRegistry {
    heroes: Vec<Hero>,
    names_lower: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl HeroRegistry {
    /// Build a registry from an arbitrary hero list.
    pub fn new(heroes: impl IntoIterator<Item = Hero>) -> Result<Self, RegistryError> {
        let mut keyed: Vec<(String, Hero)> = Vec::new();
        for hero in heroes {
            let trimmed = hero.name.trim();
            if trimmed.is_empty() {
                return Err(RegistryError::EmptyName { id: hero.id });
            }
            keyed.push((trimmed.to_lowercase(), hero));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut by_name = HashMap::with_capacity(keyed.len());
        for (i, (lower, hero)) in keyed.iter().enumerate() {
            if by_name.insert(lower.clone(), i).is_some() {
                return Err(RegistryError::DuplicateName(hero.name.clone()));
            }
        }

        let (names_lower, heroes) = keyed.into_iter().unzip();
        Ok(Self {
            heroes,
            names_lower,
            by_name,
        })
    }

    /// The compiled-in catalog
    pub fn builtin() -> Self {
        let heroes = BUILTIN_HEROES.iter().map(|&(id, name)| Hero {
            id,
            name: name.to_string(),
        });
        // The table above has unique, non-empty names.
        Self::new(heroes).unwrap_or_default()
    }

    /// Load the catalog from data_dir/heroes.json, falling back to the
    /// built-in catalog when the file does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let heroes_path = data_dir.join("heroes.json");
        if !heroes_path.exists() {
            tracing::warn!(
                "No heroes.json found at {}, using built-in catalog",
                heroes_path.display()
            );
            return Ok(Self::builtin());
        }

        let content =
            std::fs::read_to_string(&heroes_path).context("Failed to read heroes.json")?;
        let file: HeroesFile =
            serde_json::from_str(&content).context("Failed to parse heroes.json")?;
        let registry = Self::new(file.heroes)
            .with_context(|| format!("Invalid hero list in {}", heroes_path.display()))?;

        tracing::info!("Loaded {} heroes", registry.len());
        Ok(registry)
    }

    /// Case-insensitive exact lookup
    pub fn get(&self, name: &str) -> Option<&Hero> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.heroes[i])
    }

    /// Heroes in lowercase-name order
    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    /// Lowercase names, index-aligned with [`heroes`](Self::heroes)
    pub fn names_lower(&self) -> &[String] {
        &self.names_lower
    }

    /// Position at which `lower` would be inserted into the sorted names.
    pub fn insertion_point(&self, lower: &str) -> usize {
        self.names_lower.partition_point(|n| n.as_str() < lower)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
