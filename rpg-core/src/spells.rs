//! Spell definitions and the standard spell list.

use crate::world::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Schools of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

impl SpellSchool {
    pub fn name(&self) -> &'static str {
        match self {
            SpellSchool::Abjuration => "Abjuration",
            SpellSchool::Conjuration => "Conjuration",
            SpellSchool::Divination => "Divination",
            SpellSchool::Enchantment => "Enchantment",
            SpellSchool::Evocation => "Evocation",
            SpellSchool::Illusion => "Illusion",
            SpellSchool::Necromancy => "Necromancy",
            SpellSchool::Transmutation => "Transmutation",
        }
    }
}

/// Complete spell definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: EntityId,
    pub name: String,
    pub level: u8, // 0 for cantrips
    pub school: SpellSchool,
    pub cast_time: String,
    pub range: String,
    #[serde(default)]
    pub components: BTreeSet<String>,
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requires_concentration: bool,
    #[serde(default)]
    pub mana_cost: u32,
}

impl Spell {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    /// Component list in V, S, M order, e.g. `"V, S, M"`.
    pub fn components_display(&self) -> String {
        ["V", "S", "M"]
            .iter()
            .filter(|c| self.components.contains(**c))
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// Standard Spells
// ============================================================================

/// Standard spell list.
pub static STANDARD_SPELLS: LazyLock<Vec<Spell>> = LazyLock::new(build_standard_spells);

/// Look up a standard spell by name (case-insensitive).
pub fn get_spell(name: &str) -> Option<&'static Spell> {
    let name_lower = name.to_lowercase();
    STANDARD_SPELLS
        .iter()
        .find(|s| s.name.to_lowercase() == name_lower)
}

/// Get all standard spells of a specific level.
pub fn spells_by_level(level: u8) -> impl Iterator<Item = &'static Spell> {
    STANDARD_SPELLS.iter().filter(move |s| s.level == level)
}

fn components(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn build_standard_spells() -> Vec<Spell> {
    vec![
        Spell {
            id: EntityId(501),
            name: "Fireball".to_string(),
            level: 3,
            school: SpellSchool::Evocation,
            cast_time: "1 action".to_string(),
            range: "150 feet".to_string(),
            components: components(&["V", "S", "M"]),
            duration: "Instantaneous".to_string(),
            description: "A burst of flame explodes in a 20-foot radius.".to_string(),
            requires_concentration: false,
            mana_cost: 15,
        },
        Spell {
            id: EntityId(502),
            name: "Cure Wounds".to_string(),
            level: 1,
            school: SpellSchool::Evocation,
            cast_time: "1 action".to_string(),
            range: "Touch".to_string(),
            components: components(&["V", "S"]),
            duration: "Instantaneous".to_string(),
            description: "A creature you touch regains hit points.".to_string(),
            requires_concentration: false,
            mana_cost: 5,
        },
        Spell {
            id: EntityId(503),
            name: "Magic Missile".to_string(),
            level: 1,
            school: SpellSchool::Evocation,
            cast_time: "1 action".to_string(),
            range: "120 feet".to_string(),
            components: components(&["V", "S"]),
            duration: "Instantaneous".to_string(),
            description: "Three glowing darts each deal 1d4+1 force damage.".to_string(),
            requires_concentration: false,
            mana_cost: 5,
        },
        Spell {
            id: EntityId(504),
            name: "Shield of Faith".to_string(),
            level: 1,
            school: SpellSchool::Abjuration,
            cast_time: "1 bonus action".to_string(),
            range: "60 feet".to_string(),
            components: components(&["V", "S", "M"]),
            duration: "10 minutes".to_string(),
            description: "A shimmering field grants +2 AC.".to_string(),
            requires_concentration: true,
            mana_cost: 5,
        },
        Spell {
            id: EntityId(505),
            name: "Light".to_string(),
            level: 0,
            school: SpellSchool::Evocation,
            cast_time: "1 action".to_string(),
            range: "Touch".to_string(),
            components: components(&["V", "M"]),
            duration: "1 hour".to_string(),
            description: "An object sheds bright light in a 20-foot radius.".to_string(),
            requires_concentration: false,
            mana_cost: 0,
        },
    ]
}
