//! Testing utilities.
//!
//! - `ScriptedDice` for deterministic rolls
//! - Sample characters and items matching the standard catalog
//! - Assertion helpers for character state

use crate::dice::RandomSource;
use crate::items::{ArmorItem, ArmorType, PotionItem, WeaponDamageType, WeaponItem};
use crate::world::{
    AbilityScores, Character, ClassTemplate, EntityId, NpcDetails, PlayerDetails,
};
use std::collections::VecDeque;

/// A random source that replays scripted values.
///
/// Die rolls are clamped into `1..=sides` and default to 1 once the
/// script runs out. Index picks default to 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    indices: VecDeque<usize>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            indices: VecDeque::new(),
        }
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn push_roll(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    /// Rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RandomSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.indices
            .pop_front()
            .unwrap_or(0)
            .min(len.saturating_sub(1))
    }
}

// ============================================================================
// Samples
// ============================================================================

pub fn warrior_template() -> ClassTemplate {
    ClassTemplate {
        max_hp: 12,
        attributes: AbilityScores::new(16, 10, 14, 8, 12, 9),
        proficiencies: vec!["Athletics".to_string(), "Heavy Armor".to_string()],
        race: "Mountain Dwarf".to_string(),
        max_mana: None,
    }
}

pub fn wizard_template() -> ClassTemplate {
    ClassTemplate {
        max_hp: 8,
        attributes: AbilityScores::new(8, 14, 12, 16, 13, 10),
        proficiencies: vec!["Arcana".to_string()],
        race: "High Elf".to_string(),
        max_mana: Some(20),
    }
}

/// Level 1 warrior: 12 HP, AC 10, no mana, empty inventory.
pub fn sample_warrior() -> Character {
    build(Character::player(
        EntityId(1),
        "Thorin",
        "Warrior",
        &warrior_template(),
        PlayerDetails::new("Lawful Good", "Player1"),
    ))
}

/// Level 1 wizard: 8 HP, AC 12, 20 mana, no spells known.
pub fn sample_wizard() -> Character {
    build(Character::player(
        EntityId(2),
        "Merlin",
        "Wizard",
        &wizard_template(),
        PlayerDetails::new("Neutral Good", "Player2"),
    ))
}

/// Unarmed goblin: 7 HP, AC 12.
pub fn sample_goblin() -> Character {
    build(Character::npc(
        EntityId(101),
        "Snaga",
        "Goblin",
        &ClassTemplate {
            max_hp: 7,
            attributes: AbilityScores::new(8, 14, 10, 10, 8, 8),
            proficiencies: vec!["Stealth".to_string()],
            race: "Goblin".to_string(),
            max_mana: None,
        },
        NpcDetails {
            npc_type: "Monster".to_string(),
            behavior_tag: "Aggressive".to_string(),
            dialogue: Some("Yarr! Die!".to_string()),
        },
    ))
}

fn build(result: Result<Character, crate::error::RulesError>) -> Character {
    match result {
        Ok(character) => character,
        Err(e) => panic!("sample template rejected: {e}"),
    }
}

/// Chainmail: heavy, base AC 16, +5 max HP.
pub fn chainmail() -> ArmorItem {
    ArmorItem::new(4, "Chainmail", ArmorType::Heavy, 16)
        .with_strength_requirement(13)
        .with_stealth_penalty()
        .with_hp_bonus(5)
}

pub fn leather_armor() -> ArmorItem {
    ArmorItem::new(3, "Leather Armor", ArmorType::Light, 11)
}

pub fn longsword() -> WeaponItem {
    weapon(1, "Longsword", "1d8", WeaponDamageType::Slashing)
}

pub fn greatsword() -> WeaponItem {
    weapon(7, "Greatsword", "2d6", WeaponDamageType::Slashing)
}

pub fn healing_potion() -> PotionItem {
    PotionItem::healing(5, "Potion of Healing", 7, 50)
}

fn weapon(id: u32, name: &str, dice: &str, damage_type: WeaponDamageType) -> WeaponItem {
    match WeaponItem::new(id, name, dice, damage_type) {
        Ok(weapon) => weapon,
        Err(e) => panic!("sample weapon {name} rejected: {e}"),
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert current and max HP.
pub fn assert_hp(character: &Character, current: i32, max: i32) {
    assert_eq!(
        (character.current_hp(), character.max_hp()),
        (current, max),
        "{} HP mismatch",
        character.name
    );
}

/// Assert the core HP and mana invariants.
pub fn assert_invariants(character: &Character) {
    assert!(character.current_hp() >= 0, "{} HP below zero", character.name);
    assert!(
        character.current_hp() <= character.max_hp(),
        "{} HP above max",
        character.name
    );
    assert!(
        character.current_mana() <= character.max_mana(),
        "{} mana above max",
        character.name
    );
}
