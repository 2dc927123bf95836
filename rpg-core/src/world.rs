//! Character types: identity, abilities, hit points, mana, equipment
//! slots, inventory and the player/NPC variants.

use crate::error::RulesError;
use crate::items::{ArmorItem, Item, WeaponItem};
use crate::spells::Spell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// ID Types
// ============================================================================

/// Catalog or character identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

fn default_score() -> i32 {
    10
}

/// Ability scores container.
///
/// Deserializes from either full names or abbreviations; a missing ability
/// defaults to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    #[serde(default = "default_score", alias = "STR")]
    pub strength: i32,
    #[serde(default = "default_score", alias = "DEX")]
    pub dexterity: i32,
    #[serde(default = "default_score", alias = "CON")]
    pub constitution: i32,
    #[serde(default = "default_score", alias = "INT")]
    pub intelligence: i32,
    #[serde(default = "default_score", alias = "WIS")]
    pub wisdom: i32,
    #[serde(default = "default_score", alias = "CHA")]
    pub charisma: i32,
}

impl AbilityScores {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        // Floor division: 8-9 = -1, 10-11 = 0, 12-13 = +1
        (self.get(ability) - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Hit Points and Mana
// ============================================================================

/// Hit points tracking. Keeps `0 <= current <= maximum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitPoints {
    current: i32,
    maximum: i32,
}

/// Result of taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageResult {
    pub damage_taken: i32,
    pub dropped_to_zero: bool,
}

impl HitPoints {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum.max(0),
            maximum,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageResult {
        let amount = amount.max(0);
        self.current -= amount;
        if self.current <= 0 {
            self.current = 0;
        }
        DamageResult {
            damage_taken: amount,
            dropped_to_zero: self.current == 0,
        }
    }

    /// Heal up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.current = (self.current + amount.max(0)).min(self.maximum).max(0);
        self.current - old
    }

    /// Replace the maximum, clamping the current value into range.
    pub(crate) fn set_maximum(&mut self, maximum: i32) {
        self.maximum = maximum;
        self.current = self.current.min(maximum).max(0);
    }

    /// Set the current value directly, clamped into `0..=maximum`.
    pub(crate) fn set_current(&mut self, current: i32) {
        self.current = current.min(self.maximum).max(0);
    }

    pub fn is_zero(&self) -> bool {
        self.current == 0
    }
}

/// Mana pool. Keeps `current <= maximum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManaPool {
    current: u32,
    maximum: u32,
}

impl ManaPool {
    pub fn new(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Spend mana if enough is available. Returns false without mutating
    /// otherwise.
    pub(crate) fn spend(&mut self, cost: u32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Restore up to the maximum. Returns the amount actually restored.
    pub(crate) fn restore(&mut self, amount: u32) -> u32 {
        let old = self.current;
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current - old
    }

    pub(crate) fn set_current(&mut self, current: u32) {
        self.current = current.min(self.maximum);
    }
}

// ============================================================================
// Equipment and Inventory
// ============================================================================

/// The two fixed equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipSlot::Weapon => write!(f, "weapon"),
            EquipSlot::Armor => write!(f, "armor"),
        }
    }
}

/// What a character is currently wielding and wearing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    pub weapon: Option<WeaponItem>,
    pub armor: Option<ArmorItem>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Max HP granted by equipped gear.
    pub fn hp_bonus(&self) -> i32 {
        self.armor.as_ref().map(|a| a.hp_bonus).unwrap_or(0)
    }
}

/// Items a character owns, in acquisition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove the first item with this id.
    pub fn remove_item(&mut self, id: EntityId) -> Option<Item> {
        let idx = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn find_item(&self, id: EntityId) -> Option<&Item> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Find an item by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        let name_lower = name.to_lowercase();
        self.items
            .iter()
            .find(|i| i.name().to_lowercase() == name_lower)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.find_item(id).is_some()
    }

    pub fn total_weight(&self) -> f32 {
        self.items.iter().map(|i| i.info().weight).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Templates and Variants
// ============================================================================

/// Catalog-provided baseline for a new character of some class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTemplate {
    pub max_hp: i32,
    pub attributes: AbilityScores,
    pub proficiencies: Vec<String>,
    pub race: String,
    #[serde(default)]
    pub max_mana: Option<u32>,
}

impl ClassTemplate {
    /// Parse a template from JSON. Missing required fields are an error.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let template: ClassTemplate = serde_json::from_str(json)
            .map_err(|e| RulesError::MalformedTemplate(e.to_string()))?;
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_hp < 1 {
            return Err(RulesError::MalformedTemplate(format!(
                "max_hp must be at least 1, got {}",
                self.max_hp
            )));
        }
        if self.race.trim().is_empty() {
            return Err(RulesError::MalformedTemplate("race is empty".to_string()));
        }
        Ok(())
    }
}

/// Player-only fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDetails {
    pub experience: u32,
    pub alignment: String,
    pub player_name: String,
}

impl PlayerDetails {
    pub fn new(alignment: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            experience: 0,
            alignment: alignment.into(),
            player_name: player_name.into(),
        }
    }
}

/// NPC-only fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcDetails {
    pub npc_type: String,
    pub behavior_tag: String,
    #[serde(default)]
    pub dialogue: Option<String>,
}

/// Player or NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CharacterKind {
    Player(PlayerDetails),
    Npc(NpcDetails),
}

// ============================================================================
// Character
// ============================================================================

/// A player character or NPC.
///
/// Derived state (armor class, equipment side effects) is only reachable
/// through the rules modules so it can't drift from the equipped gear.
#[derive(Debug, Clone)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub race: String,
    pub class_name: String,
    pub proficiencies: BTreeSet<String>,
    pub inventory: Inventory,
    pub kind: CharacterKind,

    level: u8,
    ability_scores: AbilityScores,
    pub(crate) hit_points: HitPoints,
    pub(crate) mana: ManaPool,
    armor_class: i32,
    pub(crate) equipment: Equipment,
    pub(crate) known_spells: Vec<Spell>,
}

impl Character {
    /// Build a level 1 character from a class template.
    pub fn from_template(
        id: EntityId,
        name: impl Into<String>,
        class_name: impl Into<String>,
        template: &ClassTemplate,
        kind: CharacterKind,
    ) -> Result<Self, RulesError> {
        template.validate()?;
        Ok(Self::from_parts(
            id,
            name.into(),
            template.race.clone(),
            class_name.into(),
            1,
            template.attributes,
            template.proficiencies.iter().cloned().collect(),
            template.max_hp,
            template.max_mana.unwrap_or(0),
            kind,
        ))
    }

    /// Build a level 1 player from a class template.
    pub fn player(
        id: EntityId,
        name: impl Into<String>,
        class_name: impl Into<String>,
        template: &ClassTemplate,
        details: PlayerDetails,
    ) -> Result<Self, RulesError> {
        Self::from_template(id, name, class_name, template, CharacterKind::Player(details))
    }

    /// Build a level 1 NPC from a class template.
    pub fn npc(
        id: EntityId,
        name: impl Into<String>,
        class_name: impl Into<String>,
        template: &ClassTemplate,
        details: NpcDetails,
    ) -> Result<Self, RulesError> {
        Self::from_template(id, name, class_name, template, CharacterKind::Npc(details))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: EntityId,
        name: String,
        race: String,
        class_name: String,
        level: u8,
        ability_scores: AbilityScores,
        proficiencies: BTreeSet<String>,
        max_hp: i32,
        max_mana: u32,
        kind: CharacterKind,
    ) -> Self {
        let mut character = Self {
            id,
            name,
            race,
            class_name,
            proficiencies,
            inventory: Inventory::default(),
            kind,
            level: level.max(1),
            ability_scores,
            hit_points: HitPoints::new(max_hp),
            mana: ManaPool::new(max_mana),
            armor_class: 0,
            equipment: Equipment::new(),
            known_spells: Vec::new(),
        };
        character.refresh_armor_class();
        character
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: u8) {
        self.level = level.max(1);
    }

    pub fn ability_scores(&self) -> &AbilityScores {
        &self.ability_scores
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.ability_scores.modifier(ability)
    }

    /// Change one ability score. Armor class follows Dexterity.
    pub fn set_ability_score(&mut self, ability: Ability, score: i32) {
        self.ability_scores.set(ability, score);
        self.refresh_armor_class();
    }

    pub fn hit_points(&self) -> HitPoints {
        self.hit_points
    }

    pub fn current_hp(&self) -> i32 {
        self.hit_points.current()
    }

    pub fn max_hp(&self) -> i32 {
        self.hit_points.maximum()
    }

    /// Max HP without equipment bonuses.
    pub fn base_max_hp(&self) -> i32 {
        self.hit_points.maximum() - self.equipment.hp_bonus()
    }

    pub fn current_mana(&self) -> u32 {
        self.mana.current()
    }

    pub fn max_mana(&self) -> u32 {
        self.mana.maximum()
    }

    pub fn armor_class(&self) -> i32 {
        self.armor_class
    }

    pub(crate) fn refresh_armor_class(&mut self) {
        self.armor_class =
            crate::equipment::armor_class_for(&self.ability_scores, self.equipment.armor.as_ref());
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn known_spells(&self) -> &[Spell] {
        &self.known_spells
    }

    pub fn knows_spell(&self, id: EntityId) -> bool {
        self.known_spells.iter().any(|s| s.id == id)
    }

    /// Zero hit points. Nothing in the core blocks further actions on a
    /// dead character; callers interpret this.
    pub fn is_dead(&self) -> bool {
        self.hit_points.is_zero()
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CharacterKind::Player(_))
    }

    pub fn player_details(&self) -> Option<&PlayerDetails> {
        match &self.kind {
            CharacterKind::Player(details) => Some(details),
            CharacterKind::Npc(_) => None,
        }
    }

    pub fn npc_details(&self) -> Option<&NpcDetails> {
        match &self.kind {
            CharacterKind::Npc(details) => Some(details),
            CharacterKind::Player(_) => None,
        }
    }

    pub fn experience(&self) -> Option<u32> {
        self.player_details().map(|p| p.experience)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} {} Lv {} HP: {}/{} MP: {}/{} AC: {}",
            self.name,
            self.id,
            self.race,
            self.class_name,
            self.level,
            self.current_hp(),
            self.max_hp(),
            self.current_mana(),
            self.max_mana(),
            self.armor_class
        )
    }
}
