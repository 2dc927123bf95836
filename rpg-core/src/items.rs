//! Item types and the standard item set.
//!
//! Items are immutable once built. A character holds copies in its
//! inventory and equipment slots and never edits them.

use crate::dice::{DiceError, DiceSpec, DieType};
use crate::world::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fields every item carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub coin_value: u32,
}

impl ItemInfo {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            name: name.into(),
            description: String::new(),
            weight: 0.0,
            coin_value: 0,
        }
    }
}

/// Weapon damage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponDamageType {
    Slashing,
    Piercing,
    Bludgeoning,
}

impl WeaponDamageType {
    pub fn name(&self) -> &'static str {
        match self {
            WeaponDamageType::Slashing => "slashing",
            WeaponDamageType::Piercing => "piercing",
            WeaponDamageType::Bludgeoning => "bludgeoning",
        }
    }
}

/// Reach of a weapon. There is no grid, so this is only a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeCategory {
    #[default]
    Melee,
    Ranged,
}

/// A weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponItem {
    #[serde(flatten)]
    pub base: ItemInfo,
    pub damage_type: WeaponDamageType,
    pub dice: DiceSpec,
    #[serde(default)]
    pub properties: BTreeSet<String>,
    #[serde(default)]
    pub range: RangeCategory,
}

impl WeaponItem {
    /// Build a weapon; the damage spec must be valid `NdM`.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        dice: &str,
        damage_type: WeaponDamageType,
    ) -> Result<Self, DiceError> {
        Ok(Self {
            base: ItemInfo::new(id, name),
            damage_type,
            dice: DiceSpec::parse(dice)?,
            properties: BTreeSet::new(),
            range: RangeCategory::Melee,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.base.description = description.into();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.base.weight = weight;
        self
    }

    pub fn with_value(mut self, coin_value: u32) -> Self {
        self.base.coin_value = coin_value;
        self
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn ranged(mut self) -> Self {
        self.range = RangeCategory::Ranged;
        self
    }

    pub fn is_ranged(&self) -> bool {
        self.range == RangeCategory::Ranged
    }
}

/// Armor weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorType {
    Light,
    Medium,
    Heavy,
}

/// Armor. `hp_bonus` is added to max HP while worn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorItem {
    #[serde(flatten)]
    pub base: ItemInfo,
    pub armor_type: ArmorType,
    pub base_ac: i32,
    pub dex_bonus_applies: bool,
    #[serde(default)]
    pub max_dex_bonus: Option<i32>,
    #[serde(default)]
    pub stealth_penalty: bool,
    #[serde(default)]
    pub strength_requirement: i32,
    #[serde(default)]
    pub hp_bonus: i32,
}

impl ArmorItem {
    /// Build armor. Light armor takes the full Dexterity bonus, medium
    /// caps it at +2 and heavy ignores it; the builders below override.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        armor_type: ArmorType,
        base_ac: i32,
    ) -> Self {
        let (dex_bonus_applies, max_dex_bonus) = match armor_type {
            ArmorType::Light => (true, None),
            ArmorType::Medium => (true, Some(2)),
            ArmorType::Heavy => (false, None),
        };
        Self {
            base: ItemInfo::new(id, name),
            armor_type,
            base_ac,
            dex_bonus_applies,
            max_dex_bonus,
            stealth_penalty: false,
            strength_requirement: 0,
            hp_bonus: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.base.description = description.into();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.base.weight = weight;
        self
    }

    pub fn with_value(mut self, coin_value: u32) -> Self {
        self.base.coin_value = coin_value;
        self
    }

    pub fn with_strength_requirement(mut self, str_req: i32) -> Self {
        self.strength_requirement = str_req;
        self
    }

    pub fn with_stealth_penalty(mut self) -> Self {
        self.stealth_penalty = true;
        self
    }

    pub fn with_dex_bonus(mut self, applies: bool, max: Option<i32>) -> Self {
        self.dex_bonus_applies = applies;
        self.max_dex_bonus = max;
        self
    }

    pub fn with_hp_bonus(mut self, hp_bonus: i32) -> Self {
        self.hp_bonus = hp_bonus;
        self
    }
}

/// A one-shot consumable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotionItem {
    #[serde(flatten)]
    pub base: ItemInfo,
    pub effect_tag: String,
    pub duration_tag: String,
    #[serde(default)]
    pub heal_amount: Option<i32>,
}

impl PotionItem {
    pub fn healing(
        id: u32,
        name: impl Into<String>,
        heal_amount: i32,
        coin_value: u32,
    ) -> Self {
        Self {
            base: ItemInfo {
                id: EntityId(id),
                name: name.into(),
                description: "A magical potion that restores health when consumed.".to_string(),
                weight: 0.5,
                coin_value,
            },
            effect_tag: "Healing".to_string(),
            duration_tag: "Instantaneous".to_string(),
            heal_amount: Some(heal_amount),
        }
    }
}

/// Any item a character can own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum Item {
    Weapon(WeaponItem),
    Armor(ArmorItem),
    Potion(PotionItem),
}

impl Item {
    pub fn info(&self) -> &ItemInfo {
        match self {
            Item::Weapon(w) => &w.base,
            Item::Armor(a) => &a.base,
            Item::Potion(p) => &p.base,
        }
    }

    pub fn id(&self) -> EntityId {
        self.info().id
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }
}

impl From<WeaponItem> for Item {
    fn from(weapon: WeaponItem) -> Self {
        Item::Weapon(weapon)
    }
}

impl From<ArmorItem> for Item {
    fn from(armor: ArmorItem) -> Self {
        Item::Armor(armor)
    }
}

impl From<PotionItem> for Item {
    fn from(potion: PotionItem) -> Self {
        Item::Potion(potion)
    }
}

// ============================================================================
// Standard Items
// ============================================================================

fn weapon(
    id: u32,
    name: &str,
    count: u32,
    die_type: DieType,
    damage_type: WeaponDamageType,
) -> WeaponItem {
    WeaponItem {
        base: ItemInfo::new(id, name),
        damage_type,
        dice: DiceSpec::new(count, die_type),
        properties: BTreeSet::new(),
        range: RangeCategory::Melee,
    }
}

lazy_static::lazy_static! {
    /// Standard weapons.
    pub static ref STANDARD_WEAPONS: Vec<WeaponItem> = vec![
        weapon(1, "Longsword", 1, DieType::D8, WeaponDamageType::Slashing)
            .with_description("A versatile blade.")
            .with_weight(3.0)
            .with_value(15)
            .with_properties(["Versatile (1d10)"]),
        weapon(2, "Shortbow", 1, DieType::D6, WeaponDamageType::Piercing)
            .with_description("A light, quick bow.")
            .with_weight(2.0)
            .with_value(25)
            .with_properties(["Two-Handed", "Ammunition (80/320)"])
            .ranged(),
        weapon(6, "Dagger", 1, DieType::D4, WeaponDamageType::Piercing)
            .with_weight(1.0)
            .with_value(2)
            .with_properties(["Finesse", "Light", "Thrown"]),
        weapon(7, "Greatsword", 2, DieType::D6, WeaponDamageType::Slashing)
            .with_weight(6.0)
            .with_value(50)
            .with_properties(["Heavy", "Two-Handed"]),
        weapon(8, "Warhammer", 1, DieType::D8, WeaponDamageType::Bludgeoning)
            .with_weight(2.0)
            .with_value(15)
            .with_properties(["Versatile (1d10)"]),
        weapon(9, "Quarterstaff", 1, DieType::D6, WeaponDamageType::Bludgeoning)
            .with_weight(4.0)
            .with_value(1)
            .with_properties(["Versatile (1d8)"]),
    ];

    /// Standard armor.
    pub static ref STANDARD_ARMORS: Vec<ArmorItem> = vec![
        ArmorItem::new(3, "Leather Armor", ArmorType::Light, 11)
            .with_description("Hardened leather breastplate.")
            .with_weight(10.0)
            .with_value(10),
        ArmorItem::new(4, "Chainmail", ArmorType::Heavy, 16)
            .with_description("Interlocking metal rings.")
            .with_weight(55.0)
            .with_value(75)
            .with_strength_requirement(13)
            .with_stealth_penalty()
            .with_hp_bonus(5),
        ArmorItem::new(10, "Scale Mail", ArmorType::Medium, 14)
            .with_weight(45.0)
            .with_value(50)
            .with_stealth_penalty()
            .with_hp_bonus(2),
    ];

    /// Standard potions.
    pub static ref STANDARD_POTIONS: Vec<PotionItem> = vec![
        PotionItem::healing(5, "Potion of Healing", 7, 50),
        PotionItem::healing(11, "Potion of Greater Healing", 14, 150),
    ];
}
