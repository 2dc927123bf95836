//! Catalog of class templates, items, spells and enemies.
//!
//! The rules never reach into storage directly; they ask a [`Catalog`].
//! [`InMemoryCatalog`] covers tests, the bundled content and anything that
//! can be loaded from a JSON document.

use crate::dice::RandomSource;
use crate::equipment;
use crate::error::RulesError;
use crate::items::{
    ArmorItem, Item, PotionItem, WeaponItem, STANDARD_ARMORS, STANDARD_POTIONS, STANDARD_WEAPONS,
};
use crate::persist::PersistError;
use crate::spells::{Spell, STANDARD_SPELLS};
use crate::world::{AbilityScores, Character, ClassTemplate, EntityId, NpcDetails};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Read access to game content. Misses return `None`.
pub trait Catalog {
    /// Class template by name (case-insensitive).
    fn class_template(&self, name: &str) -> Option<ClassTemplate>;

    fn weapon_by_id(&self, id: EntityId) -> Option<WeaponItem>;

    fn armor_by_id(&self, id: EntityId) -> Option<ArmorItem>;

    fn potion_by_id(&self, id: EntityId) -> Option<PotionItem>;

    fn spell_by_id(&self, id: EntityId) -> Option<Spell>;

    /// Spell by name (case-insensitive).
    fn spell_by_name(&self, name: &str) -> Option<Spell> {
        self.all_spells()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Any item with this id.
    fn item_by_id(&self, id: EntityId) -> Option<Item> {
        self.weapon_by_id(id)
            .map(Item::Weapon)
            .or_else(|| self.armor_by_id(id).map(Item::Armor))
            .or_else(|| self.potion_by_id(id).map(Item::Potion))
    }

    fn all_weapons(&self) -> Vec<WeaponItem>;

    fn all_armors(&self) -> Vec<ArmorItem>;

    fn all_spells(&self) -> Vec<Spell>;

    /// A freshly built enemy, armed if its entry names a weapon.
    fn random_enemy(&self, rng: &mut dyn RandomSource) -> Option<Character>;
}

/// An enemy entry: a class template plus NPC details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: EntityId,
    pub name: String,
    pub class_name: String,
    pub template: ClassTemplate,
    pub npc: NpcDetails,
    #[serde(default)]
    pub weapon_id: Option<EntityId>,
}

/// Serialized catalog content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub classes: BTreeMap<String, ClassTemplate>,
    #[serde(default)]
    pub weapons: Vec<WeaponItem>,
    #[serde(default)]
    pub armors: Vec<ArmorItem>,
    #[serde(default)]
    pub potions: Vec<PotionItem>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub enemies: Vec<EnemyTemplate>,
}

impl CatalogData {
    fn validate(&self) -> Result<(), RulesError> {
        for (name, template) in &self.classes {
            template
                .validate()
                .map_err(|e| RulesError::MalformedTemplate(format!("class {name}: {e}")))?;
        }
        for armor in &self.armors {
            if armor.hp_bonus < 0 {
                return Err(RulesError::MalformedTemplate(format!(
                    "armor {}: negative hp_bonus {}",
                    armor.base.name, armor.hp_bonus
                )));
            }
        }
        for enemy in &self.enemies {
            enemy
                .template
                .validate()
                .map_err(|e| RulesError::MalformedTemplate(format!("enemy {}: {e}", enemy.name)))?;
        }
        Ok(())
    }
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    data: CatalogData,
}

impl InMemoryCatalog {
    /// Build from content, validating every template.
    pub fn new(data: CatalogData) -> Result<Self, RulesError> {
        data.validate()?;
        Ok(Self { data })
    }

    /// Parse a JSON catalog document.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let data: CatalogData = serde_json::from_str(json).map_err(PersistError::from)?;
        Self::new(data)
    }

    /// Read a JSON catalog document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(PersistError::from)?;
        debug!(path = %path.display(), "Loading catalog");
        Self::from_json(&json)
    }

    /// The bundled content: two classes, the standard items and spells,
    /// and a goblin and a merchant to meet.
    pub fn standard() -> Self {
        let mut classes = BTreeMap::new();
        classes.insert(
            "Warrior".to_string(),
            ClassTemplate {
                max_hp: 12,
                attributes: AbilityScores::new(16, 10, 14, 8, 12, 9),
                proficiencies: vec![
                    "Athletics".to_string(),
                    "Heavy Armor".to_string(),
                    "Martial Weapons".to_string(),
                ],
                race: "Mountain Dwarf".to_string(),
                max_mana: None,
            },
        );
        classes.insert(
            "Wizard".to_string(),
            ClassTemplate {
                max_hp: 8,
                attributes: AbilityScores::new(8, 14, 12, 16, 13, 10),
                proficiencies: vec!["Arcana".to_string(), "History".to_string()],
                race: "High Elf".to_string(),
                max_mana: Some(20),
            },
        );

        let enemies = vec![
            EnemyTemplate {
                id: EntityId(101),
                name: "Snaga".to_string(),
                class_name: "Goblin".to_string(),
                template: ClassTemplate {
                    max_hp: 7,
                    attributes: AbilityScores::new(8, 14, 10, 10, 8, 8),
                    proficiencies: vec!["Stealth".to_string()],
                    race: "Goblin".to_string(),
                    max_mana: None,
                },
                npc: NpcDetails {
                    npc_type: "Monster".to_string(),
                    behavior_tag: "Aggressive".to_string(),
                    dialogue: Some("Yarr! Die!".to_string()),
                },
                weapon_id: Some(EntityId(2)),
            },
            EnemyTemplate {
                id: EntityId(102),
                name: "Bartholomew".to_string(),
                class_name: "Merchant".to_string(),
                template: ClassTemplate {
                    max_hp: 9,
                    attributes: AbilityScores::new(10, 10, 10, 12, 12, 15),
                    proficiencies: vec!["Persuasion".to_string()],
                    race: "Human".to_string(),
                    max_mana: None,
                },
                npc: NpcDetails {
                    npc_type: "Merchant".to_string(),
                    behavior_tag: "Friendly".to_string(),
                    dialogue: Some("Fine wares, traveler!".to_string()),
                },
                weapon_id: Some(EntityId(6)),
            },
        ];

        Self {
            data: CatalogData {
                classes,
                weapons: STANDARD_WEAPONS.clone(),
                armors: STANDARD_ARMORS.clone(),
                potions: STANDARD_POTIONS.clone(),
                spells: STANDARD_SPELLS.clone(),
                enemies,
            },
        }
    }

    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.data.classes.keys().map(String::as_str)
    }

    fn build_enemy(&self, entry: &EnemyTemplate) -> Option<Character> {
        let mut enemy = match Character::npc(
            entry.id,
            entry.name.clone(),
            entry.class_name.clone(),
            &entry.template,
            entry.npc.clone(),
        ) {
            Ok(enemy) => enemy,
            Err(e) => {
                warn!(enemy = %entry.name, error = %e, "Skipping malformed enemy");
                return None;
            }
        };

        if let Some(weapon_id) = entry.weapon_id {
            match self.weapon_by_id(weapon_id) {
                Some(weapon) => {
                    enemy.inventory.add_item(weapon.into());
                    if let Err(e) = equipment::equip(&mut enemy, weapon_id) {
                        warn!(enemy = %entry.name, error = %e, "Enemy could not equip weapon");
                    }
                }
                None => warn!(enemy = %entry.name, %weapon_id, "Enemy weapon not in catalog"),
            }
        }
        Some(enemy)
    }
}

impl Catalog for InMemoryCatalog {
    fn class_template(&self, name: &str) -> Option<ClassTemplate> {
        self.data
            .classes
            .iter()
            .find(|(class, _)| class.eq_ignore_ascii_case(name))
            .map(|(_, template)| template.clone())
    }

    fn weapon_by_id(&self, id: EntityId) -> Option<WeaponItem> {
        self.data.weapons.iter().find(|w| w.base.id == id).cloned()
    }

    fn armor_by_id(&self, id: EntityId) -> Option<ArmorItem> {
        self.data.armors.iter().find(|a| a.base.id == id).cloned()
    }

    fn potion_by_id(&self, id: EntityId) -> Option<PotionItem> {
        self.data.potions.iter().find(|p| p.base.id == id).cloned()
    }

    fn spell_by_id(&self, id: EntityId) -> Option<Spell> {
        self.data.spells.iter().find(|s| s.id == id).cloned()
    }

    fn all_weapons(&self) -> Vec<WeaponItem> {
        self.data.weapons.clone()
    }

    fn all_armors(&self) -> Vec<ArmorItem> {
        self.data.armors.clone()
    }

    fn all_spells(&self) -> Vec<Spell> {
        self.data.spells.clone()
    }

    fn random_enemy(&self, rng: &mut dyn RandomSource) -> Option<Character> {
        if self.data.enemies.is_empty() {
            return None;
        }
        let index = rng.pick_index(self.data.enemies.len());
        let entry = self.data.enemies.get(index)?;
        self.build_enemy(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ArmorType;
    use crate::testing::ScriptedDice;

    #[test]
    fn test_class_lookup_is_case_insensitive() {
        let catalog = InMemoryCatalog::standard();
        let warrior = catalog.class_template("warrior").unwrap();
        assert_eq!(warrior.max_hp, 12);
        assert_eq!(warrior.attributes.strength, 16);
        assert!(catalog.class_template("WIZARD").unwrap().max_mana.is_some());
        assert!(catalog.class_template("Bard").is_none());
    }

    #[test]
    fn test_item_lookup() {
        let catalog = InMemoryCatalog::standard();
        assert!(matches!(catalog.item_by_id(EntityId(1)), Some(Item::Weapon(_))));
        assert!(matches!(catalog.item_by_id(EntityId(4)), Some(Item::Armor(_))));
        assert!(matches!(catalog.item_by_id(EntityId(5)), Some(Item::Potion(_))));
        assert!(catalog.item_by_id(EntityId(999)).is_none());
        assert_eq!(
            catalog.spell_by_name("fireball").map(|s| s.id),
            Some(EntityId(501))
        );
    }

    #[test]
    fn test_random_enemy_is_armed() {
        let catalog = InMemoryCatalog::standard();
        let mut dice = ScriptedDice::default().with_indices([0, 1]);

        let goblin = catalog.random_enemy(&mut dice).unwrap();
        assert_eq!(goblin.name, "Snaga");
        assert!(!goblin.is_player());
        assert_eq!(goblin.armor_class(), 12);
        let bow = goblin.equipment().weapon.as_ref().unwrap();
        assert_eq!(bow.base.name, "Shortbow");
        assert!(goblin.inventory.contains(bow.base.id));

        let merchant = catalog.random_enemy(&mut dice).unwrap();
        assert_eq!(merchant.name, "Bartholomew");
    }

    #[test]
    fn test_empty_catalog_has_no_enemies() {
        let catalog = InMemoryCatalog::default();
        let mut dice = ScriptedDice::default();
        assert!(catalog.random_enemy(&mut dice).is_none());
        assert!(catalog.all_weapons().is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "classes": {
                "Ranger": {"max_hp": 10, "attributes": {"DEX": 16}, "proficiencies": ["Survival"], "race": "Wood Elf"}
            },
            "weapons": [
                {"id": 30, "name": "Longbow", "damage_type": "Piercing", "dice": "1d8", "range": "Ranged"}
            ]
        }"#;
        let catalog = InMemoryCatalog::from_json(json).unwrap();
        let ranger = catalog.class_template("ranger").unwrap();
        assert_eq!(ranger.attributes.dexterity, 16);
        assert_eq!(ranger.attributes.strength, 10);
        assert!(catalog.weapon_by_id(EntityId(30)).unwrap().is_ranged());
    }

    #[test]
    fn test_from_json_rejects_bad_content() {
        let bad_dice = r#"{"weapons": [{"id": 1, "name": "X", "damage_type": "Slashing", "dice": "1d7"}]}"#;
        assert!(InMemoryCatalog::from_json(bad_dice).is_err());

        let bad_template = r#"{"classes": {"Ghost": {"max_hp": 0, "attributes": {}, "proficiencies": [], "race": "Spirit"}}}"#;
        assert!(matches!(
            InMemoryCatalog::from_json(bad_template),
            Err(RulesError::MalformedTemplate(_))
        ));

        let missing_keys = r#"{"classes": {"Ghost": {"max_hp": 5, "race": "Spirit"}}}"#;
        assert!(InMemoryCatalog::from_json(missing_keys).is_err());
    }

    #[test]
    fn test_negative_armor_hp_bonus_is_rejected() {
        let mut data = InMemoryCatalog::standard().data().clone();
        data.armors
            .push(ArmorItem::new(40, "Cursed Plate", ArmorType::Heavy, 12).with_hp_bonus(-20));
        assert!(matches!(
            InMemoryCatalog::new(data),
            Err(RulesError::MalformedTemplate(_))
        ));
    }
}
