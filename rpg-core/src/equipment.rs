//! Equipment side effects: equipping and unequipping gear, armor class,
//! potion consumption and healing.
//!
//! Every entry point validates first and mutates second, so a rejected
//! call leaves the character untouched.

use crate::error::RulesError;
use crate::items::{ArmorItem, Item};
use crate::world::{Ability, AbilityScores, Character, EntityId, EquipSlot};
use tracing::debug;

/// Armor class when nothing is worn, before Dexterity.
pub const UNARMORED_BASE_AC: i32 = 10;

/// Armor class for the given scores and (optional) worn armor.
pub fn armor_class_for(scores: &AbilityScores, armor: Option<&ArmorItem>) -> i32 {
    let dex_mod = scores.modifier(Ability::Dexterity);
    match armor {
        None => UNARMORED_BASE_AC + dex_mod,
        Some(armor) if armor.dex_bonus_applies => {
            let dex_bonus = match armor.max_dex_bonus {
                Some(max) => dex_mod.min(max),
                None => dex_mod,
            };
            armor.base_ac + dex_bonus
        }
        Some(armor) => armor.base_ac,
    }
}

/// What changed when an item was equipped.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipOutcome {
    pub slot: EquipSlot,
    pub item_name: String,
    /// Whatever was in the slot before. It stays in the inventory.
    pub replaced: Option<Item>,
    pub max_hp: i32,
    pub armor_class: i32,
}

/// Equip an item from the character's inventory.
pub fn equip(character: &mut Character, item_id: EntityId) -> Result<EquipOutcome, RulesError> {
    let item = character
        .inventory
        .find_item(item_id)
        .cloned()
        .ok_or_else(|| RulesError::ItemNotOwned {
            character: character.name.clone(),
            item_id,
        })?;

    let item_name = item.name().to_string();
    let (slot, replaced) = match item {
        Item::Weapon(weapon) => {
            let replaced = character.equipment.weapon.replace(weapon).map(Item::Weapon);
            (EquipSlot::Weapon, replaced)
        }
        Item::Armor(armor) => {
            let old_bonus = character.equipment.hp_bonus();
            let new_max = character.hit_points.maximum() - old_bonus + armor.hp_bonus;
            if new_max < 1 {
                return Err(RulesError::MaxHpTooLow {
                    character: character.name.clone(),
                    item: item_name,
                    max_hp: new_max,
                });
            }
            let replaced = character.equipment.armor.replace(armor).map(Item::Armor);
            character.hit_points.set_maximum(new_max);
            character.refresh_armor_class();
            (EquipSlot::Armor, replaced)
        }
        Item::Potion(_) => return Err(RulesError::NotEquippable(item_name)),
    };

    debug!(
        character = %character.name,
        item = %item_name,
        %slot,
        max_hp = character.max_hp(),
        armor_class = character.armor_class(),
        "Equipped item"
    );

    Ok(EquipOutcome {
        slot,
        item_name,
        replaced,
        max_hp: character.max_hp(),
        armor_class: character.armor_class(),
    })
}

/// Clear a slot, reversing whatever the item granted. The item stays in
/// the inventory.
pub fn unequip(character: &mut Character, slot: EquipSlot) -> Option<Item> {
    let removed = match slot {
        EquipSlot::Weapon => character.equipment.weapon.take().map(Item::Weapon),
        EquipSlot::Armor => {
            let armor = character.equipment.armor.take()?;
            let new_max = character.hit_points.maximum() - armor.hp_bonus;
            character.hit_points.set_maximum(new_max);
            character.refresh_armor_class();
            Some(Item::Armor(armor))
        }
    };

    if let Some(ref item) = removed {
        debug!(character = %character.name, item = %item.name(), %slot, "Unequipped item");
    }
    removed
}

/// Heal up to max HP. Returns the amount actually restored.
pub fn heal(character: &mut Character, amount: i32) -> i32 {
    let healed = character.hit_points.heal(amount);
    debug!(
        character = %character.name,
        healed,
        current_hp = character.current_hp(),
        "Healed"
    );
    healed
}

/// Result of drinking a potion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub item_name: String,
    pub healed: i32,
    pub current_hp: i32,
}

/// Drink a potion from the inventory, applying its healing and removing it.
pub fn consume(character: &mut Character, item_id: EntityId) -> Result<ConsumeOutcome, RulesError> {
    let potion = match character.inventory.find_item(item_id) {
        Some(Item::Potion(potion)) => potion.clone(),
        Some(other) => return Err(RulesError::NotConsumable(other.name().to_string())),
        None => {
            return Err(RulesError::ItemNotOwned {
                character: character.name.clone(),
                item_id,
            })
        }
    };

    let healed = match potion.heal_amount {
        Some(amount) => heal(character, amount),
        None => 0,
    };
    character.inventory.remove_item(item_id);

    debug!(
        character = %character.name,
        potion = %potion.base.name,
        effect = %potion.effect_tag,
        "Consumed potion"
    );

    Ok(ConsumeOutcome {
        item_name: potion.base.name,
        healed,
        current_hp: character.current_hp(),
    })
}
