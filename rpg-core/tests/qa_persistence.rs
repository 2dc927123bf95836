//! QA tests for save/load and persistence functionality.
//!
//! These tests verify that characters are saved as flat records and that
//! loading re-derives equipment and spell state through the catalog.
//! Run with: `cargo test -p rpg-core --test qa_persistence -- --nocapture`

use rpg_core::catalog::{Catalog, CatalogData, InMemoryCatalog};
use rpg_core::combat::apply_damage;
use rpg_core::equipment::equip;
use rpg_core::persist::{ReferenceKind, SaveId, SaveStore};
use rpg_core::spellcasting::{cast, learn_spell};
use rpg_core::testing::{sample_goblin, sample_warrior, sample_wizard};
use rpg_core::world::EntityId;
use rpg_core::RulesError;
use tempfile::TempDir;

// =============================================================================
// TEST 1: Round trip
// =============================================================================

#[test]
fn test_save_and_load_round_trip() {
    let catalog = InMemoryCatalog::standard();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = SaveStore::new(temp_dir.path());

    // Warrior with a longsword, two spells and 7/12 HP
    let mut thorin = sample_warrior();
    thorin
        .inventory
        .add_item(catalog.item_by_id(EntityId(1)).unwrap());
    equip(&mut thorin, EntityId(1)).unwrap();
    for id in [502, 503] {
        learn_spell(&mut thorin, &catalog.spell_by_id(EntityId(id)).unwrap());
    }
    apply_damage(&mut thorin, 5);
    assert_eq!((thorin.current_hp(), thorin.max_hp()), (7, 12));

    let id = SaveId::new("thorin");
    let path = store.save(&id, &thorin).expect("Failed to save");
    println!("Saved to {}", path.display());
    assert!(path.exists());
    assert_eq!(path.file_name().unwrap(), "save_thorin.json");

    let loaded = store.load(&id, &catalog).expect("Failed to load");
    assert!(loaded.is_complete());
    let restored = loaded.character;

    assert_eq!(restored.id, thorin.id);
    assert_eq!(restored.name, thorin.name);
    assert_eq!(restored.race, thorin.race);
    assert_eq!(restored.class_name, thorin.class_name);
    assert_eq!(restored.level(), thorin.level());
    assert_eq!(restored.current_hp(), 7);
    assert_eq!(restored.max_hp(), 12);
    assert_eq!(restored.ability_scores(), thorin.ability_scores());
    assert_eq!(restored.proficiencies, thorin.proficiencies);
    assert_eq!(restored.kind, thorin.kind);
    assert_eq!(
        restored.equipment().weapon.as_ref().map(|w| w.base.id),
        Some(EntityId(1))
    );
    let spell_ids: Vec<_> = restored.known_spells().iter().map(|s| s.id).collect();
    assert_eq!(spell_ids, vec![EntityId(502), EntityId(503)]);
    assert_eq!(restored.armor_class(), thorin.armor_class());
}

#[test]
fn test_armor_and_mana_survive_round_trip() {
    let catalog = InMemoryCatalog::standard();
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());

    let mut merlin = sample_wizard();
    merlin
        .inventory
        .add_item(catalog.item_by_id(EntityId(3)).unwrap());
    merlin
        .inventory
        .add_item(catalog.item_by_id(EntityId(5)).unwrap());
    equip(&mut merlin, EntityId(3)).unwrap();
    let fireball = catalog.spell_by_name("Fireball").unwrap();
    learn_spell(&mut merlin, &fireball);
    cast(&mut merlin, &fireball).unwrap();

    let id = SaveId::new("merlin");
    store.save(&id, &merlin).unwrap();
    let restored = store.load(&id, &catalog).unwrap().into_strict().unwrap();

    // Leather 11 + DEX 2
    assert_eq!(restored.armor_class(), 13);
    assert_eq!(restored.current_mana(), 5);
    assert_eq!(restored.max_mana(), 20);
    assert_eq!(restored.inventory.len(), 2);
    assert!(restored.inventory.contains(EntityId(5)));
}

#[test]
fn test_npc_round_trip() {
    let catalog = InMemoryCatalog::standard();
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());

    let goblin = sample_goblin();
    let id = SaveId::new("goblin");
    store.save(&id, &goblin).unwrap();
    let restored = store.load(&id, &catalog).unwrap().character;

    assert!(!restored.is_player());
    assert_eq!(restored.npc_details(), goblin.npc_details());
}

// =============================================================================
// TEST 2: Catalog drift
// =============================================================================

#[test]
fn test_load_uses_current_catalog_definitions() {
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());
    let original = InMemoryCatalog::standard();

    let mut thorin = sample_warrior();
    thorin
        .inventory
        .add_item(original.item_by_id(EntityId(4)).unwrap());
    equip(&mut thorin, EntityId(4)).unwrap();
    let id = SaveId::new("drift");
    store.save(&id, &thorin).unwrap();

    // Chainmail got rebalanced after the save
    let mut data: CatalogData = original.data().clone();
    for armor in &mut data.armors {
        if armor.base.id == EntityId(4) {
            armor.base_ac = 17;
            armor.hp_bonus = 3;
        }
    }
    let rebalanced = InMemoryCatalog::new(data).unwrap();

    let restored = store.load(&id, &rebalanced).unwrap().character;
    assert_eq!(restored.armor_class(), 17);
    assert_eq!(restored.max_hp(), 15);
    assert_eq!(restored.current_hp(), 12);
}

#[test]
fn test_missing_catalog_entries_are_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());
    let full = InMemoryCatalog::standard();

    let mut merlin = sample_wizard();
    merlin.inventory.add_item(full.item_by_id(EntityId(9)).unwrap());
    equip(&mut merlin, EntityId(9)).unwrap();
    learn_spell(&mut merlin, &full.spell_by_id(EntityId(501)).unwrap());
    learn_spell(&mut merlin, &full.spell_by_id(EntityId(503)).unwrap());
    let id = SaveId::new("partial");
    store.save(&id, &merlin).unwrap();

    // A catalog without the quarterstaff or Fireball
    let mut data = full.data().clone();
    data.weapons.retain(|w| w.base.id != EntityId(9));
    data.spells.retain(|s| s.id != EntityId(501));
    let trimmed = InMemoryCatalog::new(data).unwrap();

    let loaded = store.load(&id, &trimmed).unwrap();
    let kinds: Vec<_> = loaded.dropped.iter().map(|d| d.kind).collect();
    println!("Dropped: {:?}", loaded.dropped);
    // The equipped quarterstaff is reported once, by its slot
    assert_eq!(kinds, vec![ReferenceKind::Weapon, ReferenceKind::Spell]);

    let character = &loaded.character;
    assert!(character.equipment().weapon.is_none());
    assert!(!character.knows_spell(EntityId(501)));
    assert!(character.knows_spell(EntityId(503)));
    assert_eq!(character.current_mana(), 20);
}

// =============================================================================
// TEST 3: Store operations
// =============================================================================

#[test]
fn test_list_saves() {
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());

    store.save(&SaveId::new("b"), &sample_wizard()).unwrap();
    store.save(&SaveId::new("a"), &sample_warrior()).unwrap();
    std::fs::write(temp_dir.path().join("notes.txt"), "not a save").unwrap();
    std::fs::write(temp_dir.path().join("broken.json"), "{").unwrap();

    let saves = store.list().unwrap();
    let names: Vec<_> = saves.iter().map(|s| s.character_name.as_str()).collect();
    assert_eq!(names, vec!["Merlin", "Thorin"]);
    assert_eq!(saves[0].class_name, "Wizard");
    assert_eq!(saves[0].level, 1);
    assert_eq!(saves[0].locator, store.path_for(&SaveId::new("b")));
}

#[test]
fn test_list_missing_directory_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path().join("never-created"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_overwrite_and_delete() {
    let catalog = InMemoryCatalog::standard();
    let temp_dir = TempDir::new().unwrap();
    let store = SaveStore::new(temp_dir.path());
    let id = SaveId::new("slot");

    let mut thorin = sample_warrior();
    store.save(&id, &thorin).unwrap();
    apply_damage(&mut thorin, 4);
    store.save(&id, &thorin).unwrap();

    assert_eq!(store.list().unwrap().len(), 1);
    let restored = store.load(&id, &catalog).unwrap().character;
    assert_eq!(restored.current_hp(), 8);

    assert!(store.delete(&id).unwrap());
    assert!(!store.delete(&id).unwrap());
    let missing = store.load(&id, &catalog);
    assert!(matches!(
        missing,
        Err(RulesError::NotFound { kind: "save", .. })
    ));
}
