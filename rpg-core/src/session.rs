//! GameSession - one live character plus everything the rules need.
//!
//! The session owns the character, the catalog, a random source and a
//! save store, and forwards each action to the matching rules module.

use crate::catalog::{Catalog, InMemoryCatalog};
use crate::combat::{self, AttackOutcome};
use crate::equipment::{self, ConsumeOutcome, EquipOutcome};
use crate::error::RulesError;
use crate::items::Item;
use crate::persist::{DroppedReference, SaveId, SaveStore, SaveSummary};
use crate::progression::{self, ExperienceGain};
use crate::spellcasting::{self, CastOutcome};
use crate::world::{Character, EntityId, EquipSlot, PlayerDetails};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable naming the save directory.
pub const SAVE_DIR_ENV: &str = "RPG_SAVE_DIR";
/// Environment variable holding a numeric RNG seed.
pub const SEED_ENV: &str = "RPG_SEED";

const DEFAULT_SAVE_DIR: &str = "saves";

/// Configuration for a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Where save files live.
    pub save_dir: PathBuf,

    /// Seed for reproducible rolls. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Name of the person playing, stored on new characters.
    pub player_name: String,

    /// Alignment given to new characters.
    pub alignment: String,
}

impl SessionConfig {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            seed: None,
            player_name: "Player".to_string(),
            alignment: "Neutral".to_string(),
        }
    }

    /// Read `RPG_SAVE_DIR` and `RPG_SEED`, falling back to `./saves` and
    /// an unseeded generator.
    pub fn from_env() -> Self {
        let save_dir =
            std::env::var(SAVE_DIR_ENV).unwrap_or_else(|_| DEFAULT_SAVE_DIR.to_string());
        let mut config = Self::new(save_dir);

        if let Ok(raw) = std::env::var(SEED_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => warn!(value = %raw, "Ignoring non-numeric {}", SEED_ENV),
            }
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    pub fn with_alignment(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = alignment.into();
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// A game session around one player character.
pub struct GameSession<C: Catalog = InMemoryCatalog> {
    catalog: C,
    config: SessionConfig,
    rng: StdRng,
    store: SaveStore,
    character: Character,
    save_id: Option<SaveId>,
}

impl<C: Catalog> GameSession<C> {
    /// Start with a new level 1 player built from a class template.
    pub fn new_player(
        config: SessionConfig,
        catalog: C,
        name: impl Into<String>,
        class_name: &str,
    ) -> Result<Self, RulesError> {
        let template = catalog
            .class_template(class_name)
            .ok_or_else(|| RulesError::not_found("class template", class_name))?;
        let details = PlayerDetails::new(config.alignment.clone(), config.player_name.clone());
        let character = Character::player(EntityId(1), name, class_name, &template, details)?;

        info!(character = %character.name, class = class_name, "Created character");
        Ok(Self::from_character(config, catalog, character))
    }

    /// Wrap an existing character.
    pub fn from_character(config: SessionConfig, catalog: C, character: Character) -> Self {
        Self {
            rng: config.rng(),
            store: SaveStore::new(config.save_dir.clone()),
            catalog,
            config,
            character,
            save_id: None,
        }
    }

    /// Resume from a save. Later saves overwrite the same slot.
    pub fn load(
        config: SessionConfig,
        catalog: C,
        save_id: SaveId,
    ) -> Result<(Self, Vec<DroppedReference>), RulesError> {
        let store = SaveStore::new(config.save_dir.clone());
        let loaded = store.load(&save_id, &catalog)?;
        let mut session = Self::from_character(config, catalog, loaded.character);
        session.save_id = Some(save_id);
        Ok((session, loaded.dropped))
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Mutable access. Derived stats stay behind the rules modules.
    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn save_id(&self) -> Option<&SaveId> {
        self.save_id.as_ref()
    }

    /// Copy an item from the catalog into the inventory.
    pub fn acquire_item(&mut self, item_id: EntityId) -> Result<&Item, RulesError> {
        let item = self
            .catalog
            .item_by_id(item_id)
            .ok_or_else(|| RulesError::not_found("item", item_id))?;
        self.character.inventory.add_item(item);
        self.character
            .inventory
            .items
            .last()
            .ok_or_else(|| RulesError::not_found("item", item_id))
    }

    pub fn equip(&mut self, item_id: EntityId) -> Result<EquipOutcome, RulesError> {
        equipment::equip(&mut self.character, item_id)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Option<Item> {
        equipment::unequip(&mut self.character, slot)
    }

    pub fn consume(&mut self, item_id: EntityId) -> Result<ConsumeOutcome, RulesError> {
        equipment::consume(&mut self.character, item_id)
    }

    /// The session's character attacks someone else.
    pub fn attack(&mut self, defender: &mut Character) -> AttackOutcome {
        combat::attack(&self.character, defender, &mut self.rng)
    }

    /// Someone else attacks the session's character.
    pub fn defend(&mut self, attacker: &Character) -> AttackOutcome {
        combat::attack(attacker, &mut self.character, &mut self.rng)
    }

    /// A random enemy from the catalog.
    pub fn spawn_enemy(&mut self) -> Option<Character> {
        self.catalog.random_enemy(&mut self.rng)
    }

    /// Learn a catalog spell by name. Returns false if already known.
    pub fn learn_spell(&mut self, spell_name: &str) -> Result<bool, RulesError> {
        let spell = self
            .catalog
            .spell_by_name(spell_name)
            .ok_or_else(|| RulesError::not_found("spell", spell_name))?;
        Ok(spellcasting::learn_spell(&mut self.character, &spell))
    }

    /// Cast one of the character's known spells.
    pub fn cast(&mut self, spell_name: &str) -> Result<CastOutcome, RulesError> {
        let spell = self
            .character
            .known_spells()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(spell_name))
            .cloned()
            .ok_or_else(|| RulesError::not_found("known spell", spell_name))?;
        spellcasting::cast(&mut self.character, &spell)
    }

    pub fn regenerate_mana(&mut self, amount: u32) -> u32 {
        spellcasting::regenerate_mana(&mut self.character, amount)
    }

    pub fn gain_experience(&mut self, amount: u32) -> Result<ExperienceGain, RulesError> {
        progression::gain_experience(&mut self.character, amount)
    }

    /// Save to this session's slot, allocating one on first save.
    pub fn save(&mut self) -> Result<PathBuf, RulesError> {
        let id = self.save_id.get_or_insert_with(SaveId::generate).clone();
        Ok(self.store.save(&id, &self.character)?)
    }

    /// Save to a named slot, which becomes this session's slot.
    pub fn save_as(&mut self, save_id: SaveId) -> Result<PathBuf, RulesError> {
        self.save_id = Some(save_id);
        self.save()
    }

    pub fn list_saves(&self) -> Result<Vec<SaveSummary>, RulesError> {
        Ok(self.store.list()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new("/tmp/saves")
            .with_seed(7)
            .with_player_name("Sam")
            .with_alignment("Chaotic Good");

        assert_eq!(config.save_dir, PathBuf::from("/tmp/saves"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.player_name, "Sam");
        assert_eq!(config.alignment, "Chaotic Good");
    }

    #[test]
    fn test_new_player_from_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let session = GameSession::new_player(
            SessionConfig::new(dir.path()).with_player_name("Sam"),
            InMemoryCatalog::standard(),
            "Thorin",
            "warrior",
        )
        .unwrap();

        let thorin = session.character();
        assert_eq!(thorin.max_hp(), 12);
        assert_eq!(thorin.race, "Mountain Dwarf");
        assert_eq!(thorin.player_details().unwrap().player_name, "Sam");
    }

    #[test]
    fn test_unknown_class() {
        let dir = tempfile::tempdir().unwrap();
        let result = GameSession::new_player(
            SessionConfig::new(dir.path()),
            InMemoryCatalog::standard(),
            "Nobody",
            "Bard",
        );
        assert!(matches!(result, Err(RulesError::NotFound { .. })));
    }

    #[test]
    fn test_seeded_sessions_roll_alike() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::new(dir.path()).with_seed(42);
        let mut a = GameSession::new_player(
            config.clone(),
            InMemoryCatalog::standard(),
            "A",
            "Warrior",
        )
        .unwrap();
        let mut b =
            GameSession::new_player(config, InMemoryCatalog::standard(), "B", "Warrior").unwrap();

        let mut target_a = crate::testing::sample_warrior();
        let mut target_b = crate::testing::sample_warrior();
        for _ in 0..5 {
            let roll_a = a.attack(&mut target_a).attack_roll;
            let roll_b = b.attack(&mut target_b).attack_roll;
            assert_eq!(roll_a, roll_b);
        }
    }
}
