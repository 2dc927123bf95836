//! Tabletop RPG rules engine.
//!
//! This crate provides:
//! - Characters, items and spells with their invariants
//! - Equipment effects that keep armor class and max HP in step with gear
//! - Attack resolution with an injectable random source
//! - Mana-gated spellcasting and experience-driven leveling
//! - Character persistence that re-derives equipment effects on load
//!
//! # Quick Start
//!
//! ```no_run
//! use rpg_core::{EntityId, GameSession, InMemoryCatalog, SessionConfig};
//!
//! fn main() -> Result<(), rpg_core::RulesError> {
//!     let config = SessionConfig::new("saves").with_seed(7);
//!     let mut session =
//!         GameSession::new_player(config, InMemoryCatalog::standard(), "Thorin", "Warrior")?;
//!
//!     session.acquire_item(EntityId(4))?;
//!     session.equip(EntityId(4))?;
//!
//!     if let Some(mut goblin) = session.spawn_enemy() {
//!         let outcome = session.attack(&mut goblin);
//!         println!("{outcome}");
//!     }
//!
//!     session.save()?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod combat;
pub mod dice;
pub mod equipment;
pub mod error;
pub mod items;
pub mod persist;
pub mod progression;
pub mod session;
pub mod spellcasting;
pub mod spells;
pub mod testing;
pub mod world;

// Primary public API
pub use catalog::{Catalog, InMemoryCatalog};
pub use combat::AttackOutcome;
pub use dice::{DiceError, DiceSpec, RandomSource};
pub use error::RulesError;
pub use items::{ArmorItem, Item, PotionItem, WeaponItem};
pub use persist::{LoadedCharacter, PersistError, SaveId, SaveStore, SaveSummary};
pub use session::{GameSession, SessionConfig};
pub use spells::Spell;
pub use world::{Character, CharacterKind, EntityId, EquipSlot};
