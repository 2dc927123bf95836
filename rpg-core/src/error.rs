//! Error taxonomy shared by every rules component.

use crate::dice::DiceError;
use crate::persist::{PersistError, ReferenceKind};
use crate::world::EntityId;
use thiserror::Error;

/// Errors from rules operations.
///
/// Every operation that can fail validates its inputs before touching the
/// character, so an `Err` always means nothing was mutated.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Invalid dice spec: {0}")]
    InvalidDiceSpec(#[from] DiceError),

    #[error("Insufficient mana: {spell} costs {required}, only {available} available")]
    InsufficientMana {
        spell: String,
        required: u32,
        available: u32,
    },

    #[error("{character} does not own item {item_id}")]
    ItemNotOwned { character: String, item_id: EntityId },

    #[error("{0} cannot be equipped")]
    NotEquippable(String),

    #[error("Equipping {item} would leave {character} with {max_hp} max HP")]
    MaxHpTooLow {
        character: String,
        item: String,
        max_hp: i32,
    },

    #[error("{0} cannot be consumed")]
    NotConsumable(String),

    #[error("{0} is not a player character")]
    NotAPlayer(String),

    #[error("Malformed class template: {0}")]
    MalformedTemplate(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    #[error("Saved {kind} reference {id} no longer resolves in the catalog")]
    DanglingReference { kind: ReferenceKind, id: EntityId },
}

impl RulesError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        RulesError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}
