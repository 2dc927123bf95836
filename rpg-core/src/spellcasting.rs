//! Mana-gated spellcasting.
//!
//! Casting only pays the mana cost and reports what was cast. Applying the
//! effect to targets is up to the caller, typically through
//! [`crate::combat::apply_damage`] or [`crate::equipment::heal`].

use crate::error::RulesError;
use crate::spells::Spell;
use crate::world::Character;
use tracing::debug;

/// Result of a successful cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastOutcome {
    pub caster: String,
    pub spell_name: String,
    pub spell_level: u8,
    pub mana_spent: u32,
    pub mana_remaining: u32,
    pub requires_concentration: bool,
    pub description: String,
}

impl CastOutcome {
    pub fn narrative(&self) -> String {
        format!(
            "{} casts {} ({} mana, {} left). {}",
            self.caster, self.spell_name, self.mana_spent, self.mana_remaining, self.description
        )
    }
}

pub fn can_cast(character: &Character, spell: &Spell) -> bool {
    character.current_mana() >= spell.mana_cost
}

/// Spend the spell's mana cost. Fails without touching the character when
/// there isn't enough mana.
pub fn cast(character: &mut Character, spell: &Spell) -> Result<CastOutcome, RulesError> {
    if !character.mana.spend(spell.mana_cost) {
        return Err(RulesError::InsufficientMana {
            spell: spell.name.clone(),
            required: spell.mana_cost,
            available: character.current_mana(),
        });
    }

    debug!(
        caster = %character.name,
        spell = %spell.name,
        cost = spell.mana_cost,
        mana = character.current_mana(),
        "Cast spell"
    );

    Ok(CastOutcome {
        caster: character.name.clone(),
        spell_name: spell.name.clone(),
        spell_level: spell.level,
        mana_spent: spell.mana_cost,
        mana_remaining: character.current_mana(),
        requires_concentration: spell.requires_concentration,
        description: spell.description.clone(),
    })
}

/// Add a spell to the known list. Returns false if it was already known.
pub fn learn_spell(character: &mut Character, spell: &Spell) -> bool {
    if character.knows_spell(spell.id) {
        return false;
    }
    character.known_spells.push(spell.clone());
    debug!(character = %character.name, spell = %spell.name, "Learned spell");
    true
}

/// Restore mana up to the maximum. Returns the amount actually restored.
pub fn regenerate_mana(character: &mut Character, amount: u32) -> u32 {
    character.mana.restore(amount)
}
