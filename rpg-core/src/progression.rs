//! Experience and leveling.

use crate::error::RulesError;
use crate::world::{Character, CharacterKind};
use tracing::{debug, info};

pub const MAX_LEVEL: u8 = 20;

/// Cumulative experience needed for each level, starting at level 1.
pub const XP_THRESHOLDS: [u32; MAX_LEVEL as usize] = [
    0, 300, 900, 2700, 6500, 14000, 23000, 34000, 48000, 64000, 85000, 100000, 120000, 140000,
    165000, 195000, 225000, 265000, 305000, 355000,
];

/// Experience needed to reach `level`, or `None` past the table.
pub fn threshold_for_level(level: u8) -> Option<u32> {
    if level == 0 {
        return None;
    }
    XP_THRESHOLDS.get(usize::from(level) - 1).copied()
}

/// Result of an experience gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    pub gained: u32,
    pub total: u32,
    /// The new level if this gain promoted the character.
    pub new_level: Option<u8>,
}

/// Add experience to a player and check for a level-up once.
///
/// A gain large enough to cross several thresholds still promotes by a
/// single level; call [`check_level_up`] again to catch up.
pub fn gain_experience(character: &mut Character, amount: u32) -> Result<ExperienceGain, RulesError> {
    let details = match &mut character.kind {
        CharacterKind::Player(details) => details,
        CharacterKind::Npc(_) => return Err(RulesError::NotAPlayer(character.name.clone())),
    };
    details.experience = details.experience.saturating_add(amount);
    let total = details.experience;

    debug!(character = %character.name, gained = amount, total, "Gained experience");

    let new_level = check_level_up(character);
    Ok(ExperienceGain {
        gained: amount,
        total,
        new_level,
    })
}

/// Promote by one level if experience meets the next threshold.
pub fn check_level_up(character: &mut Character) -> Option<u8> {
    let experience = character.experience()?;
    let next = character.level().checked_add(1)?;
    let needed = threshold_for_level(next)?;
    if experience < needed {
        return None;
    }

    character.set_level(next);
    info!(character = %character.name, level = next, experience, "Level up");
    Some(next)
}
