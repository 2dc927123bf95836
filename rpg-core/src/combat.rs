//! Attack resolution between two characters.

use crate::dice::{roll_d20, RandomSource, RollResult};
use crate::world::{Character, DamageResult};
use std::fmt;
use tracing::debug;

/// Damage dealt by a hit with no weapon equipped.
pub const UNARMED_DAMAGE: i32 = 1;

/// Everything that happened during one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub attacker: String,
    pub defender: String,
    pub attack_roll: u32,
    pub defender_ac: i32,
    pub hit: bool,
    /// Zero on a miss.
    pub damage: i32,
    /// The weapon roll, when a weapon hit.
    pub damage_roll: Option<RollResult>,
    pub defender_hp: i32,
    pub defender_dropped: bool,
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attacks {} (roll: {} vs AC {})",
            self.attacker, self.defender, self.attack_roll, self.defender_ac
        )?;
        if !self.hit {
            return write!(f, " and misses.");
        }
        write!(f, " and hits for {} damage", self.damage)?;
        if let Some(roll) = &self.damage_roll {
            write!(f, " ({roll})")?;
        }
        if self.defender_dropped {
            write!(f, ". {} falls!", self.defender)
        } else {
            write!(f, ". {} has {} HP left.", self.defender, self.defender_hp)
        }
    }
}

/// Hit condition. A roll equal to the armor class hits.
pub fn attack_hits(attack_roll: u32, armor_class: i32) -> bool {
    i64::from(attack_roll) >= i64::from(armor_class)
}

/// Subtract damage, flooring current HP at zero.
pub fn apply_damage(character: &mut Character, amount: i32) -> DamageResult {
    let result = character.hit_points.take_damage(amount);
    debug!(
        character = %character.name,
        damage = result.damage_taken,
        current_hp = character.current_hp(),
        "Took damage"
    );
    result
}

/// Resolve one attack. A miss changes nothing.
pub fn attack(
    attacker: &Character,
    defender: &mut Character,
    rng: &mut (impl RandomSource + ?Sized),
) -> AttackOutcome {
    let attack_roll = roll_d20(rng);
    let defender_ac = defender.armor_class();
    let hit = attack_hits(attack_roll, defender_ac);

    let (damage, damage_roll, defender_dropped) = if hit {
        let (damage, damage_roll) = match &attacker.equipment().weapon {
            Some(weapon) => {
                let roll = weapon.dice.roll(rng);
                (i32::try_from(roll.total).unwrap_or(i32::MAX), Some(roll))
            }
            None => (UNARMED_DAMAGE, None),
        };
        let result = apply_damage(defender, damage);
        (damage, damage_roll, result.dropped_to_zero)
    } else {
        (0, None, false)
    };

    debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        attack_roll,
        defender_ac,
        hit,
        damage,
        "Resolved attack"
    );

    AttackOutcome {
        attacker: attacker.name.clone(),
        defender: defender.name.clone(),
        attack_roll,
        defender_ac,
        hit,
        damage,
        damage_roll,
        defender_hp: defender.current_hp(),
        defender_dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::equip;
    use crate::testing::{sample_goblin, sample_warrior, ScriptedDice};
    use crate::world::{Ability, EntityId};

    #[test]
    fn test_unarmed_hit_scenario() {
        let attacker = sample_warrior();
        let mut defender = sample_warrior();
        defender.set_ability_score(Ability::Dexterity, 16);
        assert_eq!(defender.armor_class(), 13);
        let before = defender.current_hp();

        let mut dice = ScriptedDice::new([15]);
        let outcome = attack(&attacker, &mut defender, &mut dice);

        assert!(outcome.hit);
        assert_eq!(outcome.damage, UNARMED_DAMAGE);
        assert!(outcome.damage_roll.is_none());
        assert_eq!(defender.current_hp(), before - 1);
    }

    #[test]
    fn test_roll_equal_to_ac_hits() {
        assert!(attack_hits(13, 13));
        assert!(!attack_hits(12, 13));
        assert!(attack_hits(1, 0));
        assert!(attack_hits(1, -2));
    }

    #[test]
    fn test_miss_changes_nothing() {
        let attacker = sample_warrior();
        let mut defender = sample_goblin();
        let before = defender.current_hp();

        let mut dice = ScriptedDice::new([defender.armor_class() as u32 - 1]);
        let outcome = attack(&attacker, &mut defender, &mut dice);

        assert!(!outcome.hit);
        assert_eq!(outcome.damage, 0);
        assert_eq!(defender.current_hp(), before);
        assert!(outcome.to_string().ends_with("misses."));
    }

    #[test]
    fn test_weapon_damage_uses_dice() {
        let mut attacker = sample_warrior();
        attacker.inventory.add_item(crate::testing::longsword().into());
        equip(&mut attacker, EntityId(1)).unwrap();
        let mut defender = sample_warrior();

        // d20 = 18, then 1d8 = 6
        let mut dice = ScriptedDice::new([18, 6]);
        let outcome = attack(&attacker, &mut defender, &mut dice);

        assert!(outcome.hit);
        assert_eq!(outcome.damage, 6);
        assert_eq!(outcome.damage_roll.as_ref().map(|r| r.total), Some(6));
        assert_eq!(defender.current_hp(), 6);
    }

    #[test]
    fn test_lethal_hit_floors_at_zero() {
        let mut attacker = sample_warrior();
        attacker.inventory.add_item(crate::testing::greatsword().into());
        equip(&mut attacker, EntityId(7)).unwrap();
        let mut goblin = sample_goblin();

        let mut dice = ScriptedDice::new([20, 6, 6]);
        let outcome = attack(&attacker, &mut goblin, &mut dice);

        assert_eq!(outcome.damage, 12);
        assert!(outcome.defender_dropped);
        assert_eq!(goblin.current_hp(), 0);
        assert!(goblin.is_dead());
        assert!(outcome.to_string().contains("falls"));
    }

    #[test]
    fn test_apply_damage_ignores_negative_amounts() {
        let mut warrior = sample_warrior();
        let result = apply_damage(&mut warrior, -4);
        assert_eq!(result.damage_taken, 0);
        assert_eq!(warrior.current_hp(), warrior.max_hp());
    }
}
