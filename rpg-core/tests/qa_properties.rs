//! Property tests for the rules invariants.
//!
//! Run with: `cargo test -p rpg-core --test qa_properties`

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rpg_core::combat::{apply_damage, attack, attack_hits};
use rpg_core::dice::{DiceSpec, DieType};
use rpg_core::equipment::{equip, heal};
use rpg_core::items::{ArmorItem, ArmorType};
use rpg_core::progression::{gain_experience, XP_THRESHOLDS};
use rpg_core::spellcasting::{can_cast, cast, regenerate_mana};
use rpg_core::spells::{Spell, SpellSchool};
use rpg_core::testing::{assert_invariants, sample_warrior, sample_wizard, ScriptedDice};
use rpg_core::world::{Ability, EntityId};
use std::collections::BTreeSet;

fn die_type() -> impl Strategy<Value = DieType> {
    prop_oneof![
        Just(DieType::D4),
        Just(DieType::D6),
        Just(DieType::D8),
        Just(DieType::D10),
        Just(DieType::D12),
        Just(DieType::D20),
    ]
}

fn armor(id: u32) -> impl Strategy<Value = ArmorItem> {
    (
        prop_oneof![Just(ArmorType::Light), Just(ArmorType::Medium), Just(ArmorType::Heavy)],
        10..20i32,
        0..10i32,
    )
        .prop_map(move |(armor_type, base_ac, hp_bonus)| {
            ArmorItem::new(id, format!("Armor {id}"), armor_type, base_ac).with_hp_bonus(hp_bonus)
        })
}

fn spell_costing(mana_cost: u32) -> Spell {
    Spell {
        id: EntityId(900),
        name: "Test Bolt".to_string(),
        level: 1,
        school: SpellSchool::Evocation,
        cast_time: "1 action".to_string(),
        range: "60 feet".to_string(),
        components: BTreeSet::new(),
        duration: "Instantaneous".to_string(),
        description: String::new(),
        requires_concentration: false,
        mana_cost,
    }
}

/// Damage (true) or healing (false), with an amount.
fn hp_step() -> impl Strategy<Value = (bool, i32)> {
    (any::<bool>(), 0..30i32)
}

proptest! {
    #[test]
    fn rolls_stay_in_range(count in 1..10u32, die in die_type(), seed in any::<u64>()) {
        let spec = DiceSpec::new(count, die);
        let parsed: DiceSpec = spec.to_string().parse().unwrap();
        prop_assert_eq!(parsed, spec);

        let mut rng = StdRng::seed_from_u64(seed);
        let roll = spec.roll(&mut rng);
        prop_assert!(roll.total >= count);
        prop_assert!(roll.total <= count * die.sides());
        prop_assert_eq!(roll.rolls.len() as u32, count);
    }

    #[test]
    fn hp_stays_clamped(steps in prop::collection::vec(hp_step(), 0..40)) {
        let mut thorin = sample_warrior();
        for (is_damage, amount) in steps {
            if is_damage {
                apply_damage(&mut thorin, amount);
            } else {
                heal(&mut thorin, amount);
            }
            assert_invariants(&thorin);
        }
    }

    #[test]
    fn armor_swaps_do_not_drift(a in armor(40), b in armor(41), swaps in 1..10usize) {
        let mut thorin = sample_warrior();
        let base = thorin.max_hp();
        let a_bonus = a.hp_bonus;
        thorin.inventory.add_item(a.into());
        thorin.inventory.add_item(b.into());

        equip(&mut thorin, EntityId(40)).unwrap();
        let with_a = (thorin.max_hp(), thorin.armor_class());
        prop_assert_eq!(with_a.0, base + a_bonus);

        for _ in 0..swaps {
            equip(&mut thorin, EntityId(41)).unwrap();
            equip(&mut thorin, EntityId(40)).unwrap();
        }
        prop_assert_eq!((thorin.max_hp(), thorin.armor_class()), with_a);
        assert_invariants(&thorin);
    }

    #[test]
    fn hit_iff_roll_meets_armor_class(roll in 1..=20u32, dex in 1..30i32) {
        let attacker = sample_warrior();
        let mut defender = sample_warrior();
        defender.set_ability_score(Ability::Dexterity, dex);
        let ac = defender.armor_class();
        let before = defender.current_hp();

        let outcome = attack(&attacker, &mut defender, &mut ScriptedDice::new([roll]));
        prop_assert_eq!(outcome.hit, attack_hits(roll, ac));
        prop_assert_eq!(outcome.hit, roll as i32 >= ac);
        if outcome.hit {
            prop_assert_eq!(defender.current_hp(), before - 1);
        } else {
            prop_assert_eq!(defender.current_hp(), before);
        }
    }

    #[test]
    fn cast_spends_exactly_or_nothing(cost in 0..40u32, spent in 0..25u32) {
        let mut merlin = sample_wizard();
        cast(&mut merlin, &spell_costing(spent.min(20))).unwrap();
        let before = merlin.current_mana();
        let spell = spell_costing(cost);

        let allowed = can_cast(&merlin, &spell);
        let result = cast(&mut merlin, &spell);
        prop_assert_eq!(result.is_ok(), allowed);
        if allowed {
            prop_assert_eq!(merlin.current_mana(), before - cost);
        } else {
            prop_assert_eq!(merlin.current_mana(), before);
        }

        regenerate_mana(&mut merlin, cost);
        prop_assert!(merlin.current_mana() <= merlin.max_mana());
    }

    #[test]
    fn one_gain_promotes_at_most_once(amount in 0..400_000u32) {
        let mut thorin = sample_warrior();
        let gain = gain_experience(&mut thorin, amount).unwrap();
        let expected = if amount >= XP_THRESHOLDS[1] { 2 } else { 1 };
        prop_assert_eq!(thorin.level(), expected);
        prop_assert_eq!(gain.new_level.is_some(), expected == 2);
    }
}
