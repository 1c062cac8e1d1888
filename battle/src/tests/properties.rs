use proptest::prelude::*;

use crate::battle::action_order;
use crate::config::BattleConfig;
use crate::grid::{recompute_bonuses, Grid};
use crate::rng::XorShiftRng;
use crate::targeting::select_target;
use crate::tests::*;
use crate::types::*;
use crate::units::{Unit, UnitTable};

/// Every cell either empty or holding (faction, role, alive, tag).
fn layout() -> impl Strategy<Value = Vec<Option<(u8, bool, bool, i32)>>> {
    prop::collection::vec(
        prop::option::of((0u8..3, any::<bool>(), any::<bool>(), -5i32..5)),
        9,
    )
}

fn build(layout: &[Option<(u8, bool, bool, i32)>]) -> (Grid, UnitTable) {
    let units = layout
        .iter()
        .enumerate()
        .filter_map(|(idx, slot)| {
            let (faction, ranged, alive, tag) = (*slot)?;
            let faction = match faction {
                0 => Faction::Player,
                1 => Faction::Enemy,
                _ => Faction::Neutral,
            };
            let role = if ranged { Role::Ranged } else { Role::Melee };
            let id = idx as u32 + 1;
            let unit = create_unit(id, faction, role, 2, id as u16)
                .with_tags(&[tag])
                .with_hp(if alive { 10 } else { 0 });
            Some(unit)
        })
        .collect::<Vec<Unit>>();
    board(units)
}

proptest! {
    #[test]
    fn prop_bonuses_are_idempotent(slots in layout()) {
        let (grid, units) = build(&slots);
        let config = BattleConfig::default();
        let once = recompute_bonuses(&grid, &units, &config);
        let twice = recompute_bonuses(&once, &units, &config);
        prop_assert_eq!(&once, &twice);

        for cell in once.cells() {
            prop_assert!(cell.bonus_attack + cell.bonus_armor <= 2 * config.line_bonus);
            prop_assert_eq!(cell.bonus_attack % config.line_bonus, 0);
            prop_assert_eq!(cell.bonus_armor % config.line_bonus, 0);
        }
    }

    #[test]
    fn prop_alive_tracks_hp(steps in prop::collection::vec((any::<bool>(), 0i32..8), 0..30)) {
        let mut unit = player(1, Role::Melee, 1, 1);
        for (damage, amount) in steps {
            if damage {
                unit.take_damage(amount);
            } else {
                unit.heal(amount);
            }
            prop_assert!(unit.hp() >= 0 && unit.hp() <= unit.max_hp);
            prop_assert_eq!(unit.is_alive(), unit.hp() > 0);
        }
    }

    #[test]
    fn prop_melee_targets_are_adjacent(slots in layout(), seed in any::<u64>()) {
        let (grid, units) = build(&slots);
        let candidates: Vec<UnitId> = units.iter().map(|u| u.id).collect();
        let mut rng = XorShiftRng::seed_from_u64(seed);

        for attacker in units.living().filter(|u| u.role == Role::Melee) {
            if let Some(target) = select_target(attacker, &candidates, &units, &grid, &mut rng) {
                let target = units.get(target).unwrap();
                prop_assert!(grid.are_adjacent(attacker.cell(), target.cell()));
                prop_assert!(target.is_alive());
                prop_assert!(attacker.faction.is_hostile_to(target.faction));
            }
        }
    }

    #[test]
    fn prop_action_order_sorted_and_living(slots in layout()) {
        let (_, units) = build(&slots);
        let order = action_order(&units);
        prop_assert_eq!(&order, &action_order(&units));
        prop_assert_eq!(order.len(), units.living().count());

        let keys: Vec<(i32, u8)> = order
            .iter()
            .map(|id| {
                let unit = units.get(*id).unwrap();
                (unit.min_tag().unwrap(), unit.faction.precedence())
            })
            .collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
