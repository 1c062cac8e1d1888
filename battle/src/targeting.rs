//! Role-based target selection.

use alloc::vec::Vec;

use crate::grid::Grid;
use crate::rng::BattleRng;
use crate::types::{Role, UnitId};
use crate::units::{Unit, UnitTable};

/// Pick a target for `attacker` out of `candidates`.
///
/// Only living units hostile to the attacker are considered. Returns `None`
/// when nothing qualifies; the caller treats that as a skipped action.
///
/// * Melee units only reach edge-adjacent cells and prefer ranged targets
///   there, breaking ties at random.
/// * Ranged units look along the four cardinal lines, clockwise from their
///   facing, and take the nearest hostile unit on the first line that has
///   one. With nothing in line they fall back to any hostile unit at random.
pub fn select_target(
    attacker: &Unit,
    candidates: &[UnitId],
    units: &UnitTable,
    grid: &Grid,
    rng: &mut impl BattleRng,
) -> Option<UnitId> {
    let hostile: Vec<&Unit> = candidates
        .iter()
        .filter_map(|id| units.get(*id))
        .filter(|u| {
            u.is_alive() && u.id != attacker.id && attacker.faction.is_hostile_to(u.faction)
        })
        .collect();

    if hostile.is_empty() {
        return None;
    }

    match attacker.role {
        Role::Melee => select_melee(attacker, &hostile, grid, rng),
        Role::Ranged => select_ranged(attacker, &hostile, grid, rng),
    }
}

fn select_melee(
    attacker: &Unit,
    hostile: &[&Unit],
    grid: &Grid,
    rng: &mut impl BattleRng,
) -> Option<UnitId> {
    let adjacent: Vec<&Unit> = hostile
        .iter()
        .copied()
        .filter(|u| grid.are_adjacent(attacker.cell(), u.cell()))
        .collect();

    let ranged: Vec<UnitId> = adjacent
        .iter()
        .filter(|u| u.role == Role::Ranged)
        .map(|u| u.id)
        .collect();
    if !ranged.is_empty() {
        return rng.choose(&ranged).copied();
    }

    let melee: Vec<UnitId> = adjacent.iter().map(|u| u.id).collect();
    rng.choose(&melee).copied()
}

fn select_ranged(
    attacker: &Unit,
    hostile: &[&Unit],
    grid: &Grid,
    rng: &mut impl BattleRng,
) -> Option<UnitId> {
    for direction in attacker.position.facing.clockwise_from() {
        for cell in grid.ray(attacker.cell(), direction) {
            if let Some(found) = hostile.iter().find(|u| u.cell() == cell.id) {
                return Some(found.id);
            }
        }
    }

    let pool: Vec<UnitId> = hostile.iter().map(|u| u.id).collect();
    rng.choose(&pool).copied()
}
