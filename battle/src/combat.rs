//! Attack and trait resolution.
//!
//! A single call resolves one unit's attack on one target, hits first and
//! then the post-attack side effects in a fixed order: healing, poison,
//! counter. Nothing here is random.

use alloc::vec::Vec;

use crate::config::BattleConfig;
use crate::grid::Grid;
use crate::status::{StatusEffect, StatusKind};
use crate::traits::TraitKind;
use crate::types::Faction;
use crate::units::{ShieldBlock, Unit};

/// Hits per attack with DoubleAttack. Traits never push past this.
pub const MAX_HITS: usize = 2;

/// What happened on one hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitReport {
    pub raw: i32,
    /// Taken by the cell's positional armor, which is never consumed
    pub warded: i32,
    /// Taken out of the target's armor pool
    pub absorbed: i32,
    pub dealt: i32,
    pub blocked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackReport {
    pub damage_dealt: i32,
    pub hits: Vec<HitReport>,
    pub backstab: bool,
    pub target_died: bool,
    /// OnDeathTrigger magnitude of a target this attack killed
    pub on_death: Option<i32>,
    /// Shield status whose last charge this attack used up
    pub broken_shield: Option<StatusEffect>,
    pub healed: i32,
    pub poisoned: bool,
    pub counter_damage: i32,
    pub attacker_died: bool,
}

/// True when `attacker` stands on the line behind `target`'s facing.
pub fn is_behind(grid: &Grid, attacker: &Unit, target: &Unit) -> bool {
    let behind = target.position.facing.opposite();
    grid.direction_between(target.cell(), attacker.cell()) == Some(behind)
}

/// Resolve `attacker` hitting `target`, mutating both.
///
/// Positional bonuses come from the cells both units stand on: the
/// attacker's `bonus_attack` raises every hit and the target's
/// `bonus_armor` wards each hit before its own armor pool is touched.
/// Pierce skips both kinds of armor.
pub fn resolve_attack(
    attacker: &mut Unit,
    target: &mut Unit,
    grid: &Grid,
    config: &BattleConfig,
) -> AttackReport {
    let mut report = AttackReport::default();

    let hit_count = if attacker.has_trait(TraitKind::DoubleAttack) {
        MAX_HITS
    } else {
        1
    };
    let pierce = attacker.has_trait(TraitKind::Pierce);
    let attack_bonus = grid.cell(attacker.cell()).map_or(0, |c| c.bonus_attack);
    let ward = grid.cell(target.cell()).map_or(0, |c| c.bonus_armor);
    report.backstab = attacker.has_trait(TraitKind::Backstab) && is_behind(grid, attacker, target);

    let was_alive = target.is_alive();
    for hit_idx in 0..hit_count {
        let mut hit = HitReport {
            raw: attacker.effective_attack(attack_bonus),
            ..HitReport::default()
        };
        if report.backstab && hit_idx == 0 {
            hit.raw = hit.raw.saturating_add(config.backstab_bonus);
        }

        match target.consume_shield() {
            ShieldBlock::Unshielded => {}
            ShieldBlock::Blocked => hit.blocked = true,
            ShieldBlock::Broken(shield) => {
                hit.blocked = true;
                report.broken_shield = Some(shield);
            }
        }
        if hit.blocked {
            report.hits.push(hit);
            continue;
        }

        let mut remaining = hit.raw;
        if !pierce {
            hit.warded = ward.clamp(0, remaining);
            remaining -= hit.warded;
            let after_armor = target.absorb_with_armor(remaining);
            hit.absorbed = remaining - after_armor;
            remaining = after_armor;
        }

        let hp_before = target.hp();
        target.take_damage(remaining);
        hit.dealt = hp_before - target.hp();
        report.damage_dealt += hit.dealt;
        report.hits.push(hit);
    }

    if was_alive && !target.is_alive() {
        report.target_died = true;
        report.on_death = target.traits.magnitude_or(TraitKind::OnDeathTrigger, 0);
    }

    if attacker.faction == Faction::Player {
        if let Some(amount) = attacker.traits.magnitude_or(TraitKind::Healing, attacker.attack) {
            report.healed = attacker.heal(amount);
        }
    }

    if target.is_alive() {
        let poison = attacker
            .traits
            .magnitude_or(TraitKind::Poison, config.poison_damage);
        if let Some(damage) = poison {
            target.apply_status(StatusEffect::new(
                StatusKind::Poison,
                config.poison_duration,
                damage,
            ));
            report.poisoned = true;
        }
    }

    // Counter fires even when this attack killed the target.
    if let Some(damage) = target.traits.magnitude_or(TraitKind::Counter, target.attack) {
        let hp_before = attacker.hp();
        report.attacker_died = attacker.take_damage(damage);
        report.counter_damage = hp_before - attacker.hp();
    }

    report
}
