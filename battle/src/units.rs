//! Combatants and the unit arena.
//!
//! Every other structure (grid occupancy, action order, events) refers to a
//! unit by [`UnitId`]; the [`UnitTable`] is the only owner of unit state.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, BattleResult};
use crate::status::{StatusEffect, StatusKind};
use crate::traits::{CombatTrait, TraitKind, TraitSet};
use crate::types::{CellId, Direction, Faction, Role, UnitId};

/// Result of a hit meeting a shield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldBlock {
    Unshielded,
    /// Hit blocked, charges remain
    Blocked,
    /// Hit blocked and the last charge is gone
    Broken(StatusEffect),
}

/// Where a unit stands and which way it looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub cell: CellId,
    pub facing: Direction,
}

impl Position {
    pub const fn new(cell: CellId, facing: Direction) -> Self {
        Self { cell, facing }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub role: Role,
    pub numeric_tags: Vec<i32>,
    hp: i32,
    pub max_hp: i32,
    /// Base attack. Bonuses are added at resolution time, never written here.
    pub attack: i32,
    /// Consumable armor pool, worn down by incoming hits.
    pub armor: i32,
    #[serde(default)]
    pub traits: TraitSet,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    pub position: Position,
    #[serde(default, skip_serializing)]
    pub has_acted_this_pass: bool,
}

impl Unit {
    /// A fresh unit at full health facing north.
    pub fn new(
        id: UnitId,
        name: &str,
        faction: Faction,
        role: Role,
        max_hp: i32,
        attack: i32,
        cell: CellId,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            faction,
            role,
            numeric_tags: Vec::new(),
            hp: max_hp,
            max_hp,
            attack,
            armor: 0,
            traits: TraitSet::new(),
            status_effects: Vec::new(),
            position: Position::new(cell, Direction::North),
            has_acted_this_pass: false,
        }
    }

    pub fn with_tags(mut self, tags: &[i32]) -> Self {
        self.numeric_tags = tags.to_vec();
        self
    }

    pub fn with_armor(mut self, armor: i32) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_trait(mut self, entry: CombatTrait) -> Self {
        self.traits.insert(entry);
        self
    }

    pub fn facing(mut self, facing: Direction) -> Self {
        self.position.facing = facing;
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn cell(&self) -> CellId {
        self.position.cell
    }

    /// Tag used for ordering; a unit with several tags acts on its lowest.
    pub fn min_tag(&self) -> Option<i32> {
        self.numeric_tags.iter().copied().min()
    }

    pub fn has_trait(&self, kind: TraitKind) -> bool {
        self.traits.has(kind)
    }

    /// Base attack plus the cell bonus and every status modifier, floored at 0.
    pub fn effective_attack(&self, positional_bonus: i32) -> i32 {
        let status_bonus = self
            .status_effects
            .iter()
            .map(StatusEffect::attack_modifier)
            .fold(0i32, i32::saturating_add);
        self.attack
            .saturating_add(positional_bonus)
            .saturating_add(status_bonus)
            .max(0)
    }

    /// Lose hp, floored at 0. Returns true only on the hit that kills.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() || amount <= 0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        self.hp == 0
    }

    /// Restore hp up to max. Dead units cannot be healed. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    /// Armor absorbs up to `raw` damage and is worn down by what it absorbs.
    /// Returns the damage left over.
    pub fn absorb_with_armor(&mut self, raw: i32) -> i32 {
        let absorbed = self.armor.min(raw).max(0);
        self.armor -= absorbed;
        raw - absorbed
    }

    pub fn status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.status_effects.iter().find(|s| s.kind == kind)
    }

    /// Apply or refresh a status. Returns true when the kind was new.
    pub fn apply_status(&mut self, effect: StatusEffect) -> bool {
        if let Some(existing) = self.status_effects.iter_mut().find(|s| s.kind == effect.kind) {
            existing.refresh(&effect);
            return false;
        }
        self.status_effects.push(effect);
        true
    }

    /// Spend one shield charge if the unit has any left.
    pub fn consume_shield(&mut self) -> ShieldBlock {
        let Some(idx) = self
            .status_effects
            .iter()
            .position(|s| s.kind == StatusKind::Shield && s.magnitude > 0)
        else {
            return ShieldBlock::Unshielded;
        };
        self.status_effects[idx].magnitude -= 1;
        if self.status_effects[idx].magnitude == 0 {
            return ShieldBlock::Broken(self.status_effects.remove(idx));
        }
        ShieldBlock::Blocked
    }

    /// Advance every status by one pass, returning the ones that expired.
    pub fn tick_statuses(&mut self) -> Vec<StatusEffect> {
        let mut expired = Vec::new();
        self.status_effects.retain_mut(|status| {
            if status.tick() {
                expired.push(*status);
                false
            } else {
                true
            }
        });
        expired
    }

    pub(crate) fn validate(&self) -> BattleResult<()> {
        if self.numeric_tags.is_empty() {
            return Err(BattleError::EmptyNumericTags { id: self.id });
        }
        if self.max_hp <= 0 || self.hp < 0 || self.hp > self.max_hp {
            return Err(BattleError::InvalidHealth {
                id: self.id,
                hp: self.hp,
                max_hp: self.max_hp,
            });
        }
        if self.attack < 0 || self.armor < 0 {
            return Err(BattleError::InvalidStats {
                id: self.id,
                attack: self.attack,
                armor: self.armor,
            });
        }
        let negative_trait = self
            .traits
            .iter()
            .find_map(|t| t.magnitude.filter(|m| *m < 0).map(|m| (t.kind, m)));
        if let Some((kind, magnitude)) = negative_trait {
            return Err(BattleError::InvalidTrait {
                id: self.id,
                kind,
                magnitude,
            });
        }
        if let Some(status) = self.status_effects.iter().find(|s| !s.is_well_formed()) {
            return Err(BattleError::InvalidStatus {
                id: self.id,
                kind: status.kind,
                duration: status.remaining_duration,
                magnitude: status.magnitude,
            });
        }
        Ok(())
    }
}

/// Arena of units keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: Vec<Unit>,
    index: BTreeMap<UnitId, usize>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: Unit) -> BattleResult<()> {
        if self.index.contains_key(&unit.id) {
            return Err(BattleError::DuplicateUnit { id: unit.id });
        }
        self.index.insert(unit.id, self.units.len());
        self.units.push(unit);
        Ok(())
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let idx = self.index.remove(&id)?;
        let unit = self.units.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(unit)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.index.get(&id).map(|&idx| &self.units[idx])
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        let idx = *self.index.get(&id)?;
        self.units.get_mut(idx)
    }

    /// Mutable access to two distinct units at once.
    pub fn pair_mut(&mut self, a: UnitId, b: UnitId) -> Option<(&mut Unit, &mut Unit)> {
        let ia = *self.index.get(&a)?;
        let ib = *self.index.get(&b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.units.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.units.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.index.contains_key(&id)
    }

    /// Units in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<Unit> for UnitTable {
    /// Later duplicates are dropped; use [`UnitTable::insert`] to catch them.
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let mut table = UnitTable::new();
        for unit in iter {
            let _ = table.insert(unit);
        }
        table
    }
}
