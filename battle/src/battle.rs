//! Battle orchestration.
//!
//! A [`BattleSession`] owns the grid, the unit arena and the rosters for one
//! battle. The host drives it:
//!
//! ```text
//! Idle --start_battle--> Ordering --run_pass--> Acting --+--> Ordering (undecided)
//!                                                       +--> Finished (victory/defeat)
//! ```
//!
//! Each pass walks the action order computed by `start_battle` exactly once.
//! Looping over several passes (rounds) is the host's job.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::combat::{resolve_attack, AttackReport};
use crate::config::BattleConfig;
use crate::error::{BattleError, BattleResult};
use crate::events::{BattleListener, CombatEvent, EventBus, ListenerId};
use crate::grid::{recompute_bonuses, Grid};
use crate::log;
use crate::rng::{BattleRng, XorShiftRng};
use crate::status::{HookOutcome, StatusEffect, StatusHook, StatusKind};
use crate::targeting::select_target;
use crate::traits::TraitKind;
use crate::types::{BattleOutcome, CellId, Faction, UnitId};
use crate::units::{Unit, UnitTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    /// Units registered, no order yet
    Idle,
    /// Order computed, ready for a pass
    Ordering,
    /// A pass is in progress
    Acting,
    /// One side has been wiped out
    Finished,
}

/// Everything a host needs after a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub outcome: BattleOutcome,
    /// Events emitted during this pass, in order
    pub events: Vec<CombatEvent>,
    /// Units that completed an action this pass
    pub acted: Vec<UnitId>,
    /// The complete battle log so far
    pub log: Vec<String>,
}

/// Order in which living units act: lowest numeric tag first, then Player,
/// Neutral, Enemy. Units tied on both keep their registration order.
pub fn action_order(units: &UnitTable) -> Vec<UnitId> {
    let mut living: Vec<&Unit> = units.living().collect();
    living.sort_by_key(|u| (u.min_tag().unwrap_or(i32::MAX), u.faction.precedence()));
    living.into_iter().map(|u| u.id).collect()
}

pub struct BattleSession<R: BattleRng = XorShiftRng> {
    config: BattleConfig,
    grid: Grid,
    units: UnitTable,
    player_units: Vec<UnitId>,
    enemy_units: Vec<UnitId>,
    neutral_units: Vec<UnitId>,
    action_order: Vec<UnitId>,
    state: BattleState,
    outcome: BattleOutcome,
    log: Vec<String>,
    events: Vec<CombatEvent>,
    bus: EventBus,
    rng: R,
}

#[cfg(feature = "std")]
impl BattleSession<XorShiftRng> {
    /// A session whose tie-breaks are seeded from OS entropy.
    pub fn new(grid: Grid, config: BattleConfig) -> BattleResult<Self> {
        Self::with_rng(grid, config, XorShiftRng::from_entropy())
    }
}

impl<R: BattleRng> BattleSession<R> {
    pub fn with_rng(grid: Grid, config: BattleConfig, rng: R) -> BattleResult<Self> {
        config.validate()?;
        let grid = recompute_bonuses(&grid, &UnitTable::new(), &config);
        Ok(Self {
            config,
            grid,
            units: UnitTable::new(),
            player_units: Vec::new(),
            enemy_units: Vec::new(),
            neutral_units: Vec::new(),
            action_order: Vec::new(),
            state: BattleState::Idle,
            outcome: BattleOutcome::Undecided,
            log: Vec::new(),
            events: Vec::new(),
            bus: EventBus::new(),
            rng,
        })
    }

    // ==========================================
    // ACCESSORS
    // ==========================================

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn player_units(&self) -> &[UnitId] {
        &self.player_units
    }

    pub fn enemy_units(&self) -> &[UnitId] {
        &self.enemy_units
    }

    pub fn neutral_units(&self) -> &[UnitId] {
        &self.neutral_units
    }

    pub fn action_order(&self) -> &[UnitId] {
        &self.action_order
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Every event emitted since the session was created
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: BattleListener + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ==========================================
    // ROSTER MANAGEMENT
    // ==========================================

    /// Register a deployed unit and place it on its cell.
    pub fn add_unit(&mut self, mut unit: Unit) -> BattleResult<()> {
        self.ensure_editable()?;
        self.inherit_cell_tag(&mut unit);
        self.check_new_unit(&unit, &[])?;

        let (id, faction) = (unit.id, unit.faction);
        self.insert_unit(unit)?;
        self.refresh_bonuses();
        self.push_log(format!("{} joined the {} side", self.name_of(id), faction.as_str()));
        self.emit(CombatEvent::UnitAdded { unit: id, faction });
        Ok(())
    }

    /// Register a wave of enemies. Spawned units always join the enemy side.
    /// Either every unit is accepted or none is.
    pub fn spawn_enemies(&mut self, mut units: Vec<Unit>) -> BattleResult<()> {
        self.ensure_editable()?;
        let mut claimed = Vec::with_capacity(units.len());
        for unit in &mut units {
            self.inherit_cell_tag(unit);
            self.check_new_unit(unit, &claimed)?;
            claimed.push((unit.id, unit.cell()));
        }

        let mut ids = Vec::with_capacity(units.len());
        for mut unit in units {
            unit.faction = Faction::Enemy;
            ids.push(unit.id);
            self.insert_unit(unit)?;
        }
        self.refresh_bonuses();
        self.push_log(format!("{} enemies appeared", ids.len()));
        self.emit(CombatEvent::EnemiesSpawned { units: ids });
        Ok(())
    }

    /// Take a unit off the board entirely, freeing its cell.
    pub fn remove_unit(&mut self, id: UnitId) -> BattleResult<Unit> {
        self.ensure_editable()?;
        let unit = self.units.remove(id).ok_or(BattleError::UnknownUnit { id })?;
        if self.grid.cell(unit.cell()).and_then(|c| c.occupant()) == Some(id) {
            self.grid.clear(unit.cell())?;
        }
        for roster in [
            &mut self.player_units,
            &mut self.enemy_units,
            &mut self.neutral_units,
        ] {
            roster.retain(|u| *u != id);
        }
        self.action_order.retain(|u| *u != id);
        self.refresh_bonuses();
        self.push_log(format!("{} left the battlefield", unit.name));
        Ok(unit)
    }

    /// Apply a status from an outside source such as a card. Re-applying a
    /// kind the unit already has refreshes it.
    pub fn apply_status(&mut self, id: UnitId, effect: StatusEffect) -> BattleResult<()> {
        self.ensure_editable()?;
        if !effect.is_well_formed() {
            return Err(BattleError::InvalidStatus {
                id,
                kind: effect.kind,
                duration: effect.remaining_duration,
                magnitude: effect.magnitude,
            });
        }
        let unit = self.units.get_mut(id).ok_or(BattleError::UnknownUnit { id })?;
        if !unit.is_alive() {
            log::debug("apply_status", &format!("{} is dead, ignoring {:?}", id, effect.kind));
            return Ok(());
        }
        let fresh = unit.apply_status(effect);
        let name = unit.name.clone();
        self.fire_status_hook(id, effect, StatusHook::Apply);
        let verb = if fresh { "gains" } else { "refreshes" };
        self.push_log(format!("{} {} {}", name, verb, effect.kind.as_str()));
        Ok(())
    }

    fn ensure_editable(&self) -> BattleResult<()> {
        match self.state {
            BattleState::Finished => Err(BattleError::BattleFinished),
            BattleState::Acting => Err(BattleError::WrongState),
            BattleState::Idle | BattleState::Ordering => Ok(()),
        }
    }

    /// A unit deployed without tags takes the tag of the cell it lands on.
    fn inherit_cell_tag(&self, unit: &mut Unit) {
        if !unit.numeric_tags.is_empty() {
            return;
        }
        if let Some(cell) = self.grid.cell(unit.cell()) {
            unit.numeric_tags.push(cell.tag);
        }
    }

    /// Validate a unit before it is inserted. `claimed` holds cells taken by
    /// earlier members of the same batch.
    fn check_new_unit(&self, unit: &Unit, claimed: &[(UnitId, CellId)]) -> BattleResult<()> {
        unit.validate()?;
        if self.units.contains(unit.id) || claimed.iter().any(|(id, _)| *id == unit.id) {
            return Err(BattleError::DuplicateUnit { id: unit.id });
        }
        let cell = self
            .grid
            .cell(unit.cell())
            .ok_or(BattleError::UnknownCell { id: unit.cell() })?;
        if let Some(occupant) = cell.occupant().filter(|o| *o != unit.id) {
            return Err(BattleError::CellOccupied { cell: cell.id, occupant });
        }
        if let Some((occupant, _)) = claimed.iter().find(|(_, c)| *c == cell.id) {
            return Err(BattleError::CellOccupied {
                cell: cell.id,
                occupant: *occupant,
            });
        }
        Ok(())
    }

    fn insert_unit(&mut self, mut unit: Unit) -> BattleResult<()> {
        let id = unit.id;
        self.grid.place(id, unit.cell())?;
        self.arm_innate_statuses(&mut unit);
        match unit.faction {
            Faction::Player => self.player_units.push(id),
            Faction::Enemy => self.enemy_units.push(id),
            Faction::Neutral => self.neutral_units.push(id),
        }
        self.units.insert(unit)
    }

    /// Shield and Regeneration traits work through permanent statuses.
    fn arm_innate_statuses(&self, unit: &mut Unit) {
        if let Some(charges) = unit.traits.magnitude_or(TraitKind::Shield, 1) {
            unit.apply_status(StatusEffect::permanent(StatusKind::Shield, charges));
        }
        if let Some(amount) = unit
            .traits
            .magnitude_or(TraitKind::Regeneration, self.config.regeneration_amount)
        {
            unit.apply_status(StatusEffect::permanent(StatusKind::Regenerating, amount));
        }
    }

    // ==========================================
    // BATTLE FLOW
    // ==========================================

    /// Check the layout and compute the action order for the coming pass.
    pub fn start_battle(&mut self) -> BattleResult<&[UnitId]> {
        match self.state {
            BattleState::Finished => return Err(BattleError::BattleFinished),
            BattleState::Acting => return Err(BattleError::WrongState),
            BattleState::Idle | BattleState::Ordering => {}
        }
        self.validate_layout()?;
        self.refresh_bonuses();

        self.action_order = action_order(&self.units);
        let names: Vec<String> = self
            .action_order
            .iter()
            .map(|id| self.name_of(*id))
            .collect();
        self.push_log(format!("Battle order: {}", names.join(", ")));
        log::info(&format!("battle order computed for {} units", self.action_order.len()));

        self.state = BattleState::Ordering;
        self.emit(CombatEvent::BattleOrderComputed {
            order: self.action_order.clone(),
        });
        self.emit(CombatEvent::BattleStarted);
        Ok(&self.action_order)
    }

    /// Walk the action order once. Stops early as soon as one side is wiped out.
    pub fn run_pass(&mut self) -> BattleResult<PassReport> {
        match self.state {
            BattleState::Ordering => {}
            BattleState::Finished => return Err(BattleError::BattleFinished),
            BattleState::Idle | BattleState::Acting => return Err(BattleError::WrongState),
        }
        self.state = BattleState::Acting;
        let first_event = self.events.len();
        let mut acted = Vec::new();

        if let Some(outcome) = self.check_termination() {
            self.finish(outcome);
            return Ok(self.pass_report(first_event, acted));
        }

        let order = self.action_order.clone();
        for id in order {
            let Some(unit) = self.units.get(id) else {
                continue;
            };
            if !unit.is_alive() {
                let line = format!("{} is already defeated, skipped", unit.name);
                self.push_log(line);
                continue;
            }

            if self.take_turn(id) {
                acted.push(id);
            }

            if let Some(outcome) = self.check_termination() {
                self.finish(outcome);
                return Ok(self.pass_report(first_event, acted));
            }
        }

        self.end_pass();
        self.state = BattleState::Ordering;
        Ok(self.pass_report(first_event, acted))
    }

    /// One unit's turn. Returns true if the unit got to act.
    fn take_turn(&mut self, id: UnitId) -> bool {
        log::action("turn", &format!("{}", id));
        self.emit(CombatEvent::UnitActionStart { unit: id });

        let (survived, stunned) = self.start_turn(id);
        if !survived {
            self.emit(CombatEvent::UnitActionEnd { unit: id });
            return false;
        }
        if stunned {
            self.push_log(format!("{} is stunned and loses the turn", self.name_of(id)));
            self.emit(CombatEvent::UnitActionEnd { unit: id });
            return false;
        }

        let candidates: Vec<UnitId> = self.units.iter().map(|u| u.id).collect();
        let target = match self.units.get(id) {
            Some(attacker) => {
                select_target(attacker, &candidates, &self.units, &self.grid, &mut self.rng)
            }
            None => None,
        };

        match target {
            None => {
                self.push_log(format!("{} found no target", self.name_of(id)));
                self.emit(CombatEvent::UnitAttacked {
                    attacker: id,
                    target: None,
                    damage: 0,
                    remaining_hp: None,
                });
            }
            Some(target_id) => self.perform_attack(id, target_id),
        }

        if let Some(unit) = self.units.get_mut(id) {
            unit.has_acted_this_pass = true;
        }
        self.emit(CombatEvent::UnitActionEnd { unit: id });
        true
    }

    /// Fire turn-start hooks. Returns (still alive, stunned).
    fn start_turn(&mut self, id: UnitId) -> (bool, bool) {
        let statuses = match self.units.get(id) {
            Some(unit) => unit.status_effects.clone(),
            None => return (false, false),
        };

        let mut stunned = false;
        for status in statuses {
            match status.fire(StatusHook::TurnStart) {
                HookOutcome::Damage(amount) => {
                    let Some(unit) = self.units.get_mut(id) else {
                        break;
                    };
                    let died = unit.take_damage(amount);
                    let line = format!(
                        "{} suffers {} {} damage ({} hp left)",
                        unit.name,
                        amount,
                        status.kind.as_str(),
                        unit.hp()
                    );
                    self.push_log(line);
                    if died {
                        self.handle_death(id);
                        return (false, false);
                    }
                }
                HookOutcome::Heal(amount) => {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.heal(amount);
                    }
                }
                HookOutcome::SkipTurn => stunned = true,
                HookOutcome::Nothing => {}
            }
        }
        (true, stunned)
    }

    fn perform_attack(&mut self, attacker_id: UnitId, target_id: UnitId) {
        let Some((attacker, target)) = self.units.pair_mut(attacker_id, target_id) else {
            log::warn(&format!("attack between {} and {} skipped", attacker_id, target_id));
            return;
        };
        let report = resolve_attack(attacker, target, &self.grid, &self.config);
        let (attacker_name, target_name) = (attacker.name.clone(), target.name.clone());
        let target_hp = target.hp();
        let attacker_hp = attacker.hp();

        self.log_attack(&attacker_name, &target_name, target_hp, attacker_hp, &report);
        self.emit(CombatEvent::UnitAttacked {
            attacker: attacker_id,
            target: Some(target_id),
            damage: report.damage_dealt,
            remaining_hp: Some(target_hp),
        });

        if let Some(shield) = report.broken_shield {
            self.fire_status_hook(target_id, shield, StatusHook::Remove);
        }
        if report.target_died {
            self.handle_death(target_id);
        }
        if report.attacker_died {
            self.handle_death(attacker_id);
        }
    }

    fn log_attack(
        &mut self,
        attacker: &str,
        target: &str,
        target_hp: i32,
        attacker_hp: i32,
        report: &AttackReport,
    ) {
        let strikes = if report.hits.len() > 1 { " twice" } else { "" };
        let backstab = if report.backstab { " from behind" } else { "" };
        self.push_log(format!(
            "{} attacks {}{}{} for {} damage ({} hp left)",
            attacker, target, strikes, backstab, report.damage_dealt, target_hp
        ));
        if report.hits.iter().any(|h| h.blocked) {
            let line = if report.broken_shield.is_some() {
                format!("{}'s shield blocks the blow and breaks", target)
            } else {
                format!("{}'s shield blocks the blow", target)
            };
            self.push_log(line);
        }
        if report.healed > 0 {
            self.push_log(format!("{} heals {} hp", attacker, report.healed));
        }
        if report.poisoned {
            self.push_log(format!("{} is poisoned", target));
        }
        if report.counter_damage > 0 {
            self.push_log(format!(
                "{} counters {} for {} damage ({} hp left)",
                target, attacker, report.counter_damage, attacker_hp
            ));
        }
    }

    /// Log, notify and refresh line bonuses for a unit that just reached 0 hp.
    fn handle_death(&mut self, id: UnitId) {
        let Some(unit) = self.units.get(id) else {
            return;
        };
        let on_death = unit.traits.magnitude_or(TraitKind::OnDeathTrigger, 0);
        let line = format!("{} has been defeated", unit.name);
        self.push_log(line);
        self.emit(CombatEvent::UnitDied { unit: id, on_death });
        self.refresh_bonuses();
    }

    /// Turn-end hooks, duration ticks and per-pass flags, once per full pass.
    fn end_pass(&mut self) {
        let living: Vec<UnitId> = self.units.living().map(|u| u.id).collect();
        for id in living {
            let statuses = match self.units.get(id) {
                Some(unit) => unit.status_effects.clone(),
                None => continue,
            };
            for status in statuses {
                self.fire_status_hook(id, status, StatusHook::TurnEnd);
            }

            let Some(unit) = self.units.get_mut(id) else {
                continue;
            };
            for status in unit.tick_statuses() {
                self.fire_status_hook(id, status, StatusHook::Remove);
            }
        }

        for unit in self.units.iter_mut() {
            unit.has_acted_this_pass = false;
        }
    }

    fn fire_status_hook(&mut self, id: UnitId, status: StatusEffect, hook: StatusHook) {
        if hook == StatusHook::Remove {
            if let Some(name) = self.units.get(id).map(|u| u.name.clone()) {
                self.push_log(format!("{}'s {} wore off", name, status.kind.as_str()));
            }
        }
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        match status.fire(hook) {
            HookOutcome::Heal(amount) => {
                let healed = unit.heal(amount);
                if healed > 0 {
                    let line = format!("{} regenerates {} hp", unit.name, healed);
                    self.push_log(line);
                }
            }
            HookOutcome::Damage(amount) => {
                if unit.take_damage(amount) {
                    self.handle_death(id);
                }
            }
            HookOutcome::SkipTurn | HookOutcome::Nothing => {}
        }
    }

    fn check_termination(&self) -> Option<BattleOutcome> {
        let all_dead = |roster: &[UnitId]| {
            roster
                .iter()
                .all(|id| self.units.get(*id).map_or(true, |u| !u.is_alive()))
        };
        if all_dead(&self.enemy_units) {
            Some(BattleOutcome::Victory)
        } else if all_dead(&self.player_units) {
            Some(BattleOutcome::Defeat)
        } else {
            None
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        self.state = BattleState::Finished;
        self.outcome = outcome;
        self.push_log(format!("Battle ended: {}", outcome.as_str()));
        log::info(&format!("battle finished with {}", outcome.as_str()));
        self.emit(CombatEvent::BattleEnded { outcome });
    }

    fn pass_report(&self, first_event: usize, acted: Vec<UnitId>) -> PassReport {
        PassReport {
            outcome: self.outcome,
            events: self.events[first_event..].to_vec(),
            acted,
            log: self.log.clone(),
        }
    }

    // ==========================================
    // HELPERS
    // ==========================================

    /// Every unit must sit on an existing cell that names it as occupant,
    /// and every occupied cell must name a registered unit.
    fn validate_layout(&self) -> BattleResult<()> {
        for unit in self.units.iter() {
            unit.validate()?;
            let cell = self
                .grid
                .cell(unit.cell())
                .ok_or(BattleError::UnknownCell { id: unit.cell() })?;
            if cell.occupant() != Some(unit.id) {
                return Err(BattleError::OccupantMismatch {
                    unit: unit.id,
                    cell: cell.id,
                });
            }
        }
        for cell in self.grid.cells() {
            if let Some(occupant) = cell.occupant() {
                if !self.units.contains(occupant) {
                    return Err(BattleError::UnknownUnit { id: occupant });
                }
            }
        }
        Ok(())
    }

    fn refresh_bonuses(&mut self) {
        self.grid = recompute_bonuses(&self.grid, &self.units, &self.config);
    }

    fn name_of(&self, id: UnitId) -> String {
        self.units
            .get(id)
            .map_or_else(|| format!("{}", id), |u| u.name.clone())
    }

    fn push_log(&mut self, line: String) {
        log::debug("battle", &line);
        self.log.push(line);
    }

    fn emit(&mut self, event: CombatEvent) {
        self.bus.publish(&event);
        self.events.push(event);
    }
}
