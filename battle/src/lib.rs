//! Gridline battle engine.
//!
//! Resolves one battle pass on a square grid: action order from numeric tags,
//! role-based targeting, trait and status resolution, and positional line
//! bonuses. Presentation, persistence and deck handling live outside this
//! crate and talk to it through [`BattleSession`] and the [`EventBus`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod battle;
pub mod combat;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
mod log;
pub mod rng;
pub mod status;
pub mod targeting;
pub mod traits;
pub mod types;
pub mod units;

#[cfg(test)]
mod tests;

pub use battle::{action_order, BattleSession, BattleState, PassReport};
pub use combat::{resolve_attack, AttackReport};
pub use config::BattleConfig;
pub use error::{BattleError, BattleResult};
pub use events::{BattleListener, CombatEvent, EventBus, ListenerId};
pub use grid::{recompute_bonuses, Cell, Grid};
pub use rng::{BattleRng, XorShiftRng};
pub use status::{StatusEffect, StatusKind};
pub use targeting::select_target;
pub use traits::{CombatTrait, TraitKind, TraitSet};
pub use types::*;
pub use units::{Position, Unit, UnitTable};
