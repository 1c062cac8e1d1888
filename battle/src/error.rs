//! Error types for battle operations
//!
//! Expected edge conditions (no target, a dead unit reached in the order) are
//! logged no-ops and never surface here. These variants describe malformed
//! input from the deployment side or calls made in the wrong session state.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::status::StatusKind;
use crate::traits::TraitKind;
use crate::types::{CellId, UnitId};

/// Errors raised by the engine
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
    thiserror::Error,
)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BattleError {
    /// No unit with this id is registered
    #[error("unknown unit {id}")]
    UnknownUnit { id: UnitId },
    /// A unit or call referenced a cell outside the grid
    #[error("unknown {id}")]
    UnknownCell { id: CellId },
    /// A unit id was registered twice
    #[error("unit {id} is already registered")]
    DuplicateUnit { id: UnitId },
    /// Tried to place a unit on a cell held by another unit
    #[error("{cell} is already occupied by unit {occupant}")]
    CellOccupied { cell: CellId, occupant: UnitId },
    /// A unit's position and the grid occupancy disagree
    #[error("unit {unit} claims {cell} but the grid disagrees")]
    OccupantMismatch { unit: UnitId, cell: CellId },
    /// Every unit needs at least one numeric tag for ordering
    #[error("unit {id} has no numeric tags")]
    EmptyNumericTags { id: UnitId },
    /// hp must be within 0..=max_hp and max_hp must be positive
    #[error("unit {id} has invalid health {hp}/{max_hp}")]
    InvalidHealth { id: UnitId, hp: i32, max_hp: i32 },
    /// Attack and armor must not be negative
    #[error("unit {id} has invalid stats: attack {attack}, armor {armor}")]
    InvalidStats { id: UnitId, attack: i32, armor: i32 },
    /// Trait magnitudes must not be negative
    #[error("unit {id} has a negative {kind:?} magnitude {magnitude}")]
    InvalidTrait {
        id: UnitId,
        kind: TraitKind,
        magnitude: i32,
    },
    /// Status duration must be at least -1 (permanent) and its magnitude not negative
    #[error("invalid {kind:?} status for unit {id}: duration {duration}, magnitude {magnitude}")]
    InvalidStatus {
        id: UnitId,
        kind: StatusKind,
        duration: i32,
        magnitude: i32,
    },
    /// Grid side length must be at least 1
    #[error("invalid grid size {size}")]
    InvalidGridSize { size: u16 },
    /// Operation not allowed in the current session state
    #[error("operation not allowed in the current battle state")]
    WrongState,
    /// The battle already has a winner
    #[error("battle is already finished")]
    BattleFinished,
    /// A configuration constant is out of range or failed to parse
    #[error("invalid battle configuration")]
    InvalidConfig,
}

/// Result type alias for battle operations
pub type BattleResult<T> = Result<T, BattleError>;
