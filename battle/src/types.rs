//! Shared identifiers and small enums used across the engine.

use core::fmt;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Stable identifier of a unit for the duration of a battle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a grid cell, numbered from 1 in row-major order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CellId(pub u16);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

impl Faction {
    /// Tie-break rank in the action order. Friendlier factions act first.
    pub const fn precedence(self) -> u8 {
        match self {
            Faction::Player => 0,
            Faction::Neutral => 1,
            Faction::Enemy => 2,
        }
    }

    /// Player and Enemy oppose each other; Neutral units oppose everyone else.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Faction::Player => "PLAYER",
            Faction::Enemy => "ENEMY",
            Faction::Neutral => "NEUTRAL",
        }
    }
}

/// Combat role. Drives targeting and line bonuses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Melee,
    Ranged,
}

/// Cardinal facing on the grid. `North` is towards row 0.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Column/row step for one cell in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// The four directions in clockwise order, starting with `self`.
    pub fn clockwise_from(self) -> [Direction; 4] {
        let second = self.clockwise();
        let third = second.clockwise();
        [self, second, third, third.clockwise()]
    }
}

/// Result of a battle pass.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    TypeInfo,
    MaxEncodedLen,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Undecided,
}

impl BattleOutcome {
    pub const fn is_decided(self) -> bool {
        !matches!(self, BattleOutcome::Undecided)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BattleOutcome::Victory => "VICTORY",
            BattleOutcome::Defeat => "DEFEAT",
            BattleOutcome::Undecided => "UNDECIDED",
        }
    }
}
