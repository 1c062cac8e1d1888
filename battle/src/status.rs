//! Status effects and their lifecycle hooks.
//!
//! Unlike traits, statuses are applied and removed during play. Each one has
//! a remaining duration in passes (`PERMANENT` never decrements) and a
//! magnitude. The engine fires hooks at four points: apply, turn start,
//! turn end and remove.

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Duration marker for effects that never expire on their own
pub const PERMANENT: i32 = -1;

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
pub enum StatusKind {
    /// Loses `magnitude` hp at the start of each turn, ignoring armor
    Poison,
    /// +`magnitude` effective attack
    Empower,
    /// -`magnitude` effective attack
    Weaken,
    /// Loses its action
    Stun,
    /// Blocks the next `magnitude` hits
    Shield,
    /// Heals `magnitude` at the end of each pass
    Regenerating,
}

impl StatusKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusKind::Poison => "Poison",
            StatusKind::Empower => "Empower",
            StatusKind::Weaken => "Weaken",
            StatusKind::Stun => "Stun",
            StatusKind::Shield => "Shield",
            StatusKind::Regenerating => "Regenerating",
        }
    }
}

/// Lifecycle point at which a status hook fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHook {
    Apply,
    TurnStart,
    TurnEnd,
    Remove,
}

/// What a hook asks the engine to do to the carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Nothing,
    /// Direct hp loss, bypassing armor and shields
    Damage(i32),
    Heal(i32),
    SkipTurn,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining_duration: i32,
    pub magnitude: i32,
}

impl StatusEffect {
    pub const fn new(kind: StatusKind, duration: i32, magnitude: i32) -> Self {
        Self {
            kind,
            remaining_duration: duration,
            magnitude,
        }
    }

    pub const fn permanent(kind: StatusKind, magnitude: i32) -> Self {
        Self::new(kind, PERMANENT, magnitude)
    }

    pub const fn is_permanent(&self) -> bool {
        self.remaining_duration == PERMANENT
    }

    pub const fn is_expired(&self) -> bool {
        self.remaining_duration == 0
    }

    /// Duration is `PERMANENT` or a count of passes, magnitude never negative.
    pub const fn is_well_formed(&self) -> bool {
        self.remaining_duration >= PERMANENT && self.magnitude >= 0
    }

    /// Contribution to the carrier's effective attack.
    pub const fn attack_modifier(&self) -> i32 {
        match self.kind {
            StatusKind::Empower => self.magnitude,
            StatusKind::Weaken => self.magnitude.saturating_neg(),
            _ => 0,
        }
    }

    pub fn fire(&self, hook: StatusHook) -> HookOutcome {
        match (hook, self.kind) {
            (StatusHook::TurnStart, StatusKind::Poison) if self.magnitude > 0 => {
                HookOutcome::Damage(self.magnitude)
            }
            (StatusHook::TurnStart, StatusKind::Stun) => HookOutcome::SkipTurn,
            (StatusHook::TurnEnd, StatusKind::Regenerating) if self.magnitude > 0 => {
                HookOutcome::Heal(self.magnitude)
            }
            _ => HookOutcome::Nothing,
        }
    }

    /// Advance one pass. Returns true once the effect has run out.
    pub fn tick(&mut self) -> bool {
        if self.remaining_duration > 0 {
            self.remaining_duration -= 1;
        }
        self.is_expired()
    }

    /// Merge a re-application of the same kind: duration resets, magnitude
    /// keeps the stronger value instead of stacking.
    pub fn refresh(&mut self, incoming: &StatusEffect) {
        self.remaining_duration = incoming.remaining_duration;
        self.magnitude = self.magnitude.max(incoming.magnitude);
    }
}
