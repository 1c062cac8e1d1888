//! Tunable battle constants.

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, BattleResult};

/// Default line bonus (K) granted to every cell of a qualifying row or column
pub const DEFAULT_LINE_BONUS: i32 = 2;
/// Extra damage on the first hit of a backstab
pub const DEFAULT_BACKSTAB_BONUS: i32 = 2;
/// Passes a freshly applied poison lasts
pub const DEFAULT_POISON_DURATION: i32 = 2;
/// Poison damage per turn when the Poison trait has no magnitude
pub const DEFAULT_POISON_DAMAGE: i32 = 1;
/// End-of-pass heal when the Regeneration trait has no magnitude
pub const DEFAULT_REGENERATION: i32 = 1;
/// Fewest living units a line needs before it grants anything
pub const MIN_LINE_UNITS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleConfig {
    pub line_bonus: i32,
    pub backstab_bonus: i32,
    pub poison_duration: i32,
    pub poison_damage: i32,
    pub regeneration_amount: i32,
    pub min_line_units: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            line_bonus: DEFAULT_LINE_BONUS,
            backstab_bonus: DEFAULT_BACKSTAB_BONUS,
            poison_duration: DEFAULT_POISON_DURATION,
            poison_damage: DEFAULT_POISON_DAMAGE,
            regeneration_amount: DEFAULT_REGENERATION,
            min_line_units: MIN_LINE_UNITS,
        }
    }
}

impl BattleConfig {
    /// Parse a JSON config. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> BattleResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            crate::log::warn(&alloc::format!("rejecting battle config: {}", err));
            BattleError::InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BattleResult<()> {
        let constants = [
            self.line_bonus,
            self.backstab_bonus,
            self.poison_damage,
            self.regeneration_amount,
        ];
        // Poison must outlive the pass it was applied in.
        if constants.iter().any(|c| *c < 0) || self.poison_duration < 1 {
            return Err(BattleError::InvalidConfig);
        }
        if self.min_line_units < MIN_LINE_UNITS {
            return Err(BattleError::InvalidConfig);
        }
        Ok(())
    }
}
