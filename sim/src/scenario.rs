//! Scenario files: a board, its units and optional rule overrides.

use std::fs;
use std::path::Path;

use gridline_battle::{
    BattleConfig, BattleResult, BattleSession, CellId, CombatTrait, Direction, Faction, Grid, Role,
    Unit, UnitId, XorShiftRng,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default = "default_grid_size")]
    pub grid_size: u16,
    /// Cell tags in cell order
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub config: BattleConfig,
    pub units: Vec<UnitSpec>,
    /// Enemies that arrive after the first round
    #[serde(default)]
    pub reinforcements: Vec<UnitSpec>,
}

fn default_grid_size() -> u16 {
    3
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSpec {
    pub id: u32,
    pub name: String,
    pub faction: Faction,
    pub role: Role,
    pub max_hp: i32,
    /// Starting hp, full health when absent
    pub hp: Option<i32>,
    pub attack: i32,
    #[serde(default)]
    pub armor: i32,
    pub cell: u16,
    #[serde(default = "default_facing")]
    pub facing: Direction,
    /// Falls back to the cell's tag when empty
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub traits: Vec<CombatTrait>,
}

fn default_facing() -> Direction {
    Direction::North
}

impl UnitSpec {
    pub fn into_unit(self) -> Unit {
        let mut unit = Unit::new(
            UnitId(self.id),
            &self.name,
            self.faction,
            self.role,
            self.max_hp,
            self.attack,
            CellId(self.cell),
        )
        .with_tags(&self.tags)
        .with_armor(self.armor)
        .facing(self.facing);
        if let Some(hp) = self.hp {
            unit = unit.with_hp(hp);
        }
        for entry in self.traits {
            unit = unit.with_trait(entry);
        }
        unit
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&raw)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Build a session with every initial unit deployed.
    pub fn into_session(
        self,
        seed: Option<u64>,
    ) -> BattleResult<(BattleSession, Vec<Unit>)> {
        let grid = Grid::new(self.grid_size)?.with_tags(&self.tags);
        let rng = match seed {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_entropy(),
        };
        let mut session = BattleSession::with_rng(grid, self.config, rng)?;
        for entry in self.units {
            session.add_unit(entry.into_unit())?;
        }
        let reinforcements = self
            .reinforcements
            .into_iter()
            .map(UnitSpec::into_unit)
            .collect();
        Ok((session, reinforcements))
    }
}
