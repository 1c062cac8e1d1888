mod properties;
mod session;

use crate::battle::{BattleSession, PassReport};
use crate::config::BattleConfig;
use crate::grid::Grid;
use crate::rng::XorShiftRng;
use crate::types::*;
use crate::units::{Unit, UnitTable};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

const TEST_SEED: u64 = 42;

/// A 10 hp unit with one numeric tag equal to its id.
fn create_unit(id: u32, faction: Faction, role: Role, attack: i32, cell: u16) -> Unit {
    let name = match faction {
        Faction::Player => format!("P{}", id),
        Faction::Enemy => format!("E{}", id),
        Faction::Neutral => format!("N{}", id),
    };
    Unit::new(UnitId(id), &name, faction, role, 10, attack, CellId(cell)).with_tags(&[id as i32])
}

fn player(id: u32, role: Role, attack: i32, cell: u16) -> Unit {
    create_unit(id, Faction::Player, role, attack, cell)
}

fn enemy(id: u32, role: Role, attack: i32, cell: u16) -> Unit {
    create_unit(id, Faction::Enemy, role, attack, cell)
}

/// Units placed on a standard grid, without a session around them.
fn board(units: Vec<Unit>) -> (Grid, UnitTable) {
    let mut grid = Grid::standard();
    for unit in &units {
        grid.place(unit.id, unit.cell()).unwrap();
    }
    (grid, units.into_iter().collect())
}

fn new_session() -> BattleSession {
    BattleSession::with_rng(
        Grid::standard(),
        BattleConfig::default(),
        XorShiftRng::seed_from_u64(TEST_SEED),
    )
    .unwrap()
}

fn session_with(units: Vec<Unit>) -> BattleSession {
    let mut session = new_session();
    for unit in units {
        session.add_unit(unit).unwrap();
    }
    session
}

/// Start the battle and run one pass.
fn run_pass(session: &mut BattleSession) -> PassReport {
    session.start_battle().unwrap();
    session.run_pass().unwrap()
}

/// Run passes until the battle is decided or `max_passes` is reached.
fn run_battle(session: &mut BattleSession, max_passes: usize) -> BattleOutcome {
    for _ in 0..max_passes {
        let report = run_pass(session);
        if report.outcome.is_decided() {
            return report.outcome;
        }
    }
    session.outcome()
}

fn log_contains(session: &BattleSession, needle: &str) -> bool {
    session.log().iter().any(|line| line.contains(needle))
}
