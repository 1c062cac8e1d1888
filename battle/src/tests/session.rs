use crate::battle::BattleState;
use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::events::CombatEvent;
use crate::grid::Grid;
use crate::rng::XorShiftRng;
use crate::tests::*;
use crate::traits::{CombatTrait, TraitKind};
use crate::types::*;
use crate::units::Unit;
use crate::BattleSession;

#[test]
fn test_pass_stops_at_victory() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 10, 5),
        enemy(2, Role::Melee, 5, 2),
    ]);

    let report = run_pass(&mut session);

    assert_eq!(report.outcome, BattleOutcome::Victory);
    assert_eq!(report.acted, vec![UnitId(1)]);
    assert_eq!(session.state(), BattleState::Finished);
    assert!(!report
        .events
        .iter()
        .any(|e| *e == CombatEvent::UnitActionStart { unit: UnitId(2) }));
    assert_eq!(session.unit(UnitId(1)).unwrap().hp(), 10);
    assert!(log_contains(&session, "Battle ended: VICTORY"));
}

#[test]
fn test_pass_ends_in_defeat() {
    let mut session = session_with(vec![
        enemy(1, Role::Melee, 20, 2),
        player(2, Role::Melee, 1, 5),
    ]);

    let report = run_pass(&mut session);

    assert_eq!(report.outcome, BattleOutcome::Defeat);
    assert_eq!(session.outcome(), BattleOutcome::Defeat);
}

#[test]
fn test_mutual_kill_counts_as_victory() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 20, 5),
        enemy(2, Role::Melee, 1, 2).with_trait(CombatTrait::with_magnitude(TraitKind::Counter, 20)),
    ]);

    let report = run_pass(&mut session);

    assert!(!session.unit(UnitId(1)).unwrap().is_alive());
    assert!(!session.unit(UnitId(2)).unwrap().is_alive());
    assert_eq!(report.outcome, BattleOutcome::Victory);
}

#[test]
fn test_dead_units_skipped_in_pass() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 20, 5),
        enemy(2, Role::Ranged, 1, 2),
        enemy(3, Role::Melee, 1, 8),
    ]);

    let report = run_pass(&mut session);

    assert_eq!(report.outcome, BattleOutcome::Undecided);
    assert_eq!(report.acted, vec![UnitId(1), UnitId(3)]);
    assert!(log_contains(&session, "E2 is already defeated, skipped"));
    // E3 gains the column's attack bonus once E2 is gone.
    assert_eq!(session.unit(UnitId(1)).unwrap().hp(), 7);
    assert_eq!(session.state(), BattleState::Ordering);
}

#[test]
fn test_no_target_is_logged_and_reported() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 3, 1),
        enemy(2, Role::Melee, 3, 9),
    ]);

    let report = run_pass(&mut session);

    assert_eq!(report.outcome, BattleOutcome::Undecided);
    assert!(log_contains(&session, "P1 found no target"));
    assert!(log_contains(&session, "E2 found no target"));
    let misses = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::UnitAttacked { target: None, damage: 0, .. }))
        .count();
    assert_eq!(misses, 2);
}

#[test]
fn test_battle_runs_over_several_passes() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 3, 5),
        enemy(2, Role::Melee, 1, 2),
    ]);

    let first = run_pass(&mut session);
    assert_eq!(first.outcome, BattleOutcome::Undecided);
    assert_eq!(session.unit(UnitId(2)).unwrap().hp(), 5);
    assert_eq!(session.unit(UnitId(1)).unwrap().hp(), 7);
    assert!(session.units().iter().all(|u| !u.has_acted_this_pass));

    assert_eq!(run_battle(&mut session, 10), BattleOutcome::Victory);
}

#[test]
fn test_run_pass_requires_order() {
    let mut session = session_with(vec![player(1, Role::Melee, 3, 5)]);
    assert_eq!(session.run_pass(), Err(BattleError::WrongState));
    assert_eq!(session.state(), BattleState::Idle);
}

#[test]
fn test_finished_session_rejects_everything() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 10, 5),
        enemy(2, Role::Melee, 1, 2),
    ]);
    run_pass(&mut session);

    assert_eq!(session.start_battle().err(), Some(BattleError::BattleFinished));
    assert_eq!(session.run_pass(), Err(BattleError::BattleFinished));
    assert_eq!(
        session.add_unit(player(3, Role::Melee, 1, 9)),
        Err(BattleError::BattleFinished)
    );
    assert_eq!(
        session.remove_unit(UnitId(1)).err(),
        Some(BattleError::BattleFinished)
    );
}

#[test]
fn test_add_unit_validation() {
    let mut session = session_with(vec![player(1, Role::Melee, 3, 5)]);

    let untagged = Unit::new(UnitId(2), "Blank", Faction::Enemy, Role::Melee, 10, 1, CellId(12));
    assert_eq!(
        session.add_unit(untagged),
        Err(BattleError::EmptyNumericTags { id: UnitId(2) })
    );
    assert_eq!(
        session.add_unit(player(1, Role::Melee, 3, 6)),
        Err(BattleError::DuplicateUnit { id: UnitId(1) })
    );
    assert_eq!(
        session.add_unit(enemy(3, Role::Melee, 3, 5)),
        Err(BattleError::CellOccupied {
            cell: CellId(5),
            occupant: UnitId(1)
        })
    );
    assert_eq!(
        session.add_unit(enemy(4, Role::Melee, 3, 10)),
        Err(BattleError::UnknownCell { id: CellId(10) })
    );
    assert_eq!(
        session.add_unit(enemy(5, Role::Melee, 3, 2).with_hp(11)),
        Err(BattleError::InvalidHealth {
            id: UnitId(5),
            hp: 11,
            max_hp: 10
        })
    );

    assert_eq!(session.units().len(), 1);
    assert_eq!(session.grid().cells().iter().filter(|c| c.is_occupied()).count(), 1);
}

#[test]
fn test_invalid_config_rejected() {
    let config = BattleConfig {
        poison_duration: 0,
        ..BattleConfig::default()
    };
    let result = BattleSession::with_rng(Grid::standard(), config, XorShiftRng::seed_from_u64(1));
    assert_eq!(result.err(), Some(BattleError::InvalidConfig));
}

#[test]
fn test_start_rejects_unknown_occupant() {
    let mut grid = Grid::standard();
    grid.place(UnitId(99), CellId(3)).unwrap();
    let mut session =
        BattleSession::with_rng(grid, BattleConfig::default(), XorShiftRng::seed_from_u64(1))
            .unwrap();
    session.add_unit(player(1, Role::Melee, 3, 5)).unwrap();

    assert_eq!(
        session.start_battle().err(),
        Some(BattleError::UnknownUnit { id: UnitId(99) })
    );
    assert_eq!(session.state(), BattleState::Idle);
}

#[test]
fn test_prepositioned_unit_accepted() {
    let mut grid = Grid::standard();
    grid.place(UnitId(1), CellId(5)).unwrap();
    let mut session =
        BattleSession::with_rng(grid, BattleConfig::default(), XorShiftRng::seed_from_u64(1))
            .unwrap();

    session.add_unit(player(1, Role::Melee, 3, 5)).unwrap();
    assert!(session.start_battle().is_ok());
}

#[test]
fn test_spawn_enemies_is_all_or_nothing() {
    let mut session = session_with(vec![player(1, Role::Melee, 3, 5)]);

    let result = session.spawn_enemies(vec![
        enemy(2, Role::Melee, 1, 2),
        enemy(3, Role::Melee, 1, 2),
    ]);
    assert_eq!(
        result,
        Err(BattleError::CellOccupied {
            cell: CellId(2),
            occupant: UnitId(2)
        })
    );
    assert_eq!(session.units().len(), 1);
    assert!(session.enemy_units().is_empty());

    session
        .spawn_enemies(vec![enemy(2, Role::Melee, 1, 2), player(3, Role::Ranged, 1, 8)])
        .unwrap();
    assert_eq!(session.enemy_units(), &[UnitId(2), UnitId(3)]);
    assert_eq!(session.unit(UnitId(3)).unwrap().faction, Faction::Enemy);
    assert_eq!(
        session.events().last(),
        Some(&CombatEvent::EnemiesSpawned {
            units: vec![UnitId(2), UnitId(3)]
        })
    );
}

#[test]
fn test_remove_unit_frees_cell_and_bonuses() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 3, 1),
        player(2, Role::Melee, 3, 2),
        enemy(3, Role::Melee, 1, 9),
    ]);
    assert_eq!(session.grid().cell(CellId(1)).unwrap().bonus_attack, 2);

    let removed = session.remove_unit(UnitId(2)).unwrap();
    assert_eq!(removed.id, UnitId(2));
    assert!(!session.grid().cell(CellId(2)).unwrap().is_occupied());
    assert_eq!(session.grid().cell(CellId(1)).unwrap().bonus_attack, 0);
    assert_eq!(session.player_units(), &[UnitId(1)]);
    assert_eq!(
        session.remove_unit(UnitId(2)).err(),
        Some(BattleError::UnknownUnit { id: UnitId(2) })
    );
}

#[test]
fn test_neutral_units_never_decide_battle() {
    let mut session = session_with(vec![
        player(1, Role::Melee, 20, 5),
        enemy(2, Role::Melee, 1, 9),
        create_unit(3, Faction::Neutral, Role::Melee, 1, 4),
    ]);

    let report = run_pass(&mut session);

    assert!(!session.unit(UnitId(3)).unwrap().is_alive());
    assert_eq!(report.outcome, BattleOutcome::Undecided);
    assert_eq!(session.neutral_units(), &[UnitId(3)]);
}

#[test]
fn test_negative_stats_rejected() {
    let mut session = session_with(vec![player(1, Role::Melee, 3, 5)]);

    assert_eq!(
        session.add_unit(player(2, Role::Melee, -4, 4).with_armor(-3)),
        Err(BattleError::InvalidStats {
            id: UnitId(2),
            attack: -4,
            armor: -3
        })
    );
    let spiteful =
        enemy(3, Role::Melee, 1, 2).with_trait(CombatTrait::with_magnitude(TraitKind::Counter, -2));
    assert_eq!(
        session.add_unit(spiteful),
        Err(BattleError::InvalidTrait {
            id: UnitId(3),
            kind: TraitKind::Counter,
            magnitude: -2
        })
    );
    assert_eq!(
        session.spawn_enemies(vec![enemy(4, Role::Melee, 0, 3).with_armor(-1)]),
        Err(BattleError::InvalidStats {
            id: UnitId(4),
            attack: 0,
            armor: -1
        })
    );

    assert_eq!(session.units().len(), 1);
    assert_eq!(session.grid().cells().iter().filter(|c| c.is_occupied()).count(), 1);
}

#[test]
fn test_untagged_unit_inherits_cell_tag() {
    let grid = Grid::standard().with_tags(&[7, 0, 0, 0, 0, 0, 0, 0, 3]);
    let mut session =
        BattleSession::with_rng(grid, BattleConfig::default(), XorShiftRng::seed_from_u64(1))
            .unwrap();
    let scout = Unit::new(UnitId(1), "Scout", Faction::Player, Role::Ranged, 10, 1, CellId(1));
    let raider = Unit::new(UnitId(2), "Raider", Faction::Enemy, Role::Ranged, 10, 1, CellId(9));
    session.add_unit(scout).unwrap();
    session.spawn_enemies(vec![raider]).unwrap();

    assert_eq!(session.unit(UnitId(1)).unwrap().numeric_tags, vec![7]);
    assert_eq!(session.unit(UnitId(2)).unwrap().numeric_tags, vec![3]);
    assert_eq!(session.start_battle().unwrap(), &[UnitId(2), UnitId(1)]);

    // Explicit tags win over the cell's.
    let mut session = new_session();
    session.add_unit(player(5, Role::Melee, 1, 9).with_tags(&[-2])).unwrap();
    assert_eq!(session.unit(UnitId(5)).unwrap().numeric_tags, vec![-2]);
}

#[test]
fn test_huge_attack_with_line_bonus_does_not_overflow() {
    let mut session = session_with(vec![
        player(1, Role::Melee, i32::MAX, 4),
        player(3, Role::Melee, 1, 5),
        enemy(2, Role::Melee, 1, 1),
    ]);
    // Row and column both hold only melee units.
    assert_eq!(session.grid().cell(CellId(4)).unwrap().bonus_attack, 4);

    let report = run_pass(&mut session);

    assert_eq!(report.outcome, BattleOutcome::Victory);
    assert!(report.events.contains(&CombatEvent::UnitAttacked {
        attacker: UnitId(1),
        target: Some(UnitId(2)),
        damage: 10,
        remaining_hp: Some(0),
    }));
}
