//! Grid model and positional line bonuses.
//!
//! Cells are numbered from 1 in row-major order, so on a 3x3 board cell 1 is
//! the top-left corner and cell 9 the bottom-right. The standard board is
//! 3x3; the 9x9 variant uses the same rules.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::error::{BattleError, BattleResult};
use crate::types::{CellId, Direction, Role, UnitId};
use crate::units::UnitTable;

/// Side length of the standard board
pub const STANDARD_SIZE: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: CellId,
    pub x: u16,
    pub y: u16,
    /// Level-defined tag. Units deployed here without tags of their own inherit it.
    pub tag: i32,
    occupant: Option<UnitId>,
    pub bonus_attack: i32,
    pub bonus_armor: i32,
}

impl Cell {
    pub fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    size: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// An empty `size` x `size` grid with every tag set to 0.
    pub fn new(size: u16) -> BattleResult<Self> {
        if size == 0 || size.checked_mul(size).is_none() {
            return Err(BattleError::InvalidGridSize { size });
        }
        Ok(Self::build(size))
    }

    pub fn standard() -> Self {
        Self::build(STANDARD_SIZE)
    }

    fn build(size: u16) -> Self {
        let cells = (0..size * size)
            .map(|idx| Cell {
                id: CellId(idx + 1),
                x: idx % size,
                y: idx / size,
                tag: 0,
                occupant: None,
                bonus_attack: 0,
                bonus_armor: 0,
            })
            .collect();
        Self { size, cells }
    }

    /// Assign tags in cell order. Extra tags are ignored, missing ones stay 0.
    pub fn with_tags(mut self, tags: &[i32]) -> Self {
        for (cell, tag) in self.cells.iter_mut().zip(tags) {
            cell.tag = *tag;
        }
        self
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        let idx = usize::from(id.0).checked_sub(1)?;
        self.cells.get(idx)
    }

    fn cell_mut(&mut self, id: CellId) -> BattleResult<&mut Cell> {
        usize::from(id.0)
            .checked_sub(1)
            .and_then(|idx| self.cells.get_mut(idx))
            .ok_or(BattleError::UnknownCell { id })
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        let size = i32::from(self.size);
        if x < 0 || y < 0 || x >= size || y >= size {
            return None;
        }
        self.cells.get((y * size + x) as usize)
    }

    /// The cell one step from `id` in `direction`, if it is on the board.
    pub fn neighbor(&self, id: CellId, direction: Direction) -> Option<CellId> {
        let cell = self.cell(id)?;
        let (dx, dy) = direction.delta();
        self.cell_at(i32::from(cell.x) + dx, i32::from(cell.y) + dy)
            .map(|c| c.id)
    }

    /// Edge-sharing neighbours only; diagonals do not count.
    pub fn are_adjacent(&self, a: CellId, b: CellId) -> bool {
        match (self.cell(a), self.cell(b)) {
            (Some(a), Some(b)) => a.x.abs_diff(b.x) + a.y.abs_diff(b.y) == 1,
            _ => false,
        }
    }

    /// Walk from `from` (exclusive) to the board edge in `direction`.
    pub fn ray(&self, from: CellId, direction: Direction) -> impl Iterator<Item = &Cell> + '_ {
        let mut cursor = self.cell(from).map(|c| c.id);
        core::iter::from_fn(move || {
            let next = self.neighbor(cursor?, direction)?;
            cursor = Some(next);
            self.cell(next)
        })
    }

    /// Direction of the straight line from `from` to `to`, if they share a row or column.
    pub fn direction_between(&self, from: CellId, to: CellId) -> Option<Direction> {
        let (a, b) = (self.cell(from)?, self.cell(to)?);
        match (a.x == b.x, a.y == b.y) {
            (true, false) if b.y < a.y => Some(Direction::North),
            (true, false) => Some(Direction::South),
            (false, true) if b.x > a.x => Some(Direction::East),
            (false, true) => Some(Direction::West),
            _ => None,
        }
    }

    pub fn place(&mut self, unit: UnitId, cell: CellId) -> BattleResult<()> {
        let target = self.cell_mut(cell)?;
        match target.occupant {
            Some(occupant) if occupant != unit => {
                Err(BattleError::CellOccupied { cell, occupant })
            }
            _ => {
                target.occupant = Some(unit);
                Ok(())
            }
        }
    }

    pub fn clear(&mut self, cell: CellId) -> BattleResult<Option<UnitId>> {
        Ok(self.cell_mut(cell)?.occupant.take())
    }

    fn row_ids(&self, y: u16) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().filter(move |c| c.y == y).map(|c| c.id)
    }

    fn column_ids(&self, x: u16) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().filter(move |c| c.x == x).map(|c| c.id)
    }
}

/// Which bonus a line earns from its living occupants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineBonus {
    None,
    Attack,
    Armor,
}

fn evaluate_line(
    grid: &Grid,
    cells: impl Iterator<Item = CellId>,
    units: &UnitTable,
    min_units: usize,
) -> LineBonus {
    let roles: Vec<Role> = cells
        .filter_map(|id| grid.cell(id)?.occupant)
        .filter_map(|uid| units.get(uid))
        .filter(|u| u.is_alive())
        .map(|u| u.role)
        .collect();

    if roles.len() < min_units {
        return LineBonus::None;
    }
    if roles.iter().all(|r| *r == roles[0]) {
        LineBonus::Attack
    } else {
        LineBonus::Armor
    }
}

/// Reset every cell's bonuses and recompute them from the living occupants.
///
/// Each row and each column is judged on its own. A line holding at least
/// `config.min_line_units` living units grants `config.line_bonus` attack to
/// all of its cells when the units share a role, armor otherwise. Row and
/// column grants stack on the cells where they cross.
pub fn recompute_bonuses(grid: &Grid, units: &UnitTable, config: &BattleConfig) -> Grid {
    let mut next = grid.clone();
    for cell in next.cells.iter_mut() {
        cell.bonus_attack = 0;
        cell.bonus_armor = 0;
    }

    let mut grants: Vec<(CellId, LineBonus)> = Vec::new();
    for line in 0..grid.size {
        let row = evaluate_line(grid, grid.row_ids(line), units, config.min_line_units);
        grants.extend(grid.row_ids(line).map(|id| (id, row)));

        let column = evaluate_line(grid, grid.column_ids(line), units, config.min_line_units);
        grants.extend(grid.column_ids(line).map(|id| (id, column)));
    }

    for (id, bonus) in grants {
        let Ok(cell) = next.cell_mut(id) else {
            continue;
        };
        match bonus {
            LineBonus::Attack => {
                cell.bonus_attack = cell.bonus_attack.saturating_add(config.line_bonus)
            }
            LineBonus::Armor => {
                cell.bonus_armor = cell.bonus_armor.saturating_add(config.line_bonus)
            }
            LineBonus::None => {}
        }
    }
    next
}
