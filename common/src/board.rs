use itertools::{Itertools, iproduct};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::ConfigError;

/// Adjacency value stored for mine cells.
pub const MINE_SENTINEL: i8 = -1;

/// Largest accepted board side.
pub const MAX_BOARD_SIZE: usize = 1024;

/// Largest mine budget a `size`x`size` board can hold while keeping one safe
/// cell.
pub fn max_mines(size: usize) -> Result<usize, ConfigError> {
    if size == 0 {
        return Err(ConfigError::EmptyBoard);
    }
    if size > MAX_BOARD_SIZE {
        return Err(ConfigError::BoardTooLarge {
            size,
            max: MAX_BOARD_SIZE,
        });
    }
    Ok(size * size - 1)
}

/// Represents a 2D coordinate on the minesweeper board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// What lies under a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Mine,
}

/// The square grid of a single round: the hidden mine layout, the derived
/// adjacency counts, and what the player has revealed or flagged so far.
///
/// Grids are indexed `[row][col]`. Every mutator keeps the invariants:
/// a cell is never both revealed and flagged, reveals never revert, and
/// the counts always match the current layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    mine_budget: usize,
    cells: Vec<Vec<CellKind>>,
    counts: Vec<Vec<i8>>,
    revealed: Vec<Vec<bool>>,
    flagged: Vec<Vec<bool>>,
}

impl Board {
    /// Creates an empty `size`x`size` board that will hold `mine_budget` mines
    /// once generated.
    pub fn new(size: usize, mine_budget: usize) -> Result<Self, ConfigError> {
        let max = max_mines(size)?;
        if mine_budget == 0 || mine_budget > max {
            return Err(ConfigError::MineBudget {
                mines: mine_budget,
                size,
                max,
            });
        }
        Ok(Board {
            size,
            mine_budget,
            cells: vec![vec![CellKind::Empty; size]; size],
            counts: vec![vec![0; size]; size],
            revealed: vec![vec![false; size]; size],
            flagged: vec![vec![false; size]; size],
        })
    }

    /// Builds a board with mines at exactly the given coordinates. The mine
    /// budget is the number of mines listed.
    pub fn with_mines(size: usize, mines: &[Point]) -> Result<Self, ConfigError> {
        let mut board = Board::new(size, mines.len())?;
        let mut seen = HashSet::new();
        for &mine in mines {
            if !board.in_bounds(mine) {
                return Err(ConfigError::MineOutOfBounds(mine));
            }
            if !seen.insert(mine) {
                return Err(ConfigError::DuplicateMine(mine));
            }
        }
        board.lay_mines(mines.iter().copied());
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mine_budget(&self) -> usize {
        self.mine_budget
    }

    pub fn in_bounds(&self, at: Point) -> bool {
        at.row < self.size && at.col < self.size
    }

    pub fn cell_kind(&self, at: Point) -> CellKind {
        self.cells[at.row][at.col]
    }

    pub fn is_mine(&self, at: Point) -> bool {
        self.cell_kind(at) == CellKind::Mine
    }

    /// Number of mines around `at`, or [`MINE_SENTINEL`] if `at` is a mine.
    pub fn adjacent_mines(&self, at: Point) -> i8 {
        self.counts[at.row][at.col]
    }

    pub fn is_revealed(&self, at: Point) -> bool {
        self.revealed[at.row][at.col]
    }

    pub fn is_flagged(&self, at: Point) -> bool {
        self.flagged[at.row][at.col]
    }

    /// Hidden means not yet revealed, flagged or not.
    pub fn is_hidden(&self, at: Point) -> bool {
        !self.is_revealed(at)
    }

    /// All coordinates in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        (0..self.size)
            .cartesian_product(0..self.size)
            .map(|(row, col)| Point { row, col })
    }

    /// The up-to-8 in-bounds neighbours of `at`, scanned top-left to bottom-right.
    pub fn neighbors(&self, at: Point) -> impl Iterator<Item = Point> + use<> {
        let size = self.size as isize;
        iproduct!(-1isize..=1, -1isize..=1).filter_map(move |(dr, dc)| {
            if dr == 0 && dc == 0 {
                return None;
            }
            let row = at.row as isize + dr;
            let col = at.col as isize + dc;
            if row >= 0 && row < size && col >= 0 && col < size {
                Some(Point {
                    row: row as usize,
                    col: col as usize,
                })
            } else {
                None
            }
        })
    }

    pub fn mine_count(&self) -> usize {
        self.points().filter(|&p| self.is_mine(p)).count()
    }

    pub fn flag_count(&self) -> usize {
        self.flagged.iter().flatten().filter(|&&f| f).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().flatten().filter(|&&r| r).count()
    }

    pub fn any_revealed(&self) -> bool {
        self.revealed.iter().flatten().any(|&r| r)
    }

    /// Flags the player may still place.
    pub fn remaining_flags(&self) -> usize {
        self.mine_budget.saturating_sub(self.flag_count())
    }

    /// Flips the flag on a hidden cell. Placing a new flag is refused once the
    /// flag budget is spent. Returns whether anything changed.
    pub fn toggle_flag(&mut self, at: Point) -> bool {
        if !self.in_bounds(at) || self.is_revealed(at) {
            return false;
        }
        if !self.is_flagged(at) && self.remaining_flags() == 0 {
            return false;
        }
        let flag = &mut self.flagged[at.row][at.col];
        *flag = !*flag;
        true
    }

    /// Removes a flag if present. Returns whether one was removed.
    pub fn clear_flag(&mut self, at: Point) -> bool {
        if !self.in_bounds(at) || !self.is_flagged(at) {
            return false;
        }
        self.flagged[at.row][at.col] = false;
        true
    }

    /// Exposes every mine, used when the round is lost.
    pub fn reveal_all_mines(&mut self) {
        for p in self.points() {
            if self.is_mine(p) {
                self.reveal(p);
            }
        }
    }

    /// True once every non-mine cell has been revealed. Flags play no part.
    pub fn is_won(&self) -> bool {
        self.points().all(|p| self.is_mine(p) || self.is_revealed(p))
    }

    /// Marks a single cell revealed and drops any flag on it.
    pub(crate) fn reveal(&mut self, at: Point) {
        self.revealed[at.row][at.col] = true;
        self.flagged[at.row][at.col] = false;
    }

    /// Replaces the mine layout and recomputes every count. Refused once play
    /// has revealed anything, since the layout is frozen from then on.
    pub(crate) fn lay_mines(&mut self, mines: impl IntoIterator<Item = Point>) -> bool {
        if self.any_revealed() {
            log::warn!("refusing to move mines after cells have been revealed");
            return false;
        }
        for row in self.cells.iter_mut() {
            row.fill(CellKind::Empty);
        }
        for mine in mines {
            self.cells[mine.row][mine.col] = CellKind::Mine;
        }
        self.recompute_counts();
        true
    }

    fn recompute_counts(&mut self) {
        for p in self.points() {
            let count = if self.is_mine(p) {
                MINE_SENTINEL
            } else {
                self.neighbors(p).filter(|&n| self.is_mine(n)).count() as i8
            };
            self.counts[p.row][p.col] = count;
        }
    }

    /// Checks a board that came from outside, such as deserialized bytes,
    /// against the invariants every mutator maintains.
    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        let max = max_mines(self.size)?;
        if self.mine_budget == 0 || self.mine_budget > max {
            return Err(ConfigError::MineBudget {
                mines: self.mine_budget,
                size: self.size,
                max,
            });
        }
        if !is_square(&self.cells, self.size)
            || !is_square(&self.counts, self.size)
            || !is_square(&self.revealed, self.size)
            || !is_square(&self.flagged, self.size)
        {
            return Err(ConfigError::InconsistentBoard("grid is not square"));
        }
        let mines = self.mine_count();
        if mines != self.mine_budget && (mines != 0 || self.any_revealed()) {
            return Err(ConfigError::InconsistentBoard(
                "mine count does not match the budget",
            ));
        }
        if self.flag_count() > self.mine_budget {
            return Err(ConfigError::InconsistentBoard("more flags than mines"));
        }
        if self.points().any(|p| self.is_revealed(p) && self.is_flagged(p)) {
            return Err(ConfigError::InconsistentBoard("flag on a revealed cell"));
        }
        let counts_match = self.points().all(|p| {
            let expected = if self.is_mine(p) {
                MINE_SENTINEL
            } else {
                self.neighbors(p).filter(|&n| self.is_mine(n)).count() as i8
            };
            self.adjacent_mines(p) == expected
        });
        if !counts_match {
            return Err(ConfigError::InconsistentBoard(
                "adjacency counts do not match the layout",
            ));
        }
        Ok(())
    }

    /// Text rendering for terminals. `show_mines` exposes hidden mines.
    pub fn render(&self, show_mines: bool) -> String {
        let mut out = String::from("   ");
        out.push_str(&(0..self.size).map(|c| format!("{:^3}", c)).join(""));
        out.push_str(&format!("\n  +{}\n", "---".repeat(self.size)));

        for row in 0..self.size {
            out.push_str(&format!("{:^2}|", row));
            for col in 0..self.size {
                let p = Point { row, col };
                let glyph = if self.is_revealed(p) || (show_mines && self.is_mine(p)) {
                    match self.adjacent_mines(p) {
                        MINE_SENTINEL => " * ".to_string(),
                        0 => " . ".to_string(),
                        n => format!(" {} ", n),
                    }
                } else if self.is_flagged(p) {
                    " F ".to_string()
                } else {
                    " ■ ".to_string()
                };
                out.push_str(&glyph);
            }
            out.push('\n');
        }
        out
    }
}

fn is_square<T>(grid: &[Vec<T>], size: usize) -> bool {
    grid.len() == size && grid.iter().all(|row| row.len() == size)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Point {
        Point { row, col }
    }

    #[test]
    fn test_new_board_is_empty() {
        // A fresh board has no mines, no reveals and no flags
        let board = Board::new(10, 10).unwrap();
        assert_eq!(board.size(), 10);
        assert_eq!(board.mine_budget(), 10);
        assert_eq!(board.mine_count(), 0);
        assert_eq!(board.revealed_count(), 0);
        assert_eq!(board.remaining_flags(), 10);
        for point in board.points() {
            assert_eq!(board.cell_kind(point), CellKind::Empty);
            assert!(!board.is_flagged(point));
        }
    }

    #[test]
    fn test_new_board_rejects_bad_budgets() {
        assert_eq!(Board::new(0, 1), Err(ConfigError::EmptyBoard));
        assert!(matches!(
            Board::new(3, 0),
            Err(ConfigError::MineBudget { mines: 0, .. })
        ));
        assert!(matches!(
            Board::new(3, 9),
            Err(ConfigError::MineBudget { mines: 9, max: 8, .. })
        ));
        assert!(Board::new(3, 8).is_ok());
    }

    #[test]
    fn test_oversized_board_is_rejected() {
        // Side length whose square overflows usize on 64-bit targets
        assert!(matches!(
            Board::new(1 << 33, 1),
            Err(ConfigError::BoardTooLarge { .. })
        ));
        assert!(matches!(
            Board::new(MAX_BOARD_SIZE + 1, 1),
            Err(ConfigError::BoardTooLarge { .. })
        ));
        assert_eq!(max_mines(MAX_BOARD_SIZE), Ok(MAX_BOARD_SIZE * MAX_BOARD_SIZE - 1));
    }

    #[test]
    fn test_check_accepts_live_boards() {
        let mut board = Board::new(4, 3).unwrap();
        assert_eq!(board.check(), Ok(()));

        let mut board2 = Board::with_mines(4, &[p(0, 0), p(3, 3), p(0, 3)]).unwrap();
        board2.toggle_flag(p(0, 0));
        board2.reveal(p(2, 1));
        assert_eq!(board2.check(), Ok(()));

        // An ungenerated board with a reveal is no longer a valid state
        board.reveal(p(1, 1));
        assert!(board.check().is_err());
    }

    #[test]
    fn test_check_rejects_corrupted_boards() {
        let good = Board::with_mines(3, &[p(0, 0), p(2, 2)]).unwrap();

        let mut board = good.clone();
        board.counts[1][1] = 5;
        assert!(matches!(board.check(), Err(ConfigError::InconsistentBoard(_))));

        let mut board = good.clone();
        board.revealed[0][1] = true;
        board.flagged[0][1] = true;
        assert!(matches!(board.check(), Err(ConfigError::InconsistentBoard(_))));

        let mut board = good.clone();
        board.flagged[2].pop();
        assert!(matches!(board.check(), Err(ConfigError::InconsistentBoard(_))));

        let mut board = good.clone();
        board.cells[1][0] = CellKind::Mine;
        assert!(matches!(board.check(), Err(ConfigError::InconsistentBoard(_))));

        let mut board = good.clone();
        board.flagged[0][1] = true;
        board.flagged[1][0] = true;
        board.flagged[1][1] = true;
        assert!(matches!(board.check(), Err(ConfigError::InconsistentBoard(_))));

        let mut board = good;
        board.size = 1 << 33;
        assert!(matches!(board.check(), Err(ConfigError::BoardTooLarge { .. })));
    }

    #[test]
    fn test_with_mines_validates_layout() {
        assert_eq!(
            Board::with_mines(3, &[p(0, 0), p(3, 1)]),
            Err(ConfigError::MineOutOfBounds(p(3, 1)))
        );
        assert_eq!(
            Board::with_mines(3, &[p(0, 0), p(0, 0)]),
            Err(ConfigError::DuplicateMine(p(0, 0)))
        );
    }

    #[test]
    fn test_counts_match_layout() {
        // Mine in the centre of a 3x3 board: every other cell sees exactly one
        let board = Board::with_mines(3, &[p(1, 1)]).unwrap();
        assert_eq!(board.adjacent_mines(p(1, 1)), MINE_SENTINEL);
        for point in board.points().filter(|&q| q != p(1, 1)) {
            assert_eq!(board.adjacent_mines(point), 1);
        }

        // Corner mines only touch their own corner
        let board = Board::with_mines(4, &[p(0, 0), p(3, 3)]).unwrap();
        assert_eq!(board.adjacent_mines(p(1, 1)), 1);
        assert_eq!(board.adjacent_mines(p(0, 3)), 0);
        assert_eq!(board.adjacent_mines(p(2, 2)), 1);
        assert_eq!(board.adjacent_mines(p(1, 2)), 0);
    }

    #[test]
    fn test_get_neighbors() {
        let board = Board::new(3, 1).unwrap();
        assert_eq!(board.neighbors(p(0, 0)).count(), 3);
        assert_eq!(board.neighbors(p(1, 1)).count(), 8);
        assert_eq!(board.neighbors(p(0, 1)).count(), 5);

        // Scan order is row-major around the centre
        let order: Vec<Point> = board.neighbors(p(1, 1)).collect();
        assert_eq!(order.first(), Some(&p(0, 0)));
        assert_eq!(order.last(), Some(&p(2, 2)));
    }

    #[test]
    fn test_toggle_flag_respects_budget() {
        let mut board = Board::with_mines(3, &[p(0, 0)]).unwrap();
        assert!(board.toggle_flag(p(2, 2)));
        assert_eq!(board.remaining_flags(), 0);

        // Budget spent: a new flag is refused but the existing one can be lifted
        assert!(!board.toggle_flag(p(1, 1)));
        assert!(!board.is_flagged(p(1, 1)));
        assert!(board.toggle_flag(p(2, 2)));
        assert_eq!(board.remaining_flags(), 1);

        // Out of bounds is a no-op
        assert!(!board.toggle_flag(p(5, 5)));
    }

    #[test]
    fn test_toggle_flag_ignores_revealed_cells() {
        let mut board = Board::with_mines(3, &[p(0, 0)]).unwrap();
        board.reveal(p(2, 2));
        assert!(!board.toggle_flag(p(2, 2)));
        assert!(!board.is_flagged(p(2, 2)));
    }

    #[test]
    fn test_reveal_clears_flag() {
        let mut board = Board::with_mines(3, &[p(0, 0)]).unwrap();
        board.toggle_flag(p(1, 1));
        board.reveal(p(1, 1));
        assert!(board.is_revealed(p(1, 1)));
        assert!(!board.is_flagged(p(1, 1)));
    }

    #[test]
    fn test_reveal_all_mines() {
        let mut board = Board::with_mines(3, &[p(0, 0), p(2, 1)]).unwrap();
        board.toggle_flag(p(0, 0));
        board.reveal_all_mines();
        assert!(board.is_revealed(p(0, 0)));
        assert!(board.is_revealed(p(2, 1)));
        assert!(!board.is_flagged(p(0, 0)));
        assert_eq!(board.revealed_count(), 2);
    }

    #[test]
    fn test_is_won_ignores_flags() {
        let mut board = Board::with_mines(2, &[p(0, 0)]).unwrap();
        assert!(!board.is_won());
        board.reveal(p(0, 1));
        board.reveal(p(1, 0));
        assert!(!board.is_won());
        board.reveal(p(1, 1));
        // No flag on the mine, still a win
        assert!(board.is_won());
    }

    #[test]
    fn test_layout_frozen_after_reveal() {
        let mut board = Board::with_mines(3, &[p(0, 0)]).unwrap();
        board.reveal(p(2, 2));
        assert!(!board.lay_mines([p(1, 1)]));
        assert!(board.is_mine(p(0, 0)));
        assert!(!board.is_mine(p(1, 1)));
    }

    #[test]
    fn test_render_marks_cells() {
        let mut board = Board::with_mines(2, &[p(0, 0)]).unwrap();
        board.toggle_flag(p(0, 1));
        board.reveal(p(1, 1));
        let text = board.render(false);
        assert!(text.contains(" F "));
        assert!(text.contains(" 1 "));
        assert!(!text.contains(" * "));
        assert!(board.render(true).contains(" * "));
    }
}
