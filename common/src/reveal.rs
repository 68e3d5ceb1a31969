use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::board::{Board, Point};

/// What a move asks the engine to do with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Reveal,
    Flag,
}

/// A single move from either the player or the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub at: Point,
    pub action: Action,
    /// Lift a flag on the target before revealing it. Set by solver tiers
    /// that reveal cells regardless of the player's flags.
    pub clear_flag: bool,
}

impl Move {
    pub fn reveal(at: Point) -> Self {
        Move {
            at,
            action: Action::Reveal,
            clear_flag: false,
        }
    }

    pub fn flag(at: Point) -> Self {
        Move {
            at,
            action: Action::Flag,
            clear_flag: false,
        }
    }

    pub fn clearing_flag(mut self) -> Self {
        self.clear_flag = true;
        self
    }
}

/// The effect of applying a move to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Out of bounds, already revealed, flagged, or a refused flag.
    Ignored,
    FlagToggled,
    /// Safe reveal; lists every newly revealed cell.
    Revealed(Vec<Point>),
    /// Safe reveal that uncovered the last non-mine cell.
    Won(Vec<Point>),
    /// The target was a mine; only that cell has been revealed.
    Lost(Point),
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, MoveOutcome::Ignored)
    }
}

/// Reveals `at` and, if it is a zero, breadth-first floods the connected zero
/// region plus its numbered border. Flagged cells and mines stop the flood.
/// Returns the newly revealed cells in reveal order.
pub fn flood_reveal(board: &mut Board, at: Point) -> Vec<Point> {
    if !board.in_bounds(at) || board.is_revealed(at) || board.is_flagged(at) {
        return Vec::new();
    }
    board.reveal(at);
    let mut revealed_points = vec![at];
    if board.adjacent_mines(at) != 0 {
        return revealed_points;
    }

    let mut queue = VecDeque::from([at]);
    while let Some(point) = queue.pop_front() {
        for neighbor in board.neighbors(point) {
            if board.is_flagged(neighbor) || board.is_mine(neighbor) {
                continue;
            }
            if !board.is_revealed(neighbor) {
                board.reveal(neighbor);
                revealed_points.push(neighbor);
                if board.adjacent_mines(neighbor) == 0 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    revealed_points
}

/// Applies a move to the board. Invalid targets are ignored rather than
/// reported, since player and solver input can race the board state.
pub fn apply_move(board: &mut Board, mv: Move) -> MoveOutcome {
    if !board.in_bounds(mv.at) {
        return MoveOutcome::Ignored;
    }
    match mv.action {
        Action::Flag => {
            if board.toggle_flag(mv.at) {
                MoveOutcome::FlagToggled
            } else {
                MoveOutcome::Ignored
            }
        }
        Action::Reveal => {
            if mv.clear_flag {
                board.clear_flag(mv.at);
            }
            if board.is_revealed(mv.at) || board.is_flagged(mv.at) {
                return MoveOutcome::Ignored;
            }
            if board.is_mine(mv.at) {
                board.reveal(mv.at);
                return MoveOutcome::Lost(mv.at);
            }
            let cells = flood_reveal(board, mv.at);
            if board.is_won() {
                MoveOutcome::Won(cells)
            } else {
                MoveOutcome::Revealed(cells)
            }
        }
    }
}
