//! The computer player.
//!
//! Three tiers share one entry point, [`Solver::make_move`], which reads the
//! board and proposes exactly one move. Nothing is cached between calls: the
//! decision is re-derived from the board every time, and the board is only
//! ever borrowed immutably.

use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board::{Board, MINE_SENTINEL, Point};
use crate::error::ParseEnumError;
use crate::reveal::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Random reveals.
    Easy,
    /// Saturation rules, random reveal when nothing can be deduced.
    #[default]
    Medium,
    /// Reads the mine layout and never loses.
    Hard,
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseEnumError {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

pub struct Solver {
    difficulty: Difficulty,
    rng: StdRng,
}

impl Solver {
    pub fn new(difficulty: Difficulty) -> Self {
        Solver {
            difficulty,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic solver for replays and tests.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Solver {
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Proposes the next move, or `None` when no cell is eligible.
    pub fn make_move(&mut self, board: &Board) -> Option<Move> {
        match self.difficulty {
            Difficulty::Easy => self.random_reveal(board),
            Difficulty::Medium => self.deduce(board),
            Difficulty::Hard => oracle_reveal(board),
        }
    }

    /// Uniform pick among hidden cells. Unflagged cells come first; a flagged
    /// cell is only picked, with its flag lifted, when nothing else is hidden.
    fn random_reveal(&mut self, board: &Board) -> Option<Move> {
        let unflagged: Vec<Point> = board
            .points()
            .filter(|&p| board.is_hidden(p) && !board.is_flagged(p))
            .collect();
        if let Some(&at) = unflagged.choose(&mut self.rng) {
            return Some(Move::reveal(at));
        }

        let hidden: Vec<Point> = board.points().filter(|&p| board.is_hidden(p)).collect();
        hidden
            .choose(&mut self.rng)
            .map(|&at| Move::reveal(at).clearing_flag())
    }

    fn deduce(&mut self, board: &Board) -> Option<Move> {
        if !board.any_revealed() {
            return self.random_reveal(board);
        }
        if let Some(at) = find_saturated(board, Saturation::Flags) {
            log::debug!("all mines around a neighbour of {} are flagged, revealing it", at);
            return Some(Move::reveal(at));
        }
        if board.remaining_flags() > 0 {
            if let Some(at) = find_saturated(board, Saturation::Mines) {
                log::debug!("{} must be a mine, flagging it", at);
                return Some(Move::flag(at));
            }
        }
        self.random_reveal(board)
    }
}

/// Neighbourhood tallies around one revealed number.
struct Tally {
    count: usize,
    hidden: usize,
    flagged: usize,
    first_hidden: Option<Point>,
}

fn tally(board: &Board, at: Point) -> Option<Tally> {
    let count = board.adjacent_mines(at);
    if !board.is_revealed(at) || count == MINE_SENTINEL {
        return None;
    }
    let mut tally = Tally {
        count: count as usize,
        hidden: 0,
        flagged: 0,
        first_hidden: None,
    };
    for n in board.neighbors(at) {
        if board.is_flagged(n) {
            tally.flagged += 1;
        } else if board.is_hidden(n) {
            tally.hidden += 1;
            tally.first_hidden.get_or_insert(n);
        }
    }
    Some(tally)
}

#[derive(Clone, Copy)]
enum Saturation {
    /// The flags already account for every mine: the rest is safe.
    Flags,
    /// Hidden plus flagged cells equal the number: the hidden ones are mines.
    Mines,
}

/// Row-major scan for the first revealed number the rule applies to; yields
/// its first hidden unflagged neighbour.
fn find_saturated(board: &Board, rule: Saturation) -> Option<Point> {
    board.points().find_map(|at| {
        let t = tally(board, at)?;
        if t.hidden == 0 {
            return None;
        }
        let applies = match rule {
            Saturation::Flags => t.flagged == t.count,
            Saturation::Mines => t.hidden + t.flagged == t.count,
        };
        if applies { t.first_hidden } else { None }
    })
}

/// First non-mine hidden cell in row-major order. Flags on it are lifted.
fn oracle_reveal(board: &Board) -> Option<Move> {
    board
        .points()
        .find(|&p| !board.is_mine(p) && board.is_hidden(p))
        .map(|at| {
            if board.is_flagged(at) {
                Move::reveal(at).clearing_flag()
            } else {
                Move::reveal(at)
            }
        })
}
