//! Random mine placement and the first-click safety policy.
//!
//! First-click safety is regenerate-until-safe: the whole layout is redrawn
//! until the clicked cell is a zero. Every accepted layout is a uniform draw
//! among layouts where the clicked cell's closed neighbourhood is mine-free.

use rand::Rng;
use rand::seq::index;

use crate::board::{Board, Point};

/// Rejected layouts tolerated before sampling straight from the safe cells.
pub const MAX_REGENERATIONS: u32 = 10_000;

/// Draws `mine_budget` distinct cells uniformly without replacement and lays
/// mines on them. Returns false when the layout is already frozen.
pub fn generate<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> bool {
    let size = board.size();
    let mines: Vec<Point> = index::sample(rng, size * size, board.mine_budget())
        .into_iter()
        .map(|i| Point {
            row: i / size,
            col: i % size,
        })
        .collect();
    board.lay_mines(mines)
}

fn is_safe_start(board: &Board, at: Point) -> bool {
    !board.is_mine(at) && board.adjacent_mines(at) == 0
}

/// Makes the first reveal at `at` land on a zero, redrawing the layout as many
/// times as needed. Returns the number of layouts drawn (0 if the current one
/// already qualified or the layout is frozen).
///
/// When the budget leaves no room for a mine-free neighbourhood the guarantee
/// drops to "`at` is not a mine".
pub fn ensure_first_click_safe<R: Rng + ?Sized>(board: &mut Board, at: Point, rng: &mut R) -> u32 {
    if !board.in_bounds(at) {
        return 0;
    }
    if board.any_revealed() {
        log::warn!("first-click safety requested after play started, layout kept");
        return 0;
    }

    let size = board.size();
    let closed_neighbourhood = board.neighbors(at).count() + 1;
    let zero_feasible = board.mine_budget() + closed_neighbourhood <= size * size;

    if !zero_feasible {
        log::warn!(
            "{} mines cannot leave {} clear on a {}x{} board, only avoiding a mine",
            board.mine_budget(),
            at,
            size,
            size
        );
        return place_avoiding(board, &[at], rng);
    }

    let mut attempts = 0;
    while !is_safe_start(board, at) {
        if attempts >= MAX_REGENERATIONS {
            log::debug!("regeneration cap hit, sampling outside the neighbourhood of {}", at);
            let excluded: Vec<Point> = std::iter::once(at).chain(board.neighbors(at)).collect();
            return attempts + place_avoiding(board, &excluded, rng);
        }
        generate(board, rng);
        attempts += 1;
    }
    log::debug!("first click at {} safe after {} regenerations", at, attempts);
    attempts
}

/// Lays the budget uniformly over every cell not in `excluded`.
fn place_avoiding<R: Rng + ?Sized>(board: &mut Board, excluded: &[Point], rng: &mut R) -> u32 {
    if excluded.iter().all(|&p| !board.is_mine(p)) {
        return 0;
    }
    let candidates: Vec<Point> = board.points().filter(|p| !excluded.contains(p)).collect();
    let mines: Vec<Point> = index::sample(rng, candidates.len(), board.mine_budget())
        .into_iter()
        .map(|i| candidates[i])
        .collect();
    board.lay_mines(mines);
    1
}
