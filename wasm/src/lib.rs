use minesweeper as ms;
use wasm_bindgen::prelude::*;

/// Cell code for a hidden, unflagged cell in [`get_cells`].
const HIDDEN: i8 = -1;
/// Cell code for a hidden, flagged cell in [`get_cells`].
const FLAGGED: i8 = -2;
/// Cell code for a revealed mine in [`get_cells`].
const MINE: i8 = 9;

fn load(bts: &[u8]) -> Result<ms::Game, String> {
    ms::Game::deserialize(bts).map_err(|e| e.to_string())
}

fn store(game: &ms::Game, outcome: &ms::MoveOutcome) -> Result<Vec<u8>, String> {
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(match outcome {
        ms::MoveOutcome::Ignored => 0,
        ms::MoveOutcome::FlagToggled => 1,
        ms::MoveOutcome::Revealed(_) => 2,
        ms::MoveOutcome::Won(_) => 3,
        ms::MoveOutcome::Lost(_) => 4,
    });
    Ok(xs)
}

fn play(bts: Vec<u8>, mv: ms::Move) -> Result<Vec<u8>, String> {
    let mut game = load(&bts)?;
    let outcome = game.apply_move(mv, &mut rand::rng());
    store(&game, &outcome)
}

#[wasm_bindgen]
pub fn create_game(size: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::new(size as usize, mines as usize, &mut rand::rng())
        .map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

/// Reveals a cell. The returned bytes are the new state followed by one
/// outcome byte: 0 ignored, 1 flag, 2 revealed, 3 won, 4 lost.
#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    play(bts, ms::Move::reveal(ms::Point { row, col }))
}

#[wasm_bindgen]
pub fn toggle_flag(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    play(bts, ms::Move::flag(ms::Point { row, col }))
}

/// Lets the solver play one move at the given difficulty. Errors with
/// `no_move` when the solver has nothing to propose.
#[wasm_bindgen]
pub fn ai_move(bts: Vec<u8>, difficulty: &str) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let difficulty: ms::Difficulty = difficulty.parse().map_err(|e: ms::ParseEnumError| e.to_string())?;
    let game = load(&bts)?;
    let mv = ms::Solver::new(difficulty)
        .make_move(&game.board)
        .ok_or_else(|| "no_move".to_string())?;
    play(bts, mv)
}

/// Row-major cell codes: -1 hidden, -2 flagged, 0-8 revealed count, 9 mine.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = load(&bts)?;
    let board = &game.board;
    Ok(board
        .points()
        .map(|p| {
            if !board.is_revealed(p) {
                if board.is_flagged(p) { FLAGGED } else { HIDDEN }
            } else if board.is_mine(p) {
                MINE
            } else {
                board.adjacent_mines(p)
            }
        })
        .collect())
}

/// 0 not started, 1 in progress, 2 won, 3 lost.
#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    Ok(match load(&bts)?.state {
        ms::RoundState::NotStarted => 0,
        ms::RoundState::InProgress => 1,
        ms::RoundState::Won => 2,
        ms::RoundState::Lost => 3,
    })
}

#[wasm_bindgen]
pub fn remaining_flags(bts: Vec<u8>) -> Result<usize, String> {
    console_error_panic_hook::set_once();

    Ok(load(&bts)?.board.remaining_flags())
}

/// Score for a won round; 0 when the round took under a second.
#[wasm_bindgen]
pub fn score(mines: usize, elapsed_secs: u64) -> u64 {
    ms::score(mines, elapsed_secs).unwrap_or(0)
}
