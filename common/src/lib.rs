//! Minesweeper round engine with a rule-based computer player.
//!
//! A [`Game`] owns the [`Board`] of one round and walks it through
//! `NotStarted -> InProgress -> Won | Lost`. The [`Solver`] reads the board
//! and proposes one [`Move`] at a time, and the [`TurnController`] decides
//! whether the player or the solver acts next. [`Session`] bundles all three
//! for drivers such as the bundled CLI.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod reveal;
pub mod score;
pub mod solver;
pub mod turn;

pub use board::{Board, CellKind, MAX_BOARD_SIZE, MINE_SENTINEL, Point};
pub use config::GameConfig;
pub use error::{ConfigError, ParseEnumError};
pub use game::{Game, RoundState};
pub use generator::{ensure_first_click_safe, generate};
pub use reveal::{Action, Move, MoveOutcome, apply_move, flood_reveal};
pub use score::{GameTimer, RoundSummary, format_elapsed, score};
pub use solver::{Difficulty, Solver};
pub use turn::{Session, Turn, TurnController, TurnMode};
