use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ConfigError;
use crate::generator::{ensure_first_click_safe, generate};
use crate::reveal::{self, Action, Move, MoveOutcome};

/// Lifecycle of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl RoundState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::Won | RoundState::Lost)
    }
}

/// One round: the board plus where the round is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub board: Board,
    pub state: RoundState,
}

impl Game {
    /// Starts a round on a freshly generated board. First-click safety is
    /// deferred until the first reveal.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let mut board = Board::new(size, mines)?;
        generate(&mut board, rng);
        Ok(Game {
            board,
            state: RoundState::NotStarted,
        })
    }

    /// Starts a round on a given layout. The layout may still be redrawn by
    /// the first reveal if that reveal would not land on a zero.
    pub fn from_board(board: Board) -> Self {
        let state = if board.any_revealed() {
            RoundState::InProgress
        } else {
            RoundState::NotStarted
        };
        Game { board, state }
    }

    /// Continues play on a fixed layout with first-click safety waived.
    pub fn replay(board: Board) -> Self {
        Game {
            board,
            state: RoundState::InProgress,
        }
    }

    /// Deserializes a game state from bytes. Bytes that decode to a board
    /// no sequence of moves could produce are rejected.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        let game: Game = bcs::from_bytes(bts)?;
        game.board.check()?;
        Ok(game)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    /// Applies a player or solver move and advances the round.
    ///
    /// The first reveal that actually uncovers something starts the round:
    /// the layout is redrawn until that cell is a zero, then the flood fill
    /// runs. A mine ends the round and exposes every mine. Moves after the
    /// round is over are ignored.
    pub fn apply_move<R: Rng + ?Sized>(&mut self, mv: Move, rng: &mut R) -> MoveOutcome {
        if self.is_over() {
            return MoveOutcome::Ignored;
        }

        if self.state == RoundState::NotStarted && self.is_effective_reveal(mv) {
            if self.board.mine_count() != self.board.mine_budget() {
                generate(&mut self.board, rng);
            }
            ensure_first_click_safe(&mut self.board, mv.at, rng);
            self.state = RoundState::InProgress;
        }

        let outcome = reveal::apply_move(&mut self.board, mv);
        match outcome {
            MoveOutcome::Lost(_) => {
                self.board.reveal_all_mines();
                self.state = RoundState::Lost;
            }
            MoveOutcome::Won(_) => self.state = RoundState::Won,
            _ => {}
        }
        outcome
    }

    fn is_effective_reveal(&self, mv: Move) -> bool {
        mv.action == Action::Reveal
            && self.board.in_bounds(mv.at)
            && !self.board.is_revealed(mv.at)
            && (mv.clear_flag || !self.board.is_flagged(mv.at))
    }
}
