//! Turn order between the player and the solver, and the session that ties a
//! round, its solver and its turn order together.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{ConfigError, ParseEnumError};
use crate::game::{Game, RoundState};
use crate::reveal::{Action, Move, MoveOutcome};
use crate::score::{GameTimer, RoundSummary};
use crate::solver::Solver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnMode {
    /// The player makes every move.
    Manual,
    /// Player and solver alternate, one reveal each.
    #[default]
    Interactive,
    /// The solver plays alone.
    Automatic,
}

impl FromStr for TurnMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(TurnMode::Manual),
            "interactive" => Ok(TurnMode::Interactive),
            "automatic" | "auto" => Ok(TurnMode::Automatic),
            _ => Err(ParseEnumError {
                kind: "turn mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TurnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TurnMode::Manual => "manual",
            TurnMode::Interactive => "interactive",
            TurnMode::Automatic => "automatic",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Player,
    Solver,
}

/// Tracks whose turn it is. Only reveals that took effect pass the turn;
/// flags are free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnController {
    mode: TurnMode,
    turn: Turn,
}

impl TurnController {
    pub fn new(mode: TurnMode) -> Self {
        let turn = match mode {
            TurnMode::Automatic => Turn::Solver,
            TurnMode::Manual | TurnMode::Interactive => Turn::Player,
        };
        TurnController { mode, turn }
    }

    pub fn mode(&self) -> TurnMode {
        self.mode
    }

    pub fn whose_turn(&self) -> Turn {
        self.turn
    }

    pub fn record(&mut self, mv: Move, outcome: &MoveOutcome) {
        if self.mode != TurnMode::Interactive
            || mv.action != Action::Reveal
            || !outcome.is_applied()
        {
            return;
        }
        self.turn = match self.turn {
            Turn::Player => Turn::Solver,
            Turn::Solver => Turn::Player,
        };
    }

    /// Hands every remaining move to the player.
    pub fn fall_back_to_manual(&mut self) {
        self.mode = TurnMode::Manual;
        self.turn = Turn::Player;
    }
}

/// A round being played: the game, the optional solver, whose turn it is and
/// the round timer.
pub struct Session {
    game: Game,
    solver: Option<Solver>,
    turns: TurnController,
    timer: GameTimer,
    rng: StdRng,
}

impl Session {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let game = Game::new(config.size, config.mines, &mut rng)?;
        let solver = match config.mode {
            TurnMode::Manual => None,
            TurnMode::Interactive | TurnMode::Automatic => {
                Some(Solver::with_seed(config.difficulty, rng.random()))
            }
        };
        Ok(Session {
            game,
            solver,
            turns: TurnController::new(config.mode),
            timer: GameTimer::default(),
            rng,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn board(&self) -> &Board {
        &self.game.board
    }

    pub fn turns(&self) -> &TurnController {
        &self.turns
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn whose_turn(&self) -> Turn {
        self.turns.whose_turn()
    }

    /// Applies a player move. Ignored when it is not the player's turn.
    pub fn player_move(&mut self, mv: Move) -> MoveOutcome {
        if self.turns.whose_turn() != Turn::Player {
            return MoveOutcome::Ignored;
        }
        self.apply(mv)
    }

    /// Lets the solver take one move. `None` when it is not the solver's
    /// turn, the round is over, or the solver has nothing left to try; the
    /// last case hands the round back to the player.
    pub fn solver_move(&mut self) -> Option<(Move, MoveOutcome)> {
        if self.game.is_over() || self.turns.whose_turn() != Turn::Solver {
            return None;
        }
        let proposal = self
            .solver
            .as_mut()
            .and_then(|solver| solver.make_move(&self.game.board));
        let Some(mv) = proposal else {
            log::warn!(
                "solver exhausted with the round still {:?}, continuing manually",
                self.game.state
            );
            self.solver = None;
            self.turns.fall_back_to_manual();
            return None;
        };
        Some((mv, self.apply(mv)))
    }

    fn apply(&mut self, mv: Move) -> MoveOutcome {
        let before = self.game.state;
        let outcome = self.game.apply_move(mv, &mut self.rng);
        if before == RoundState::NotStarted && self.game.state != RoundState::NotStarted {
            self.timer.start();
        }
        if self.game.is_over() {
            self.timer.stop();
        }
        self.turns.record(mv, &outcome);
        outcome
    }

    /// Result for the high-score keeper once the round has ended.
    pub fn summary(&self) -> Option<RoundSummary> {
        self.game.is_over().then(|| RoundSummary {
            state: self.game.state,
            elapsed_secs: self.timer.elapsed_secs(),
            mines: self.game.board.mine_budget(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use crate::solver::Difficulty;

    fn p(row: usize, col: usize) -> Point {
        Point { row, col }
    }

    fn config(mode: TurnMode, difficulty: Difficulty) -> GameConfig {
        GameConfig {
            mode,
            difficulty,
            seed: Some(1234),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_turn_mode_parsing() {
        assert_eq!("Manual".parse::<TurnMode>(), Ok(TurnMode::Manual));
        assert_eq!("auto".parse::<TurnMode>(), Ok(TurnMode::Automatic));
        assert!("hotseat".parse::<TurnMode>().is_err());
        assert_eq!(TurnMode::Interactive.to_string(), "interactive");
    }

    #[test]
    fn test_initial_turns() {
        assert_eq!(TurnController::new(TurnMode::Manual).whose_turn(), Turn::Player);
        assert_eq!(TurnController::new(TurnMode::Interactive).whose_turn(), Turn::Player);
        assert_eq!(TurnController::new(TurnMode::Automatic).whose_turn(), Turn::Solver);
    }

    #[test]
    fn test_interactive_alternates_on_reveals_only() {
        let mut turns = TurnController::new(TurnMode::Interactive);
        let revealed = MoveOutcome::Revealed(vec![p(0, 0)]);

        turns.record(Move::flag(p(1, 1)), &MoveOutcome::FlagToggled);
        assert_eq!(turns.whose_turn(), Turn::Player);

        turns.record(Move::reveal(p(2, 2)), &MoveOutcome::Ignored);
        assert_eq!(turns.whose_turn(), Turn::Player);

        turns.record(Move::reveal(p(0, 0)), &revealed);
        assert_eq!(turns.whose_turn(), Turn::Solver);

        turns.record(Move::flag(p(3, 3)), &MoveOutcome::FlagToggled);
        assert_eq!(turns.whose_turn(), Turn::Solver);

        turns.record(Move::reveal(p(0, 0)), &revealed);
        assert_eq!(turns.whose_turn(), Turn::Player);
    }

    #[test]
    fn test_manual_and_automatic_never_switch() {
        let revealed = MoveOutcome::Revealed(vec![p(0, 0)]);
        let mut manual = TurnController::new(TurnMode::Manual);
        let mut automatic = TurnController::new(TurnMode::Automatic);
        for _ in 0..3 {
            manual.record(Move::reveal(p(0, 0)), &revealed);
            automatic.record(Move::reveal(p(0, 0)), &revealed);
        }
        assert_eq!(manual.whose_turn(), Turn::Player);
        assert_eq!(automatic.whose_turn(), Turn::Solver);
    }

    #[test]
    fn test_session_rejects_bad_config() {
        let bad = GameConfig {
            mines: 30,
            ..GameConfig::default()
        };
        assert!(Session::new(&bad).is_err());
    }

    #[test]
    fn test_manual_session_has_no_solver_turns() {
        let mut session = Session::new(&config(TurnMode::Manual, Difficulty::Hard)).unwrap();
        assert_eq!(session.solver_move(), None);
        let outcome = session.player_move(Move::reveal(p(5, 5)));
        assert!(outcome.is_applied());
        assert_eq!(session.whose_turn(), Turn::Player);
        assert!(session.board().is_revealed(p(5, 5)));
    }

    #[test]
    fn test_automatic_hard_session_wins() {
        let mut session = Session::new(&config(TurnMode::Automatic, Difficulty::Hard)).unwrap();
        assert_eq!(session.player_move(Move::reveal(p(0, 0))), MoveOutcome::Ignored);

        let mut moves = 0;
        while !session.game().is_over() {
            assert!(session.solver_move().is_some());
            moves += 1;
            assert!(moves <= 100);
        }
        assert_eq!(session.game().state, RoundState::Won);
        let summary = session.summary().unwrap();
        assert_eq!(summary.state, RoundState::Won);
        assert_eq!(summary.mines, 10);
        assert!(!session.timer().is_running());
    }

    #[test]
    fn test_automatic_medium_session_terminates() {
        for seed in 0..10 {
            let mut session = Session::new(&GameConfig {
                seed: Some(seed),
                ..config(TurnMode::Automatic, Difficulty::Medium)
            })
            .unwrap();
            let mut steps = 0;
            while !session.game().is_over() {
                assert!(session.solver_move().is_some());
                steps += 1;
                // Each cell can be flagged or revealed at most once
                assert!(steps <= 200);
            }
            assert!(session.summary().is_some());
        }
    }

    #[test]
    fn test_exhausted_solver_hands_round_to_player() {
        // Everything is already uncovered but the round was never closed
        let mut board = Board::with_mines(2, &[p(0, 0)]).unwrap();
        for at in board.points() {
            board.reveal(at);
        }
        let mut session = Session {
            game: Game::replay(board),
            solver: Some(Solver::with_seed(Difficulty::Medium, 7)),
            turns: TurnController::new(TurnMode::Automatic),
            timer: GameTimer::default(),
            rng: StdRng::seed_from_u64(7),
        };
        assert_eq!(session.whose_turn(), Turn::Solver);

        assert_eq!(session.solver_move(), None);
        assert_eq!(session.turns().mode(), TurnMode::Manual);
        assert_eq!(session.whose_turn(), Turn::Player);
        assert!(session.solver.is_none());
        assert_eq!(session.game().state, RoundState::InProgress);

        // Stays with the player afterwards
        assert_eq!(session.solver_move(), None);
        assert_eq!(session.whose_turn(), Turn::Player);
    }

    #[test]
    fn test_interactive_session_alternates() {
        let mut session = Session::new(&config(TurnMode::Interactive, Difficulty::Hard)).unwrap();
        assert_eq!(session.whose_turn(), Turn::Player);
        assert_eq!(session.solver_move(), None);

        session.player_move(Move::reveal(p(5, 5)));
        if session.game().is_over() {
            return;
        }
        assert_eq!(session.whose_turn(), Turn::Solver);
        assert_eq!(session.player_move(Move::reveal(p(0, 0))), MoveOutcome::Ignored);

        let (mv, outcome) = session.solver_move().unwrap();
        assert_eq!(mv.action, Action::Reveal);
        assert!(outcome.is_applied());
        if !session.game().is_over() {
            assert_eq!(session.whose_turn(), Turn::Player);
        }
    }

    #[test]
    fn test_timer_starts_on_first_reveal() {
        let mut session = Session::new(&config(TurnMode::Manual, Difficulty::Easy)).unwrap();
        session.player_move(Move::flag(p(0, 0)));
        assert!(!session.timer().is_running());
        session.player_move(Move::reveal(p(5, 5)));
        assert_eq!(session.timer().is_running(), !session.game().is_over());
        assert_eq!(session.summary().is_some(), session.game().is_over());
    }
}
