use serde::{Deserialize, Serialize};

use crate::board::max_mines;
use crate::error::ConfigError;
use crate::solver::Difficulty;
use crate::turn::TurnMode;

pub const DEFAULT_SIZE: usize = 10;
pub const MIN_MINES: usize = 10;
pub const MAX_MINES: usize = 20;
pub const DEFAULT_AI_DELAY_MS: u64 = 500;

/// Settings chosen before a round starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: usize,
    pub mines: usize,
    pub difficulty: Difficulty,
    pub mode: TurnMode,
    /// Fixed seed for reproducible rounds; fresh entropy when absent.
    pub seed: Option<u64>,
    /// Pause between consecutive solver moves, for the driver to honour.
    pub ai_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            size: DEFAULT_SIZE,
            mines: MIN_MINES,
            difficulty: Difficulty::default(),
            mode: TurnMode::default(),
            seed: None,
            ai_delay_ms: DEFAULT_AI_DELAY_MS,
        }
    }
}

impl GameConfig {
    /// Checks the menu range for the mine budget and that the board can hold it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MINES..=MAX_MINES).contains(&self.mines) {
            return Err(ConfigError::MenuMineBudget {
                mines: self.mines,
                min: MIN_MINES,
                max: MAX_MINES,
            });
        }
        let max = max_mines(self.size)?;
        if self.mines > max {
            return Err(ConfigError::MineBudget {
                mines: self.mines,
                size: self.size,
                max,
            });
        }
        Ok(())
    }
}
