use crate::board::Point;

/// Rejected board or game configuration. Raised synchronously; the core never
/// builds a board from an invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board size must be at least 1")]
    EmptyBoard,
    #[error("board size {size} exceeds the limit of {max}")]
    BoardTooLarge { size: usize, max: usize },
    #[error("mine budget {mines} is outside 1..={max} for a {size}x{size} board")]
    MineBudget { mines: usize, size: usize, max: usize },
    #[error("menu mine budget {mines} is outside {min}..={max}")]
    MenuMineBudget { mines: usize, min: usize, max: usize },
    #[error("mine at {0} is outside the board")]
    MineOutOfBounds(Point),
    #[error("mine at {0} was listed twice")]
    DuplicateMine(Point),
    #[error("stored board is inconsistent: {0}")]
    InconsistentBoard(&'static str),
}

/// Failure to parse one of the configuration enums from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
