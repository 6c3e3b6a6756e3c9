//! Error taxonomy for layout, deck, data and presentation APIs.

use super::card::CardId;
use crate::animation::TweenId;
use crate::deck::Formation;
use crate::presentation::StepId;

/// Result type for pure layout computations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;

/// Invalid layout input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Matrix pattern has no rows.
    #[error("matrix pattern is empty")]
    EmptyPattern,

    /// A matrix cell is not a decimal digit.
    #[error("matrix row {row} col {col}: expected a digit, found {found:?}")]
    NonDigit { row: usize, col: usize, found: char },

    /// A matrix row is longer than the first row.
    #[error("matrix row {row} has {len} cells, expected at most {expected}")]
    RowTooLong { row: usize, len: usize, expected: usize },

    /// `[min, max)` contains no integer.
    #[error("empty range [{min}, {max})")]
    EmptyRange { min: i32, max: i32 },

    /// Every value of `[min, max)` was already drawn.
    #[error("all values of [{min}, {max}) already drawn")]
    RangeExhausted { min: i32, max: i32 },
}

/// Deck operation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Grid slot beyond the computed grid.
    #[error("grid index {index} out of range (grid has {len} slots)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A formation was requested while another is still settling.
    #[error("cannot start {requested:?} while {active:?} is settling")]
    FormationPending { active: Formation, requested: Formation },

    #[error("unknown card {0}")]
    UnknownCard(CardId),

    /// Completion reported for a tween the deck is not waiting on.
    #[error("unknown or already completed tween {0:?}")]
    UnknownTween(TweenId),

    /// The grid cannot hold every card that may be drawn.
    #[error("grid has {slots} slots but up to {max_draught} cards can be drawn")]
    GridTooSmall { slots: usize, max_draught: usize },

    #[error("draw limit of {max} cards reached")]
    DrawLimitReached { max: usize },

    #[error("{0} is already drawn")]
    AlreadyDrawn(CardId),

    #[error("no undrawn cards left")]
    NoCardsLeft,

    /// Parameter patch did not deserialize.
    #[error("invalid deck parameters: {0}")]
    InvalidParams(String),
}

/// Card data source failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// The source could not be reached or read.
    #[error("card data unavailable: {0}")]
    Unavailable(String),

    /// The source answered with something that is not card data.
    #[error("malformed card data: {0}")]
    Malformed(String),
}

impl DataError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Presentation orchestration failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PresentationError {
    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("no plan for step {0}")]
    UnknownStep(StepId),
}
