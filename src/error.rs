use thiserror::Error;

use crate::Pos;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid rule descriptor {descriptor:?}: {reason}")]
    InvalidRuleDescriptor {
        descriptor: String,
        reason: &'static str,
    },

    #[error("grid is {got:?} (rows, cols) but {expected:?} was expected")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("cell {pos} is outside of a {rows}x{cols} grid")]
    OutOfBounds { pos: Pos, rows: usize, cols: usize },

    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("step count {0:?} is not a number")]
    InvalidStepCount(String),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("the simulation worker is gone")]
    Disconnected,
}
