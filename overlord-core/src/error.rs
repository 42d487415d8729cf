//! Error taxonomy for rejected actions

use crate::hex::Hex;
use thiserror::Error;

/// Why an intent was rejected. Rejections never mutate game state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("not your turn")]
    OutOfTurn,

    #[error("illegal in this phase: {0}")]
    IllegalPhase(String),

    #[error("illegal target: {0}")]
    IllegalTarget(String),

    #[error("not in an active match")]
    NoActiveSession,
}

impl ActionError {
    /// Stable machine-readable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::OutOfTurn => "out_of_turn",
            ActionError::IllegalPhase(_) => "illegal_phase",
            ActionError::IllegalTarget(_) => "illegal_target",
            ActionError::NoActiveSession => "no_active_session",
        }
    }

    pub fn phase(reason: impl Into<String>) -> Self {
        ActionError::IllegalPhase(reason.into())
    }

    pub fn target(reason: impl Into<String>) -> Self {
        ActionError::IllegalTarget(reason.into())
    }
}

/// Board occupancy errors
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("{0} is off the board")]
    OffBoard(Hex),

    #[error("{0} is already occupied")]
    Occupied(Hex),

    #[error("{0} has no unit")]
    Empty(Hex),
}

impl From<BoardError> for ActionError {
    fn from(err: BoardError) -> Self {
        ActionError::IllegalTarget(err.to_string())
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;
