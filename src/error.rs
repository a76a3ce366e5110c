//! Error types for the game-state engine
//!
//! Every engine entry point that takes external input (coordinates, SAN,
//! UCI text, FEN) reports failure through [`ChessError`] instead of panicking.

use thiserror::Error;

/// Errors that can occur when loading a position or applying a move
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// The move does not match any legal move in the position
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// The move reaches the last rank but no promotion piece was given
    #[error("Move {0} requires a promotion piece")]
    PromotionRequired(String),

    /// The move text could not be read at all
    #[error("Unparseable move text: {0:?}")]
    Unparseable(String),

    /// SAN matches more than one legal move
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),

    /// FEN string is malformed or describes an impossible position
    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
}

impl ChessError {
    pub(crate) fn invalid_fen(fen: &str, reason: impl Into<String>) -> Self {
        ChessError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations
pub type ChessResult<T> = Result<T, ChessError>;
