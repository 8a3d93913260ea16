//! Errors returned by the rules engine.

use crate::san::SanError;
use chess_rules_core::{FenError, Square};
use thiserror::Error;

/// Error type for board and game operations.
///
/// A failed operation never changes the board or game it was called on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    /// The requested move is not in the legal set.
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },

    /// An imported or hand-built board cannot be played from.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// A pawn reaches the last rank but no promotion piece was given.
    #[error("move {from}{to} needs a promotion piece")]
    AmbiguousPromotion { from: Square, to: Square },

    /// Text that is not a UCI long-algebraic move.
    #[error("invalid UCI move: {0}")]
    InvalidUci(String),

    /// A promotion piece was supplied while no promotion is pending.
    #[error("no promotion is pending")]
    NoPendingPromotion,

    /// The game has already ended.
    #[error("game has already ended")]
    GameOver,

    /// A draw was claimed without threefold repetition or fifty quiet moves.
    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,

    /// Malformed FEN text.
    #[error(transparent)]
    Fen(#[from] FenError),

    /// SAN text that names no unique legal move.
    #[error(transparent)]
    San(#[from] SanError),
}
