//! Standard chess rules implementation.

use super::{game_status, is_insufficient_material, GameStatus, RuleSet};
use crate::movegen::{is_in_check, is_legal, legal_moves};
use crate::{BoardState, Move, RulesError};

/// Standard chess rules (FIDE).
///
/// - Standard piece movement
/// - Castling (kingside and queenside)
/// - En passant
/// - Pawn promotion
/// - Check, checkmate, and stalemate detection
/// - Insufficient material and the 75-move rule
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn initial_position(&self) -> BoardState {
        BoardState::startpos()
    }

    fn legal_moves(&self, board: &BoardState) -> Vec<Move> {
        legal_moves(board)
    }

    fn is_legal(&self, board: &BoardState, mv: &Move) -> bool {
        is_legal(board, mv)
    }

    fn apply(&self, board: &BoardState, mv: &Move) -> Result<(BoardState, String), RulesError> {
        crate::apply(board, mv)
    }

    fn is_check(&self, board: &BoardState) -> bool {
        is_in_check(board, board.turn())
    }

    fn status(&self, board: &BoardState) -> GameStatus {
        game_status(board)
    }

    fn is_insufficient_material(&self, board: &BoardState) -> bool {
        is_insufficient_material(board)
    }
}
