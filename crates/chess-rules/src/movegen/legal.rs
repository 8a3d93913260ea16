//! Legal move filtering.
//!
//! Every pseudo-move is played on a scratch copy of the board and undone
//! again; the move is legal when the mover's king is not attacked in
//! between. The scratch board is cloned once per call, never per move.

use super::attacks::is_in_check;
use super::push_pseudo_moves;
use crate::{BoardState, Move};
use chess_rules_core::Square;

/// Generates all legal moves for the side to move.
pub fn legal_moves(board: &BoardState) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    for piece in board.pieces_of(board.turn()) {
        push_pseudo_moves(board, piece, &mut moves);
    }
    retain_legal(board, moves)
}

/// Generates the legal moves of the piece on `sq`.
///
/// Empty when the square is empty or holds a piece of the side not to move.
pub fn legal_moves_from(board: &BoardState, sq: Square) -> Vec<Move> {
    match board.piece_at(sq) {
        Some(piece) if piece.color == board.turn() => {
            let mut moves = Vec::new();
            push_pseudo_moves(board, piece, &mut moves);
            retain_legal(board, moves)
        }
        _ => Vec::new(),
    }
}

/// Returns true if `mv` is one of the legal moves of the position.
pub fn is_legal(board: &BoardState, mv: &Move) -> bool {
    legal_moves_from(board, mv.from()).contains(mv)
}

/// Returns true if the side to move has at least one legal move.
///
/// Stops at the first legal move found.
pub fn has_legal_move(board: &BoardState) -> bool {
    let mut scratch = board.clone();
    let mut moves = Vec::new();
    for piece in board.pieces_of(board.turn()) {
        moves.clear();
        push_pseudo_moves(board, piece, &mut moves);
        if moves.iter().any(|mv| keeps_king_safe(&mut scratch, mv)) {
            return true;
        }
    }
    false
}

fn retain_legal(board: &BoardState, moves: Vec<Move>) -> Vec<Move> {
    let mut scratch = board.clone();
    moves
        .into_iter()
        .filter(|mv| keeps_king_safe(&mut scratch, mv))
        .collect()
}

/// Plays `mv` on `scratch`, checks the mover's king, and restores `scratch`.
pub(crate) fn keeps_king_safe(scratch: &mut BoardState, mv: &Move) -> bool {
    let mover = mv.piece().color;
    let undo = scratch.make(mv);
    let safe = !is_in_check(scratch, mover);
    scratch.unmake(undo);
    safe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoveKind;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let board = BoardState::startpos();
        assert_eq!(legal_moves(&board).len(), 20);
        assert!(has_legal_move(&board));
    }

    #[test]
    fn moves_from_wrong_side_are_empty() {
        let board = BoardState::startpos();
        assert!(legal_moves_from(&board, sq("e7")).is_empty());
        assert!(legal_moves_from(&board, sq("e4")).is_empty());
        assert_eq!(legal_moves_from(&board, sq("b1")).len(), 2);
    }

    #[test]
    fn pinned_piece_moves_along_pin_only() {
        let board = BoardState::from_fen("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let moves = legal_moves_from(&board, sq("e2"));
        assert!(moves.iter().all(|m| m.to().col() == 4));
        // e3..e6 and the capture on e7
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn check_must_be_answered() {
        // The a1 rook checks along the first rank; nothing can block or capture it.
        let board = BoardState::from_fen("4k3/8/8/8/8/8/3P4/r3K2R w K - 0 1").unwrap();
        let moves = legal_moves(&board);
        assert!(moves.iter().all(|m| m.kind() != MoveKind::CastleKingside));
        assert!(moves.iter().all(|m| m.from() == Square::E1));

        let mut targets: Vec<String> = moves.iter().map(|m| m.to().to_string()).collect();
        targets.sort();
        assert_eq!(targets, vec!["e2", "f2"]);
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        // Taking en passant would clear the fifth rank between the rook and the king.
        let board = BoardState::from_fen("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1").unwrap();
        assert!(legal_moves(&board)
            .iter()
            .all(|m| m.kind() != MoveKind::EnPassant));
    }

    #[test]
    fn probing_leaves_board_untouched() {
        let board = BoardState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = board.to_fen();
        let mut scratch = board.clone();
        for mv in legal_moves(&board) {
            keeps_king_safe(&mut scratch, &mv);
            assert_eq!(scratch.to_fen(), before);
        }
        assert_eq!(board.to_fen(), before);
    }
}
