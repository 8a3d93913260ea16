//! Move generation.
//!
//! Generation runs in two stages. Pseudo-moves follow each piece's movement
//! pattern and ignore whether the mover's own king ends up attacked; the
//! legality filter then simulates every candidate on a scratch board and
//! keeps the ones that leave the king safe.

mod attacks;
mod legal;
pub mod perft;
mod special;

use crate::{Bitboard, BoardState, Move, MoveKind, Piece};
use chess_rules_core::{PieceKind, Square};

pub use attacks::{
    attacked_squares, bishop_attacks, is_attacked, is_in_check, king_attacks, knight_attacks,
    pawn_attacks, piece_attacks, queen_attacks, ray_attacks, rook_attacks, BISHOP_DIRECTIONS,
    ROOK_DIRECTIONS,
};
pub use legal::{has_legal_move, is_legal, legal_moves, legal_moves_from};
pub use perft::{perft, perft_divide};

pub(crate) use attacks::is_attacked_through;

/// Generates the pseudo-moves of one piece.
///
/// King steps onto attacked squares are already excluded, and castles are
/// only offered when every castling precondition holds.
pub fn pseudo_moves(board: &BoardState, piece: &Piece) -> Vec<Move> {
    let mut moves = Vec::new();
    push_pseudo_moves(board, piece, &mut moves);
    moves
}

pub(crate) fn push_pseudo_moves(board: &BoardState, piece: &Piece, moves: &mut Vec<Move>) {
    let occupied = board.occupied();
    let sq = piece.position;
    match piece.kind {
        PieceKind::Pawn => push_pawn_moves(board, piece, moves),
        PieceKind::Knight => push_targets(board, piece, knight_attacks(sq), moves),
        PieceKind::Bishop => push_targets(board, piece, bishop_attacks(sq, occupied), moves),
        PieceKind::Rook => push_targets(board, piece, rook_attacks(sq, occupied), moves),
        PieceKind::Queen => push_targets(board, piece, queen_attacks(sq, occupied), moves),
        PieceKind::King => {
            push_king_steps(board, piece, moves);
            special::push_castles(board, piece, moves);
        }
    }
}

/// Adds a normal move to every target not held by the mover's own side.
fn push_targets(board: &BoardState, piece: &Piece, targets: Bitboard, moves: &mut Vec<Move>) {
    for to in targets & !board.occupied_by(piece.color) {
        let capture = board.piece_at(to).copied();
        moves.push(Move::new(*piece, to, MoveKind::Normal, capture));
    }
}

fn push_king_steps(board: &BoardState, king: &Piece, moves: &mut Vec<Move>) {
    let them = king.color.opposite();
    // The king must not shield its own destination from a slider behind it.
    let occupied = board.occupied().without(king.position);

    for to in king_attacks(king.position) & !board.occupied_by(king.color) {
        if is_attacked_through(board, to, them, occupied) {
            continue;
        }
        let capture = board.piece_at(to).copied();
        moves.push(Move::new(*king, to, MoveKind::Normal, capture));
    }
}

fn push_pawn_moves(board: &BoardState, pawn: &Piece, moves: &mut Vec<Move>) {
    let dir = pawn.color.pawn_direction();
    let occupied = board.occupied();
    let is_free = |sq: &Square| !occupied.contains(*sq);

    if let Some(one) = pawn.position.offset(dir, 0).filter(is_free) {
        special::push_pawn_move(pawn, one, None, moves);

        if pawn.position.row() == pawn.color.pawn_row() {
            if let Some(two) = one.offset(dir, 0).filter(is_free) {
                moves.push(Move::new(*pawn, two, MoveKind::DoublePawnPush, None));
            }
        }
    }

    for to in pawn_attacks(pawn.position, pawn.color) {
        if let Some(target) = board.piece_at(to).filter(|p| p.color != pawn.color) {
            special::push_pawn_move(pawn, to, Some(*target), moves);
        }
    }

    special::push_en_passant(board, pawn, moves);
}
