//! Castling, en passant and promotion.

use super::attacks::is_attacked;
use crate::board::{CastleSide, KING_COL};
use crate::{BoardState, Move, MoveKind, Piece};
use chess_rules_core::{PieceKind, Square};

/// Adds a pawn move to `to`, expanded into one move per promotion piece
/// when `to` is on the last row.
pub(super) fn push_pawn_move(
    pawn: &Piece,
    to: Square,
    capture: Option<Piece>,
    moves: &mut Vec<Move>,
) {
    if to.row() == pawn.color.promotion_row() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move::new(*pawn, to, MoveKind::Promotion(kind), capture));
        }
    } else {
        moves.push(Move::new(*pawn, to, MoveKind::Normal, capture));
    }
}

/// Adds the en passant capture of an adjacent enemy pawn that double-stepped
/// on the previous move.
pub(super) fn push_en_passant(board: &BoardState, pawn: &Piece, moves: &mut Vec<Move>) {
    let dir = pawn.color.pawn_direction();

    for dcol in [-1, 1] {
        let Some(beside) = pawn.position.offset(0, dcol) else {
            continue;
        };
        let Some(victim) = board.piece_at(beside).filter(|p| {
            p.en_passant_eligible && p.kind == PieceKind::Pawn && p.color != pawn.color
        }) else {
            continue;
        };
        // The victim passed over this square, so it is empty.
        let Some(to) = beside.offset(dir, 0) else {
            continue;
        };
        if board.piece_at(to).is_none() {
            moves.push(Move::new(*pawn, to, MoveKind::EnPassant, Some(*victim)));
        }
    }
}

/// Adds the castles `king` may play right now.
///
/// Requires an unmoved king and rook on their home squares, empty squares
/// between them, and no attack on the king's square, the square it
/// crosses, or its destination.
pub(super) fn push_castles(board: &BoardState, king: &Piece, moves: &mut Vec<Move>) {
    if board.unmoved_king(king.color) != Some(king) {
        return;
    }
    let them = king.color.opposite();
    if is_attacked(board, king.position, them) {
        return;
    }
    let row = king.position.row();

    for side in CastleSide::BOTH {
        let Some(rook) = board.castle_rook(king.color, side) else {
            continue;
        };

        let (low, high) = if side.rook_col() < KING_COL {
            (side.rook_col() + 1, KING_COL)
        } else {
            (KING_COL + 1, side.rook_col())
        };
        let blocked = (low..high).any(|col| {
            Square::new(row, col).map_or(true, |sq| board.piece_at(sq).is_some())
        });
        if blocked {
            continue;
        }

        let (near, far) = if side.king_to_col() < KING_COL {
            (side.king_to_col(), KING_COL - 1)
        } else {
            (KING_COL + 1, side.king_to_col())
        };
        let crosses_attack = (near..=far).any(|col| {
            Square::new(row, col).map_or(true, |sq| is_attacked(board, sq, them))
        });
        if crosses_attack {
            continue;
        }

        if let Some(to) = Square::new(row, side.king_to_col()) {
            moves.push(Move::castle(*king, *rook, to, side));
        }
    }
}
