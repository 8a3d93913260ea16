//! Move execution.
//!
//! [`BoardState::make`] applies a generated move in place and returns the
//! [`Undo`] record that [`BoardState::unmake`] needs to restore the board
//! exactly. Legality probing uses the pair on a scratch board; the public
//! entry points check legality first and build the move's notation.

use crate::movegen::{is_legal, legal_moves_from};
use crate::{san, BoardState, Move, MoveKind, RulesError};
use chess_rules_core::{Color, PieceKind, Square};
use tracing::{debug, trace};

/// What [`BoardState::unmake`] needs beyond the move itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Undo {
    mv: Move,
    /// Square of the pawn whose en passant flag the move cleared.
    en_passant_cleared: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl BoardState {
    /// Applies `mv` without checking legality.
    ///
    /// `mv` must come from move generation on this exact board.
    pub(crate) fn make(&mut self, mv: &Move) -> Undo {
        let en_passant_cleared = self.en_passant_pawn().map(|p| p.position);
        if let Some(pawn) = en_passant_cleared.and_then(|sq| self.piece_at_mut(sq)) {
            pawn.en_passant_eligible = false;
        }

        let undo = Undo {
            mv: *mv,
            en_passant_cleared,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        if let Some(captured) = mv.capture() {
            self.take(captured.position);
        }

        let mut moved = mv.piece();
        self.take(moved.position);
        moved.position = mv.to();
        moved.has_moved = true;
        moved.en_passant_eligible = mv.kind() == MoveKind::DoublePawnPush;
        if let Some(kind) = mv.promotion() {
            moved.kind = kind;
        }
        self.put(moved);

        if let Some((mut rook, to)) = rook_destination(mv) {
            self.take(rook.position);
            rook.position = to;
            rook.has_moved = true;
            self.put(rook);
        }

        if mv.piece().kind == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = self.turn.opposite();

        undo
    }

    /// Reverts the move recorded in `undo`.
    pub(crate) fn unmake(&mut self, undo: Undo) {
        let mv = undo.mv;

        if let Some((rook, to)) = rook_destination(&mv) {
            self.take(to);
            self.put(rook);
        }

        self.take(mv.to());
        self.put(mv.piece());
        if let Some(captured) = mv.capture() {
            self.put(captured);
        }

        if let Some(pawn) = undo.en_passant_cleared.and_then(|sq| self.piece_at_mut(sq)) {
            pawn.en_passant_eligible = true;
        }

        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.turn = mv.piece().color;
    }

    /// Plays a legal move in place and returns its SAN.
    ///
    /// The board is left unchanged when the move is not legal here.
    pub fn play(&mut self, mv: &Move) -> Result<String, RulesError> {
        if !is_legal(self, mv) {
            debug!(mv = %mv, fen = %self.to_fen(), "rejected illegal move");
            return Err(RulesError::IllegalMove {
                from: mv.from(),
                to: mv.to(),
            });
        }

        let mut notation = san::san_body(self, mv);
        self.make(mv);
        notation.push_str(san::check_suffix(self));

        if let Some(kind) = mv.promotion() {
            debug!(square = %mv.to(), piece = %kind, "promoted pawn");
        }
        trace!(mv = %mv, san = %notation, "applied move");
        Ok(notation)
    }

    /// Finds the legal move a (from, to, promotion) request stands for.
    ///
    /// A king move onto its own castling rook's square resolves to that
    /// castle. A pawn reaching the last rank without a promotion piece is
    /// [`RulesError::AmbiguousPromotion`]; the board is never changed.
    pub fn resolve(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move, RulesError> {
        let illegal = RulesError::IllegalMove { from, to };

        let candidates: Vec<Move> = legal_moves_from(self, from)
            .into_iter()
            .filter(|mv| mv.to() == to || mv.castle_rook().is_some_and(|r| r.position == to))
            .collect();

        let Some(first) = candidates.first().copied() else {
            debug!(%from, %to, "no legal move matches request");
            return Err(illegal);
        };

        if !first.is_promotion() {
            return match promotion {
                Some(_) => Err(illegal),
                None => Ok(first),
            };
        }

        match promotion {
            None => {
                debug!(%from, %to, "promotion piece required");
                Err(RulesError::AmbiguousPromotion { from, to })
            }
            Some(kind) => candidates
                .into_iter()
                .find(|mv| mv.promotion() == Some(kind))
                .ok_or(illegal),
        }
    }
}

/// Returns the castling rook as it stood and the square it lands on.
fn rook_destination(mv: &Move) -> Option<(crate::Piece, Square)> {
    let rook = mv.castle_rook()?;
    let side = mv.kind().castle_side()?;
    let to = Square::new(rook.position.row(), side.rook_to_col())?;
    Some((rook, to))
}

/// Applies a legal move to a copy of `board`.
///
/// Returns the new board and the move's SAN, including a `+` or `#`
/// suffix. `board` itself is never modified.
pub fn apply(board: &BoardState, mv: &Move) -> Result<(BoardState, String), RulesError> {
    let mut next = board.clone();
    let notation = next.play(mv)?;
    Ok((next, notation))
}
