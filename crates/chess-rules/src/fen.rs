//! FEN import and export for [`BoardState`].
//!
//! FEN records castling rights and the en passant target square, while the
//! board keeps per-piece flags. Import maps the fields onto the flags of the
//! king, the corner rooks and the double-pushed pawn; export reads them back.

use crate::board::{CastleSide, BACK_RANK, KING_COL};
use crate::{BoardState, Piece, RulesError};
use chess_rules_core::{CastlingRights, Color, FenFields, PieceKind, Square};

impl BoardState {
    /// Parses a FEN string into a validated board.
    ///
    /// Syntax errors come back as [`RulesError::Fen`]; positions that parse
    /// but cannot be played from are [`RulesError::InvalidPosition`].
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let fields = FenFields::parse(fen)?;
        Self::from_fen_fields(&fields)
    }

    /// Builds a validated board from tokenized FEN fields.
    pub fn from_fen_fields(fields: &FenFields) -> Result<Self, RulesError> {
        let mut board = BoardState::empty();

        for sq in Square::all() {
            if let Some((kind, color)) = fields.placement[sq.index() as usize] {
                let mut piece = Piece::new(color, kind, sq);
                piece.has_moved = !starts_unmoved(&piece, &fields.castling);
                board.put(piece);
            }
        }

        for color in Color::ALL {
            for side in CastleSide::BOTH {
                let right = match side {
                    CastleSide::Kingside => fields.castling.kingside(color),
                    CastleSide::Queenside => fields.castling.queenside(color),
                };
                if right && !board.can_castle(color, side) {
                    return Err(RulesError::InvalidPosition(format!(
                        "{} castling right {} without king and rook on their home squares",
                        color,
                        side.notation()
                    )));
                }
            }
        }

        board.turn = fields.active_color;
        board.halfmove_clock = fields.halfmove_clock;
        board.fullmove_number = fields.fullmove_number.max(1);

        if let Some(target) = fields.en_passant {
            board.mark_en_passant(target)?;
        }

        board.validate()?;
        Ok(board)
    }

    /// Returns the board as tokenized FEN fields.
    pub fn to_fen_fields(&self) -> FenFields {
        let mut placement = [None; 64];
        for piece in self.pieces() {
            placement[piece.position.index() as usize] = Some((piece.kind, piece.color));
        }

        FenFields {
            placement,
            active_color: self.turn,
            castling: self.castling_rights(),
            en_passant: self.en_passant_target(),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Returns the board in FEN notation.
    pub fn to_fen(&self) -> String {
        self.to_fen_fields().to_fen()
    }

    /// Flags the pawn that just passed over `target`.
    fn mark_en_passant(&mut self, target: Square) -> Result<(), RulesError> {
        let pusher = self.turn.opposite();
        let dir = pusher.pawn_direction();
        let expected_row = (pusher.pawn_row() as i8 + dir) as u8;

        let invalid = || {
            RulesError::InvalidPosition(format!(
                "en passant square {} has no pawn that just double-stepped past it",
                target
            ))
        };

        if target.row() != expected_row || self.piece_at(target).is_some() {
            return Err(invalid());
        }
        let origin = target.offset(-dir, 0).ok_or_else(invalid)?;
        if self.piece_at(origin).is_some() {
            return Err(invalid());
        }

        let landing = target.offset(dir, 0).ok_or_else(invalid)?;
        let pawn = self
            .piece_at_mut(landing)
            .filter(|p| p.kind == PieceKind::Pawn && p.color == pusher)
            .ok_or_else(invalid)?;
        pawn.en_passant_eligible = true;
        pawn.has_moved = true;
        Ok(())
    }
}

/// Decides whether a piece read from FEN counts as never having moved.
///
/// Kings and rooks follow the castling field. Pawns are unmoved on their
/// starting row. Other pieces are unmoved on their starting square, which
/// no rule reads but keeps the flag plausible.
fn starts_unmoved(piece: &Piece, castling: &CastlingRights) -> bool {
    let color = piece.color;
    let sq = piece.position;
    let on_back_row = sq.row() == color.back_row();

    match piece.kind {
        PieceKind::Pawn => sq.row() == color.pawn_row(),
        PieceKind::King => on_back_row && sq.col() == KING_COL && castling.any(color),
        PieceKind::Rook => {
            on_back_row
                && ((sq.col() == CastleSide::Kingside.rook_col() && castling.kingside(color))
                    || (sq.col() == CastleSide::Queenside.rook_col()
                        && castling.queenside(color)))
        }
        kind => on_back_row && BACK_RANK[sq.col() as usize] == kind,
    }
}
