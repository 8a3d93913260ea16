//! Board state: the piece registry, the side to move, and the move clocks.

use crate::movegen::is_in_check;
use crate::{Bitboard, RulesError};
use chess_rules_core::{CastlingRights, Color, PieceKind, Square};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Column the kings start on.
pub(crate) const KING_COL: u8 = 4;

/// Piece order along each back rank at the start of a game.
pub(crate) const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A piece on the board together with the flags the rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
    pub position: Square,
    /// Set once the piece has left its square. Castling reads it for kings and rooks.
    pub has_moved: bool,
    /// Set only on a pawn that double-stepped on the previous move.
    pub en_passant_eligible: bool,
}

impl Piece {
    /// Creates an unmoved piece.
    pub const fn new(color: Color, kind: PieceKind, position: Square) -> Self {
        Piece {
            color,
            kind,
            position,
            has_moved: false,
            en_passant_eligible: false,
        }
    }

    /// Returns the FEN character for this piece.
    pub const fn fen_char(&self) -> char {
        self.kind.to_fen_char(self.color)
    }
}

/// The two castling directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// Column of the rook that takes part.
    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// Column the king lands on.
    pub const fn king_to_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// Column the rook lands on, next to the king on the side it came from.
    pub const fn rook_to_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Algebraic notation for the castle.
    pub const fn notation(self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }
}

/// Complete rule state of a position.
///
/// Pieces are stored in a 64-entry registry indexed by [`Square::index`], so
/// at most one piece can occupy a square by construction. Two boards compare
/// equal when the rules cannot tell them apart: same placement, castling
/// availability, en passant target, side to move and clocks. Flags that no
/// rule reads (such as `has_moved` on a knight) are ignored.
#[derive(Debug, Clone)]
pub struct BoardState {
    pub(crate) squares: [Option<Piece>; 64],
    pub(crate) turn: Color,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::startpos()
    }
}

impl BoardState {
    /// Creates a board with no pieces, White to move.
    pub fn empty() -> Self {
        BoardState {
            squares: [None; 64],
            turn: Color::White,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        let mut board = BoardState::empty();
        for color in Color::ALL {
            for (col, kind) in (0u8..).zip(BACK_RANK) {
                if let Some(sq) = Square::new(color.back_row(), col) {
                    board.put(Piece::new(color, kind, sq));
                }
                if let Some(sq) = Square::new(color.pawn_row(), col) {
                    board.put(Piece::new(color, PieceKind::Pawn, sq));
                }
            }
        }
        board
    }

    /// Places a piece on an empty square.
    ///
    /// Intended for building positions by hand; call [`validate`](Self::validate)
    /// before playing from the result.
    pub fn place(&mut self, piece: Piece) -> Result<(), RulesError> {
        if let Some(existing) = self.piece_at(piece.position) {
            return Err(RulesError::InvalidPosition(format!(
                "{} is already occupied by a {} {}",
                piece.position, existing.color, existing.kind
            )));
        }
        self.put(piece);
        Ok(())
    }

    /// Sets the side to move.
    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    /// Sets the halfmove clock and fullmove number.
    pub fn set_clocks(&mut self, halfmove_clock: u32, fullmove_number: u32) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number.max(1);
    }

    /// Returns the side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the number of half-moves since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Returns the fullmove number, incremented after each Black move.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the piece on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index() as usize].as_ref()
    }

    /// Iterates over every live piece, a8 first.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.squares.iter().flatten()
    }

    /// Iterates over the pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    /// Returns the square of `color`'s king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|p| p.kind == PieceKind::King)
            .map(|p| p.position)
    }

    /// Returns every occupied square.
    pub fn occupied(&self) -> Bitboard {
        self.pieces().map(|p| p.position).collect()
    }

    /// Returns the squares occupied by `color`.
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.pieces_of(color).map(|p| p.position).collect()
    }

    /// Returns true while `color`'s king and the rook on `side` are both unmoved
    /// on their home squares.
    ///
    /// This is castling *availability*. Whether the castle can be played right
    /// now also depends on the squares between and on attacks.
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        self.unmoved_king(color).is_some() && self.castle_rook(color, side).is_some()
    }

    /// Returns castling availability for both sides in FEN form.
    pub fn castling_rights(&self) -> CastlingRights {
        CastlingRights {
            white_kingside: self.can_castle(Color::White, CastleSide::Kingside),
            white_queenside: self.can_castle(Color::White, CastleSide::Queenside),
            black_kingside: self.can_castle(Color::Black, CastleSide::Kingside),
            black_queenside: self.can_castle(Color::Black, CastleSide::Queenside),
        }
    }

    /// Returns the pawn that double-stepped on the previous move, if any.
    pub fn en_passant_pawn(&self) -> Option<&Piece> {
        self.pieces().find(|p| p.en_passant_eligible)
    }

    /// Returns the square the en passant pawn passed over.
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_pawn()
            .and_then(|p| p.position.offset(-p.color.pawn_direction(), 0))
    }

    /// Checks that the position can be played from.
    ///
    /// Rejects missing or duplicated kings, pawns on either back rank, the
    /// side not to move standing in check, and en passant flags that do not
    /// follow a double pawn push by the side not to move.
    pub fn validate(&self) -> Result<(), RulesError> {
        for color in Color::ALL {
            let kings = self
                .pieces_of(color)
                .filter(|p| p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(RulesError::InvalidPosition(format!(
                    "expected one {} king, found {}",
                    color, kings
                )));
            }
        }

        if let Some(pawn) = self
            .pieces()
            .find(|p| p.kind == PieceKind::Pawn && matches!(p.position.row(), 0 | 7))
        {
            return Err(RulesError::InvalidPosition(format!(
                "pawn on back rank at {}",
                pawn.position
            )));
        }

        let waiting = self.turn.opposite();
        if is_in_check(self, waiting) {
            return Err(RulesError::InvalidPosition(format!(
                "{} is in check but {} is to move",
                waiting, self.turn
            )));
        }

        let mut eligible = self.pieces().filter(|p| p.en_passant_eligible);
        if let Some(pawn) = eligible.next() {
            if eligible.next().is_some() {
                return Err(RulesError::InvalidPosition(
                    "more than one piece marked en passant".to_string(),
                ));
            }
            if !self.follows_double_push(pawn, waiting) {
                return Err(RulesError::InvalidPosition(format!(
                    "en passant flag on {} does not follow a double pawn push",
                    pawn.position
                )));
            }
        }

        Ok(())
    }

    fn follows_double_push(&self, pawn: &Piece, mover: Color) -> bool {
        let dir = pawn.color.pawn_direction();
        let landing_row = pawn.color.pawn_row() as i8 + 2 * dir;
        let is_empty = |sq: Option<Square>| sq.is_some_and(|sq| self.piece_at(sq).is_none());

        pawn.kind == PieceKind::Pawn
            && pawn.color == mover
            && pawn.position.row() as i8 == landing_row
            && is_empty(pawn.position.offset(-dir, 0))
            && is_empty(pawn.position.offset(-2 * dir, 0))
    }

    pub(crate) fn unmoved_king(&self, color: Color) -> Option<&Piece> {
        let home = Square::new(color.back_row(), KING_COL)?;
        self.piece_at(home)
            .filter(|p| p.color == color && p.kind == PieceKind::King && !p.has_moved)
    }

    pub(crate) fn castle_rook(&self, color: Color, side: CastleSide) -> Option<&Piece> {
        let corner = Square::new(color.back_row(), side.rook_col())?;
        self.piece_at(corner)
            .filter(|p| p.color == color && p.kind == PieceKind::Rook && !p.has_moved)
    }

    #[inline]
    pub(crate) fn put(&mut self, piece: Piece) {
        self.squares[piece.position.index() as usize] = Some(piece);
    }

    #[inline]
    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize].take()
    }

    #[inline]
    pub(crate) fn piece_at_mut(&mut self, sq: Square) -> Option<&mut Piece> {
        self.squares[sq.index() as usize].as_mut()
    }
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        let same_placement = self
            .squares
            .iter()
            .zip(other.squares.iter())
            .all(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => a.color == b.color && a.kind == b.kind,
                (None, None) => true,
                _ => false,
            });

        same_placement
            && self.turn == other.turn
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.castling_rights() == other.castling_rights()
            && self.en_passant_target() == other.en_passant_target()
    }
}

impl Eq for BoardState {}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8u8 {
                let c = Square::new(row, col)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |p| p.fen_char());
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
