//! Move representation.

use crate::board::{CastleSide, Piece};
use chess_rules_core::{PieceKind, Square};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a move does beyond relocating a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveKind {
    /// Quiet move or ordinary capture.
    Normal,
    /// Pawn advance of two squares from its starting row.
    DoublePawnPush,
    /// Pawn capture of a pawn that double-stepped past it.
    EnPassant,
    CastleKingside,
    CastleQueenside,
    /// Pawn reaching the last row, becoming the given kind.
    Promotion(PieceKind),
}

impl MoveKind {
    /// Returns the promotion piece, if any.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns the castling side, if any.
    #[inline]
    pub const fn castle_side(self) -> Option<CastleSide> {
        match self {
            MoveKind::CastleKingside => Some(CastleSide::Kingside),
            MoveKind::CastleQueenside => Some(CastleSide::Queenside),
            _ => None,
        }
    }
}

/// A fully described move.
///
/// Moves are produced by generation and carry copies of every piece they
/// touch, as they stood before the move. That makes a move self-contained:
/// executing it needs no further lookups, and undoing it restores the
/// pieces exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    piece: Piece,
    to: Square,
    capture: Option<Piece>,
    kind: MoveKind,
    castle_rook: Option<Piece>,
}

impl Move {
    pub(crate) const fn new(piece: Piece, to: Square, kind: MoveKind, capture: Option<Piece>) -> Self {
        Move {
            piece,
            to,
            capture,
            kind,
            castle_rook: None,
        }
    }

    /// Creates a castle; `to` is the king's destination.
    pub(crate) const fn castle(king: Piece, rook: Piece, to: Square, side: CastleSide) -> Self {
        let kind = match side {
            CastleSide::Kingside => MoveKind::CastleKingside,
            CastleSide::Queenside => MoveKind::CastleQueenside,
        };
        Move {
            piece: king,
            to,
            capture: None,
            kind,
            castle_rook: Some(rook),
        }
    }

    /// The moving piece, before the move.
    #[inline]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// The origin square.
    #[inline]
    pub const fn from(&self) -> Square {
        self.piece.position
    }

    /// The destination square (the king's, for castles).
    #[inline]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// The captured piece. Its position differs from [`to`](Self::to) only
    /// for en passant.
    #[inline]
    pub const fn capture(&self) -> Option<Piece> {
        self.capture
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The rook taking part in a castle.
    #[inline]
    pub const fn castle_rook(&self) -> Option<Piece> {
        self.castle_rook
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        self.castle_rook.is_some()
    }

    #[inline]
    pub const fn is_promotion(&self) -> bool {
        matches!(self.kind, MoveKind::Promotion(_))
    }

    #[inline]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.kind.promotion()
    }

    /// Converts to UCI long algebraic notation (e.g., "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        let mut s = format!("{}{}", self.from(), self.to);
        if let Some(kind) = self.promotion() {
            s.push(kind.to_fen_char(chess_rules_core::Color::Black));
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Splits UCI text into origin, destination and promotion piece.
///
/// Returns `None` for malformed text; whether the move is legal is checked
/// against a board separately.
pub fn parse_uci(uci: &str) -> Option<(Square, Square, Option<PieceKind>)> {
    let uci = uci.trim();
    if !uci.is_ascii() || !(uci.len() == 4 || uci.len() == 5) {
        return None;
    }
    let from = Square::from_algebraic(&uci[0..2])?;
    let to = Square::from_algebraic(&uci[2..4])?;
    let promotion = match uci[4..].chars().next() {
        None => None,
        Some(c) => {
            let (kind, _) = PieceKind::from_fen_char(c.to_ascii_lowercase())?;
            if !kind.is_promotion_target() {
                return None;
            }
            Some(kind)
        }
    };
    Some((from, to, promotion))
}
