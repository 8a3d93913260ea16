//! Zobrist hashing for position identification.
//!
//! Zobrist hashing creates a near-unique hash for each chess position by
//! XORing random numbers associated with:
//! - Each piece on each square (12 pieces x 64 squares = 768 values)
//! - Side to move
//! - Castling availability (4 values)
//! - En passant file (8 values), only while a capture is on offer
//!
//! Two positions with equal hashes count as the same position for the
//! repetition rules.

use crate::board::CastleSide;
use crate::BoardState;
use chess_rules_core::{Color, PieceKind, Square};

/// Number of keys: 768 piece-square keys, side to move, 4 castling
/// availabilities and 8 en passant files.
const KEY_COUNT: usize = 12 * 64 + 1 + 4 + 8;

const SIDE_OFFSET: usize = 12 * 64;
const CASTLING_OFFSET: usize = SIDE_OFFSET + 1;
const EN_PASSANT_OFFSET: usize = CASTLING_OFFSET + 4;

/// Zobrist hash keys, laid out as one flat table.
///
/// Generated by xorshift64 from a fixed seed, so hashes are stable between
/// runs and builds.
pub struct ZobristKeys {
    keys: [u64; KEY_COUNT],
}

impl ZobristKeys {
    pub const fn new() -> Self {
        let mut keys = [0u64; KEY_COUNT];
        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut i = 0;
        while i < KEY_COUNT {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            keys[i] = state;
            i += 1;
        }

        ZobristKeys { keys }
    }

    /// Key for a piece of `kind` and `color` on `square`.
    #[inline]
    pub const fn piece_key(&self, kind: PieceKind, color: Color, square: Square) -> u64 {
        let slot = (kind.index() * 2 + color.index()) * 64 + square.index() as usize;
        self.keys[slot]
    }

    /// Key XORed in when black is to move.
    #[inline]
    pub const fn side_key(&self) -> u64 {
        self.keys[SIDE_OFFSET]
    }

    /// Key for one castling availability.
    #[inline]
    pub const fn castling_key(&self, color: Color, side: CastleSide) -> u64 {
        let side_index = match side {
            CastleSide::Kingside => 0,
            CastleSide::Queenside => 1,
        };
        self.keys[CASTLING_OFFSET + color.index() * 2 + side_index]
    }

    /// Key for an en passant file (0-7).
    #[inline]
    pub const fn en_passant_key(&self, col: u8) -> u64 {
        self.keys[EN_PASSANT_OFFSET + col as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys shared by every hash, built at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

impl BoardState {
    /// Computes the Zobrist hash of the position.
    ///
    /// Clocks are not part of the hash. The en passant file only counts when
    /// a pawn of the side to move stands beside the pawn that double-stepped,
    /// so a push nobody can answer does not make the position new.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = self.pieces().fold(0u64, |acc, p| {
            acc ^ ZOBRIST.piece_key(p.kind, p.color, p.position)
        });

        if self.turn() == Color::Black {
            hash ^= ZOBRIST.side_key();
        }

        for color in Color::ALL {
            for side in CastleSide::BOTH {
                if self.can_castle(color, side) {
                    hash ^= ZOBRIST.castling_key(color, side);
                }
            }
        }

        if let Some(pawn) = self.en_passant_pawn() {
            let capturable = [-1, 1].into_iter().any(|dcol| {
                pawn.position
                    .offset(0, dcol)
                    .and_then(|sq| self.piece_at(sq))
                    .is_some_and(|p| p.kind == PieceKind::Pawn && p.color == self.turn())
            });
            if capturable {
                hash ^= ZOBRIST.en_passant_key(pawn.position.col());
            }
        }

        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_nonzero_and_distinct() {
        let mut all = vec![
            ZOBRIST.side_key(),
            ZOBRIST.castling_key(Color::White, CastleSide::Kingside),
            ZOBRIST.castling_key(Color::Black, CastleSide::Queenside),
            ZOBRIST.en_passant_key(0),
            ZOBRIST.en_passant_key(7),
        ];
        for kind in [PieceKind::Pawn, PieceKind::Knight, PieceKind::King] {
            for color in Color::ALL {
                for sq in [Square::A1, Square::B1, Square::H8] {
                    all.push(ZOBRIST.piece_key(kind, color, sq));
                }
            }
        }

        assert!(all.iter().all(|&k| k != 0));
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
    }

    #[test]
    fn hash_ignores_clocks() {
        let a = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let b = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 12 30").unwrap();
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn hash_tracks_turn_and_castling() {
        let white = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let black = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 1").unwrap();
        let no_castle = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_ne!(white.zobrist_hash(), black.zobrist_hash());
        assert_ne!(white.zobrist_hash(), no_castle.zobrist_hash());
    }

    #[test]
    fn en_passant_counts_only_when_capturable() {
        let idle_push =
            BoardState::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
                .unwrap();
        let no_target =
            BoardState::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
                .unwrap();
        assert_eq!(idle_push.zobrist_hash(), no_target.zobrist_hash());

        let live = BoardState::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let dead = BoardState::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(live.zobrist_hash(), dead.zobrist_hash());
    }
}
