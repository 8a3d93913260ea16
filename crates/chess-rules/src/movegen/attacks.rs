//! Attack tables and the square-attacked predicate.
//!
//! Knight, king and pawn attacks come from tables built at compile time.
//! Sliding pieces cast rays square by square and stop at the first
//! occupied square, which is included.
//!
//! Nothing in this module generates legal moves, so checking whether a
//! square is attacked never recurses into legality filtering.

use crate::{Bitboard, BoardState, Piece};
use chess_rules_core::{Color, PieceKind, Square};

/// `(drow, dcol)` steps along files and ranks.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// `(drow, dcol)` steps along diagonals.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);

/// Precomputed king attack tables.
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_OFFSETS);

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, -1), (-1, 1)]),
    leaper_table(&[(1, -1), (1, 1)]),
];

/// Builds a per-square table of the on-board targets of fixed offsets.
const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut index = 0;

    while index < 64 {
        let row = (index / 8) as i8;
        let col = (index % 8) as i8;
        let mut bits = 0u64;

        let mut i = 0;
        while i < offsets.len() {
            let r = row + offsets[i].0;
            let c = col + offsets[i].1;
            // Off-board targets are never evaluated.
            if r >= 0 && r < 8 && c >= 0 && c < 8 {
                bits |= 1u64 << ((r * 8 + c) as u32);
            }
            i += 1;
        }

        table[index] = Bitboard(bits);
        index += 1;
    }

    table
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks (adjacent squares) from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the diagonal squares a pawn of `color` attacks from `sq`.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Casts rays from `from` and collects every square up to and including the
/// first occupied one in each direction.
pub fn ray_attacks(from: Square, directions: &[(i8, i8)], occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(drow, dcol) in directions {
        let mut current = from;
        while let Some(next) = current.offset(drow, dcol) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            current = next;
        }
    }
    attacks
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, &BISHOP_DIRECTIONS, occupied)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, &ROOK_DIRECTIONS, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Returns the squares `piece` attacks.
///
/// Pawns attack only their diagonals and kings only adjacent squares;
/// pushes and castles are not attacks.
pub fn piece_attacks(piece: &Piece, occupied: Bitboard) -> Bitboard {
    let sq = piece.position;
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(sq, piece.color),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::King => king_attacks(sq),
    }
}

/// Returns every square attacked by `by`.
pub fn attacked_squares(board: &BoardState, by: Color) -> Bitboard {
    let occupied = board.occupied();
    board
        .pieces_of(by)
        .fold(Bitboard::EMPTY, |acc, piece| acc | piece_attacks(piece, occupied))
}

/// Returns true if any piece of `by` attacks `sq`.
///
/// The occupant of `sq`, if any, plays no part: the square is attacked
/// whoever stands on it.
pub fn is_attacked(board: &BoardState, sq: Square, by: Color) -> bool {
    is_attacked_through(board, sq, by, board.occupied())
}

/// Returns true if `color`'s king is attacked.
pub fn is_in_check(board: &BoardState, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_attacked(board, king, color.opposite()))
}

/// Like [`is_attacked`], with sliders blocked only by `occupied`.
///
/// Looks outward from `sq` for an attacker of each kind instead of
/// enumerating the attacker's moves.
pub(crate) fn is_attacked_through(
    board: &BoardState,
    sq: Square,
    by: Color,
    occupied: Bitboard,
) -> bool {
    let holds = |from: Square, kinds: &[PieceKind]| {
        board
            .piece_at(from)
            .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
    };

    // A pawn of `by` attacks `sq` from where a pawn of the other color on
    // `sq` would attack.
    if pawn_attacks(sq, by.opposite())
        .iter()
        .any(|from| holds(from, &[PieceKind::Pawn]))
    {
        return true;
    }

    if knight_attacks(sq)
        .iter()
        .any(|from| holds(from, &[PieceKind::Knight]))
    {
        return true;
    }

    if king_attacks(sq)
        .iter()
        .any(|from| holds(from, &[PieceKind::King]))
    {
        return true;
    }

    let straight = [PieceKind::Rook, PieceKind::Queen];
    if ROOK_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_occupied(sq, dir, occupied))
        .any(|from| holds(from, &straight))
    {
        return true;
    }

    let diagonal = [PieceKind::Bishop, PieceKind::Queen];
    BISHOP_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_occupied(sq, dir, occupied))
        .any(|from| holds(from, &diagonal))
}

fn first_occupied(from: Square, (drow, dcol): (i8, i8), occupied: Bitboard) -> Option<Square> {
    let mut current = from;
    while let Some(next) = current.offset(drow, dcol) {
        if occupied.contains(next) {
            return Some(next);
        }
        current = next;
    }
    None
}
