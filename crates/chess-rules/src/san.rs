//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "Qh5#"

use crate::movegen::{has_legal_move, is_in_check, legal_moves};
use crate::{BoardState, Move, MoveKind};
use chess_rules_core::{PieceKind, Square};
use thiserror::Error;

/// Error type for SAN parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanError {
    /// The SAN string is empty.
    #[error("empty SAN string")]
    Empty,
    /// The SAN string has invalid format.
    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),
    /// No legal move matches the SAN.
    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),
    /// Multiple legal moves match the SAN.
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
    /// A pawn reaches the last rank but no promotion piece was given.
    #[error("promotion piece required for {from}{to}")]
    PromotionPieceRequired { from: Square, to: Square },
}

/// Converts a legal move to SAN.
///
/// `board` is the position BEFORE the move. The result carries `#` for
/// checkmate and `+` for check.
pub fn move_to_san(board: &BoardState, mv: &Move) -> String {
    let mut san = san_body(board, mv);
    let mut after = board.clone();
    after.make(mv);
    san.push_str(check_suffix(&after));
    san
}

/// SAN without the check suffix.
pub(crate) fn san_body(board: &BoardState, mv: &Move) -> String {
    if let Some(side) = mv.kind().castle_side() {
        return side.notation().to_string();
    }

    let piece = mv.piece();
    let mut san = String::with_capacity(8);

    match piece.kind.san_letter() {
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(board, mv));
            if mv.is_capture() {
                san.push('x');
            }
        }
        None => {
            // Pawn captures name the origin file instead of a piece letter.
            if mv.is_capture() {
                san.push(mv.from().file_char());
                san.push('x');
            }
        }
    }

    san.push_str(&mv.to().to_algebraic());

    if let Some(kind) = mv.promotion() {
        san.push('=');
        if let Some(letter) = kind.san_letter() {
            san.push(letter);
        }
    }

    san
}

/// Suffix for the position after a move: `#`, `+` or nothing.
pub(crate) fn check_suffix(after: &BoardState) -> &'static str {
    if !is_in_check(after, after.turn()) {
        ""
    } else if has_legal_move(after) {
        "+"
    } else {
        "#"
    }
}

/// Returns the smallest origin hint that separates `mv` from other moves of
/// the same piece kind to the same square.
fn disambiguation(board: &BoardState, mv: &Move) -> String {
    let from = mv.from();
    let rivals: Vec<Square> = legal_moves(board)
        .iter()
        .filter(|o| o.to() == mv.to() && o.piece().kind == mv.piece().kind && o.from() != from)
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|r| r.col() != from.col()) {
        return from.file_char().to_string();
    }
    if rivals.iter().all(|r| r.row() != from.row()) {
        return from.rank_char().to_string();
    }
    from.to_algebraic()
}

/// Parses a SAN string and returns the corresponding legal move.
///
/// Accepts trailing `+`, `#`, `!` and `?` annotations and the `0-0` spelling
/// of castles.
pub fn san_to_move(board: &BoardState, san: &str) -> Result<Move, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let san = san.trim_end_matches(['+', '#', '!', '?']);

    match san {
        "O-O" | "0-0" => return find_castle(board, MoveKind::CastleKingside, san),
        "O-O-O" | "0-0-0" => return find_castle(board, MoveKind::CastleQueenside, san),
        _ => {}
    }

    let parsed = ParsedSan::parse(san)?;

    let moves = legal_moves(board);
    let mut matching = moves.iter().filter(|m| parsed.matches(m));
    match (matching.next(), matching.next()) {
        (Some(m), None) => Ok(*m),
        (None, _) => Err(parsed
            .missing_promotion(&moves)
            .unwrap_or_else(|| SanError::NoMatchingMove(san.to_string()))),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

fn find_castle(board: &BoardState, kind: MoveKind, san: &str) -> Result<Move, SanError> {
    legal_moves(board)
        .into_iter()
        .find(|m| m.kind() == kind)
        .ok_or_else(|| SanError::NoMatchingMove(san.to_string()))
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    piece: PieceKind,
    from_col: Option<u8>,
    from_row: Option<u8>,
    to: Square,
    promotion: Option<PieceKind>,
}

impl ParsedSan {
    fn parse(san: &str) -> Result<Self, SanError> {
        let invalid = || SanError::InvalidFormat(san.to_string());
        if !san.is_ascii() {
            return Err(invalid());
        }

        let (piece, rest) = match san.chars().next().and_then(PieceKind::from_san_letter) {
            Some(kind) => (kind, &san[1..]),
            None => (PieceKind::Pawn, san),
        };

        let (rest, promotion) = match rest.split_once('=') {
            Some((head, promo)) => {
                let mut chars = promo.chars();
                let kind = chars
                    .next()
                    .and_then(PieceKind::from_san_letter)
                    .filter(|k| k.is_promotion_target())
                    .ok_or_else(invalid)?;
                if chars.next().is_some() {
                    return Err(invalid());
                }
                (head, Some(kind))
            }
            None => (rest, None),
        };

        let body: String = rest.chars().filter(|&c| c != 'x').collect();
        if body.len() < 2 || body.len() > 4 {
            return Err(invalid());
        }

        let (hint, dest) = body.split_at(body.len() - 2);
        let to = Square::from_algebraic(dest).ok_or_else(invalid)?;

        let mut from_col = None;
        let mut from_row = None;
        for c in hint.chars() {
            match c {
                'a'..='h' if from_col.is_none() && from_row.is_none() => {
                    from_col = Some(c as u8 - b'a');
                }
                '1'..='8' if from_row.is_none() => {
                    from_row = Some(b'8' - c as u8);
                }
                _ => return Err(invalid()),
            }
        }

        Ok(ParsedSan {
            piece,
            from_col,
            from_row,
            to,
            promotion,
        })
    }

    fn matches(&self, m: &Move) -> bool {
        self.matches_squares(m) && m.promotion() == self.promotion
    }

    fn matches_squares(&self, m: &Move) -> bool {
        m.to() == self.to
            && !m.is_castle()
            && m.piece().kind == self.piece
            && self.from_col.map_or(true, |c| m.from().col() == c)
            && self.from_row.map_or(true, |r| m.from().row() == r)
    }

    /// A promotion written without its piece, when a single pawn fits.
    fn missing_promotion(&self, moves: &[Move]) -> Option<SanError> {
        if self.promotion.is_some() {
            return None;
        }
        let mut origins = moves
            .iter()
            .filter(|m| m.is_promotion() && self.matches_squares(m))
            .map(|m| m.from());
        let from = origins.next()?;
        if origins.any(|o| o != from) {
            return None;
        }
        Some(SanError::PromotionPieceRequired { from, to: self.to })
    }
}
