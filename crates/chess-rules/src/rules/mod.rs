//! Game status, results and the rule set abstraction.
//!
//! [`game_status`] decides everything that can be read off a single board:
//! check, checkmate, stalemate, insufficient material and the 75-move rule.
//! Repetition needs the move history and lives in [`Game`](crate::Game).

mod standard;

pub use standard::StandardChess;

use crate::movegen::{has_legal_move, is_in_check};
use crate::{BoardState, Move, RulesError};
use chess_rules_core::{Color, PieceKind};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-moves without a capture or pawn move after which a draw may be claimed.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Half-moves without a capture or pawn move after which the game is drawn.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// State of the position for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameStatus {
    InProgress,
    /// The side to move is attacked but has a legal reply.
    Check,
    /// The side to move is attacked and has no legal move.
    Checkmate,
    /// The side to move is not attacked and has no legal move.
    Stalemate,
    /// Drawn by a rule that applies without a claim.
    Draw(DrawReason),
}

impl GameStatus {
    /// Returns true for checkmate, stalemate and automatic draws.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }

    /// Converts a terminal status into a result, given the side to move.
    pub const fn result(self, to_move: Color) -> Option<GameResult> {
        match self {
            GameStatus::Checkmate => Some(GameResult::win_for(to_move.opposite())),
            GameStatus::Stalemate => Some(GameResult::Draw(DrawReason::Stalemate)),
            GameStatus::Draw(reason) => Some(GameResult::Draw(reason)),
            GameStatus::InProgress | GameStatus::Check => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => f.write_str("in progress"),
            GameStatus::Check => f.write_str("check"),
            GameStatus::Checkmate => f.write_str("checkmate"),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::Draw(reason) => write!(f, "draw ({})", reason),
        }
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameResult {
    /// White wins (checkmate or resignation).
    WhiteWins,
    /// Black wins (checkmate or resignation).
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    /// The result where `winner` wins.
    pub const fn win_for(winner: Color) -> Self {
        match winner {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// Returns the winning color, if any.
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw(_) => None,
        }
    }

    /// Returns the PGN result token.
    pub const fn pgn_token(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => f.write_str("white wins"),
            GameResult::BlackWins => f.write_str("black wins"),
            GameResult::Draw(reason) => write!(f, "draw ({})", reason),
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrawReason {
    /// Stalemate - no legal moves but not in check.
    Stalemate,
    /// Insufficient material to checkmate.
    InsufficientMaterial,
    /// 50-move rule (100 half-moves without pawn move or capture) - claimable.
    FiftyMoveRule,
    /// 75-move rule (150 half-moves) - automatic draw.
    SeventyFiveMoveRule,
    /// Threefold repetition - claimable.
    ThreefoldRepetition,
    /// Fivefold repetition - automatic draw.
    FivefoldRepetition,
    /// Draw by agreement.
    Agreement,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoveRule => "fifty-move rule",
            DrawReason::SeventyFiveMoveRule => "seventy-five-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::FivefoldRepetition => "fivefold repetition",
            DrawReason::Agreement => "agreement",
        };
        f.write_str(text)
    }
}

/// Reports the status of `board` for the side to move.
///
/// Checkmate and stalemate take precedence over the automatic draws, so a
/// mate delivered on the 150th quiet half-move still counts.
pub fn game_status(board: &BoardState) -> GameStatus {
    let in_check = is_in_check(board, board.turn());

    if !has_legal_move(board) {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if is_insufficient_material(board) {
        return GameStatus::Draw(DrawReason::InsufficientMaterial);
    }
    if board.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
        return GameStatus::Draw(DrawReason::SeventyFiveMoveRule);
    }

    if in_check {
        GameStatus::Check
    } else {
        GameStatus::InProgress
    }
}

/// Returns true if neither side can possibly deliver checkmate.
///
/// Covers king against king, a single minor piece against a bare king, and
/// any number of bishops that all stand on squares of one color.
pub fn is_insufficient_material(board: &BoardState) -> bool {
    let mut minors = board.pieces().filter(|p| p.kind != PieceKind::King);

    let Some(first) = minors.next() else {
        return true;
    };
    if !matches!(first.kind, PieceKind::Knight | PieceKind::Bishop) {
        return false;
    }

    let rest: Vec<_> = minors.collect();
    if rest.is_empty() {
        return true;
    }

    first.kind == PieceKind::Bishop
        && rest.iter().all(|p| {
            p.kind == PieceKind::Bishop && p.position.is_light() == first.position.is_light()
        })
}

/// Trait for the rules a [`Game`](crate::Game) is played under.
///
/// # Example
///
/// ```
/// use chess_rules::rules::{RuleSet, StandardChess};
///
/// let board = StandardChess.initial_position();
/// let moves = StandardChess.legal_moves(&board);
/// assert_eq!(moves.len(), 20);
/// ```
pub trait RuleSet {
    /// Returns the initial position for this rule set.
    fn initial_position(&self) -> BoardState;

    /// Generates all legal moves for the side to move.
    fn legal_moves(&self, board: &BoardState) -> Vec<Move>;

    /// Returns true if the given move is legal on the board.
    fn is_legal(&self, board: &BoardState, mv: &Move) -> bool;

    /// Applies a legal move, returning the new board and the move's SAN.
    fn apply(&self, board: &BoardState, mv: &Move) -> Result<(BoardState, String), RulesError>;

    /// Returns true if the side to move is in check.
    fn is_check(&self, board: &BoardState) -> bool;

    /// Returns the status of the board for the side to move.
    fn status(&self, board: &BoardState) -> GameStatus;

    /// Returns the game result if the board is terminal.
    ///
    /// Repetition draws need the history held by [`Game`](crate::Game).
    fn game_result(&self, board: &BoardState) -> Option<GameResult> {
        self.status(board).result(board.turn())
    }

    /// Returns true if the game is over.
    fn is_game_over(&self, board: &BoardState) -> bool {
        self.game_result(board).is_some()
    }

    /// Returns true if neither side has sufficient material to checkmate.
    fn is_insufficient_material(&self, board: &BoardState) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(fen: &str) -> GameStatus {
        game_status(&BoardState::from_fen(fen).unwrap())
    }

    #[test]
    fn startpos_in_progress() {
        assert_eq!(game_status(&BoardState::startpos()), GameStatus::InProgress);
    }

    #[test]
    fn check_with_escape() {
        assert_eq!(status("4k3/8/8/8/8/8/8/4KR2 b - - 0 1"), GameStatus::InProgress);
        assert_eq!(status("4k3/8/8/8/8/8/8/4RK2 b - - 0 1"), GameStatus::Check);
    }

    #[test]
    fn checkmate_and_stalemate() {
        // Fool's mate
        let mate = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        assert_eq!(status(mate), GameStatus::Checkmate);
        assert_eq!(
            status(mate).result(Color::White),
            Some(GameResult::BlackWins)
        );

        let stalemate = "k7/8/1Q6/8/8/8/8/7K b - - 0 1";
        assert_eq!(status(stalemate), GameStatus::Stalemate);
        assert!(status(stalemate).is_terminal());
    }

    #[test]
    fn insufficient_material_cases() {
        let drawn = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2N1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            // c1 and f8 are both dark.
            "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ];
        for fen in drawn {
            assert_eq!(
                status(fen),
                GameStatus::Draw(DrawReason::InsufficientMaterial),
                "{}",
                fen
            );
        }

        let playable = [
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",
            // c1 is dark, c8 is light.
            "2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "4kn2/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ];
        for fen in playable {
            assert_eq!(status(fen), GameStatus::InProgress, "{}", fen);
        }
    }

    #[test]
    fn seventy_five_move_rule() {
        assert_eq!(
            status("4k3/8/8/8/8/8/8/R3K3 w - - 150 90"),
            GameStatus::Draw(DrawReason::SeventyFiveMoveRule)
        );
        assert_eq!(
            status("4k3/8/8/8/8/8/8/R3K3 w - - 149 90"),
            GameStatus::InProgress
        );
    }

    #[test]
    fn result_tokens() {
        assert_eq!(GameResult::WhiteWins.pgn_token(), "1-0");
        assert_eq!(GameResult::BlackWins.pgn_token(), "0-1");
        assert_eq!(
            GameResult::Draw(DrawReason::Agreement).pgn_token(),
            "1/2-1/2"
        );
        assert_eq!(GameResult::win_for(Color::Black).winner(), Some(Color::Black));
    }
}
