//! Chess rules engine.
//!
//! This crate provides:
//! - [`BoardState`] - pieces, side to move and clocks, with FEN import/export
//! - [`Move`] - a fully described move, including castling and promotion
//! - Legal move generation, check detection and move execution
//! - [`Game`] - a played game with history, repetition draws and takebacks
//! - [`RuleSet`] - trait for the rules a game is played under
//! - SAN, UCI and PGN notation
//!
//! # Architecture
//!
//! The board is a 64-square mailbox of [`Piece`] values; [`Bitboard`] sets
//! are derived from it for occupancy and attack queries. Moves are generated
//! as pseudo-moves per piece and then filtered by playing each one on a
//! scratch board and undoing it again.
//!
//! # Example
//!
//! ```
//! use chess_rules::{apply, legal_moves, BoardState, Game};
//!
//! // Stateless: a board in, a new board out.
//! let board = BoardState::startpos();
//! let moves = legal_moves(&board);
//! assert_eq!(moves.len(), 20);
//! let (after, san) = apply(&board, &moves[0]).unwrap();
//! assert_eq!(after.fullmove_number(), 1);
//! assert!(!san.is_empty());
//!
//! // A whole game with history.
//! let mut game = Game::new();
//! game.play_san("e4").unwrap();
//! game.play_san("e5").unwrap();
//! assert_eq!(
//!     game.to_fen(),
//!     "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
//! );
//! ```

mod bitboard;
mod board;
mod error;
mod executor;
mod fen;
mod game;
mod mov;
pub mod movegen;
pub mod pgn;
pub mod rules;
pub mod san;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use board::{BoardState, CastleSide, Piece};
pub use error::RulesError;
pub use executor::apply;
pub use game::{Game, GameMove, PendingPromotion};
pub use mov::{parse_uci, Move, MoveKind};
pub use movegen::{
    attacked_squares, has_legal_move, is_attacked, is_in_check, is_legal, legal_moves,
    legal_moves_from, perft, perft_divide, pseudo_moves,
};
pub use pgn::PgnError;
pub use rules::{
    game_status, is_insufficient_material, DrawReason, GameResult, GameStatus, RuleSet,
    StandardChess, FIFTY_MOVE_PLIES,
};
pub use san::{move_to_san, san_to_move, SanError};

pub use chess_rules_core::{CastlingRights, Color, FenError, FenFields, PieceKind, Square};
