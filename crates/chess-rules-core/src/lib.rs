//! Core vocabulary for the chess rules engine.
//!
//! This crate provides the leaf types every consumer of the engine shares:
//! - [`Color`] and [`PieceKind`] for piece identity
//! - [`Square`] for board coordinates, with row 0 as rank 8
//! - [`FenFields`] for tokenizing and writing FEN records

mod color;
mod fen;
mod piece;
mod square;

pub use color::Color;
pub use fen::{CastlingRights, FenError, FenFields};
pub use piece::PieceKind;
pub use square::{ParseSquareError, Square};
