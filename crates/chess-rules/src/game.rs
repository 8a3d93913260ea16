//! Full game management with history tracking.
//!
//! The [`Game`] struct wraps one [`BoardState`] with what the board alone
//! cannot know:
//! - Position history for repetition detection
//! - Move history with SAN notation
//! - A pending promotion awaiting the player's choice
//! - Claimed, agreed and resigned endings

use crate::mov::parse_uci;
use crate::movegen::{is_in_check, legal_moves, legal_moves_from};
use crate::rules::{
    DrawReason, GameResult, GameStatus, RuleSet, StandardChess, FIFTY_MOVE_PLIES,
};
use crate::san::{move_to_san, san_to_move, SanError};
use crate::{BoardState, Move, RulesError};
use chess_rules_core::{PieceKind, Square};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Occurrences of one position that end the game without a claim.
const FIVEFOLD: usize = 5;

/// Occurrences of one position that allow a draw claim.
const THREEFOLD: usize = 3;

/// A recorded move in game history.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameMove {
    /// The move as generated.
    pub mv: Move,
    /// SAN notation for the move.
    pub san: String,
    /// Zobrist hash of the position before the move.
    pub hash_before: u64,
}

/// A pawn move to the last rank waiting for a promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
}

/// A complete chess game with history tracking.
///
/// A failed call leaves the game as it was, except that a promotion
/// request without a piece is remembered as pending.
#[derive(Debug, Clone)]
pub struct Game {
    /// Current position.
    board: BoardState,
    /// Starting position.
    start: BoardState,
    /// Position hashes for repetition detection, the start position first.
    history: Vec<u64>,
    /// Move history with SAN notation.
    moves: Vec<GameMove>,
    /// Promotion waiting for a piece choice.
    pending: Option<PendingPromotion>,
    /// Game result if the game has ended.
    result: Option<GameResult>,
    /// PGN tag pairs in insertion order.
    tags: Vec<(String, String)>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::start_from(StandardChess.initial_position())
    }

    /// Creates a game from a custom starting position.
    ///
    /// The board is validated first; a position that is already over (mate,
    /// stalemate, dead material) yields a game with its result set.
    pub fn from_board(board: BoardState) -> Result<Self, RulesError> {
        board.validate()?;
        Ok(Self::start_from(board))
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        Self::from_board(BoardState::from_fen(fen)?)
    }

    fn start_from(board: BoardState) -> Self {
        let hash = board.zobrist_hash();
        let mut game = Game {
            board: board.clone(),
            start: board,
            history: vec![hash],
            moves: Vec::new(),
            pending: None,
            result: None,
            tags: Vec::new(),
        };
        game.check_game_end();
        game
    }

    /// Returns the current board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Returns the starting board.
    pub fn start_board(&self) -> &BoardState {
        &self.start
    }

    /// Returns all legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board)
    }

    /// Returns the legal moves of the piece on `sq`.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        legal_moves_from(&self.board, sq)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.board.turn())
    }

    /// Returns the status of the current position.
    ///
    /// Endings that are not visible on the board (resignation, agreement,
    /// claimed or fivefold repetition) are reported by [`result`](Self::result).
    pub fn status(&self) -> GameStatus {
        StandardChess.status(&self.board)
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// Returns the move history.
    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    /// Returns the number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Returns the current full move number.
    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmove_number()
    }

    /// Returns the promotion waiting for a piece choice, if any.
    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending
    }

    /// Plays a legal move and returns its SAN.
    pub fn play(&mut self, mv: &Move) -> Result<String, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }

        let hash_before = self.board.zobrist_hash();
        let san = self.board.play(mv)?;
        self.pending = None;

        self.moves.push(GameMove {
            mv: *mv,
            san: san.clone(),
            hash_before,
        });
        self.history.push(self.board.zobrist_hash());
        self.check_game_end();

        Ok(san)
    }

    /// Plays the move a (from, to) request stands for.
    ///
    /// When the move reaches the last rank and `promotion` is `None`, the
    /// request is kept as the pending promotion, nothing is played, and
    /// [`RulesError::AmbiguousPromotion`] is returned. Finish it with
    /// [`choose_promotion`](Self::choose_promotion).
    pub fn play_squares(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<String, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }

        match self.board.resolve(from, to, promotion) {
            Ok(mv) => self.play(&mv),
            Err(err @ RulesError::AmbiguousPromotion { .. }) => {
                debug!(%from, %to, "promotion pending");
                self.pending = Some(PendingPromotion { from, to });
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Completes the pending promotion with `kind`.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<String, RulesError> {
        let pending = self.pending.ok_or(RulesError::NoPendingPromotion)?;
        let mv = self.board.resolve(pending.from, pending.to, Some(kind))?;
        self.play(&mv)
    }

    /// Drops the pending promotion, returning it.
    pub fn cancel_promotion(&mut self) -> Option<PendingPromotion> {
        self.pending.take()
    }

    /// Plays a move given in SAN notation.
    ///
    /// A promotion written without its piece ("a8") becomes the pending
    /// promotion, as with [`play_squares`](Self::play_squares).
    pub fn play_san(&mut self, san: &str) -> Result<String, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }
        match san_to_move(&self.board, san) {
            Ok(mv) => self.play(&mv),
            Err(SanError::PromotionPieceRequired { from, to }) => {
                self.play_squares(from, to, None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Plays a move given in UCI notation (e.g., "e2e4", "e7e8q").
    ///
    /// Castles are written as the king's two-square move. A pawn move to
    /// the last rank without a piece letter becomes the pending promotion.
    pub fn play_uci(&mut self, uci: &str) -> Result<String, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }
        let (from, to, promotion) =
            parse_uci(uci).ok_or_else(|| RulesError::InvalidUci(uci.to_string()))?;
        self.play_squares(from, to, promotion)
    }

    /// Takes back the last move and returns it.
    ///
    /// The board is rebuilt by replaying the remaining moves from the start
    /// position. Any result is cleared unless the earlier position was
    /// itself terminal.
    pub fn takeback(&mut self) -> Option<GameMove> {
        let undone = self.moves.pop()?;
        self.history.pop();
        self.pending = None;
        self.result = None;

        let mut board = self.start.clone();
        for record in &self.moves {
            board.make(&record.mv);
        }
        self.board = board;
        self.check_game_end();

        debug!(san = %undone.san, ply = self.moves.len(), "took back move");
        Some(undone)
    }

    /// Checks if the game has ended and updates the result.
    fn check_game_end(&mut self) {
        let result = if self.position_count() >= FIVEFOLD {
            Some(GameResult::Draw(DrawReason::FivefoldRepetition))
        } else {
            self.status().result(self.board.turn())
        };

        if let Some(result) = result {
            debug!(%result, fen = %self.board.to_fen(), "game over");
            self.result = Some(result);
        }
    }

    /// Counts how many times the current position has occurred.
    pub fn position_count(&self) -> usize {
        let current = self.board.zobrist_hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Returns true if a draw can be claimed (threefold repetition or 50-move rule).
    pub fn can_claim_draw(&self) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.position_count() >= THREEFOLD || self.board.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    /// Claims a draw if conditions are met.
    pub fn claim_draw(&mut self) -> Result<GameResult, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }

        let reason = if self.position_count() >= THREEFOLD {
            DrawReason::ThreefoldRepetition
        } else if self.board.halfmove_clock() >= FIFTY_MOVE_PLIES {
            DrawReason::FiftyMoveRule
        } else {
            return Err(RulesError::CannotClaimDraw);
        };

        self.finish(GameResult::Draw(reason))
    }

    /// Agrees to a draw (both players must agree in real chess).
    pub fn agree_draw(&mut self) -> Result<GameResult, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }
        self.finish(GameResult::Draw(DrawReason::Agreement))
    }

    /// Resigns the game for the side to move.
    pub fn resign(&mut self) -> Result<GameResult, RulesError> {
        if self.result.is_some() {
            return Err(RulesError::GameOver);
        }
        self.finish(GameResult::win_for(self.board.turn().opposite()))
    }

    fn finish(&mut self, result: GameResult) -> Result<GameResult, RulesError> {
        debug!(%result, "game ended by the players");
        self.pending = None;
        self.result = Some(result);
        Ok(result)
    }

    /// Records a result read from outside the board, such as a PGN result
    /// token. Ignored once the game is over.
    pub(crate) fn record_result(&mut self, result: GameResult) {
        if self.result.is_none() {
            self.result = Some(result);
        }
    }

    /// Returns the value of a PGN tag.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every PGN tag pair in insertion order.
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Sets a PGN tag, replacing any earlier value.
    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((name, value)),
        }
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    /// Generates SAN for a move in the current position.
    pub fn move_to_san(&self, mv: &Move) -> String {
        move_to_san(&self.board, mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.ply_count(), 0);
        assert!(!game.is_game_over());
        assert!(!game.is_check());
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn play_uci() {
        let mut game = Game::new();
        assert_eq!(game.play_uci("e2e4").unwrap(), "e4");
        assert_eq!(game.ply_count(), 1);
        assert_eq!(game.move_history()[0].san, "e4");
        assert!(matches!(
            game.play_uci("e9e5"),
            Err(RulesError::InvalidUci(_))
        ));
    }

    #[test]
    fn play_san() {
        let mut game = Game::new();
        game.play_san("e4").unwrap();
        assert_eq!(game.ply_count(), 1);
        game.play_san("e5").unwrap();
        assert_eq!(game.ply_count(), 2);
        assert!(matches!(game.play_san("Ke3"), Err(RulesError::San(_))));
    }

    #[test]
    fn illegal_move() {
        let mut game = Game::new();
        let before = game.to_fen();
        assert_eq!(
            game.play_uci("e2e5"),
            Err(RulesError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert_eq!(game.to_fen(), before);
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn checkmate_fools_mate() {
        let mut game = Game::new();
        game.play_san("f3").unwrap();
        game.play_san("e5").unwrap();
        game.play_san("g4").unwrap();
        assert_eq!(game.play_san("Qh4").unwrap(), "Qh4#");
        assert!(game.is_game_over());
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert_eq!(game.result(), Some(GameResult::BlackWins));
    }

    #[test]
    fn stalemate() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn threefold_repetition() {
        let mut game = Game::new();
        for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
            game.play_san(san).unwrap();
        }
        assert_eq!(game.position_count(), 2);
        assert!(!game.can_claim_draw());
        assert_eq!(game.claim_draw(), Err(RulesError::CannotClaimDraw));

        for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
            game.play_san(san).unwrap();
        }
        assert_eq!(game.position_count(), 3);
        assert!(game.can_claim_draw());

        assert_eq!(
            game.claim_draw(),
            Ok(GameResult::Draw(DrawReason::ThreefoldRepetition))
        );
        assert!(game.is_game_over());
    }

    #[test]
    fn fivefold_repetition_is_automatic() {
        let mut game = Game::new();
        for _ in 0..4 {
            for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
                game.play_san(san).unwrap();
            }
        }
        assert_eq!(game.position_count(), 5);
        assert_eq!(
            game.result(),
            Some(GameResult::Draw(DrawReason::FivefoldRepetition))
        );
        assert_eq!(game.play_san("e4"), Err(RulesError::GameOver));
    }

    #[test]
    fn fifty_move_rule() {
        let mut game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 1").unwrap();
        assert!(!game.can_claim_draw());
        game.play_uci("a1a2").unwrap();
        assert!(game.can_claim_draw());

        assert_eq!(
            game.claim_draw(),
            Ok(GameResult::Draw(DrawReason::FiftyMoveRule))
        );
    }

    #[test]
    fn seventy_five_move_rule_automatic() {
        let game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 150 1").unwrap();
        assert!(game.is_game_over());
        assert_eq!(
            game.result(),
            Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule))
        );
    }

    #[test]
    fn insufficient_material() {
        let game = Game::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(game.is_game_over());
        assert_eq!(
            game.result(),
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        );
    }

    #[test]
    fn resign() {
        let mut game = Game::new();
        assert_eq!(game.resign(), Ok(GameResult::BlackWins));
        assert!(game.is_game_over());
        assert_eq!(game.resign(), Err(RulesError::GameOver));
    }

    #[test]
    fn agree_draw() {
        let mut game = Game::new();
        game.agree_draw().unwrap();
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Agreement)));
    }

    #[test]
    fn cannot_move_after_game_over() {
        let mut game = Game::new();
        game.resign().unwrap();
        assert_eq!(game.play_san("e4"), Err(RulesError::GameOver));
        assert_eq!(
            game.play_squares(sq("e2"), sq("e4"), None),
            Err(RulesError::GameOver)
        );
    }

    #[test]
    fn move_history() {
        let mut game = Game::new();
        game.play_san("e4").unwrap();
        game.play_san("e5").unwrap();
        game.play_san("Nf3").unwrap();

        let sans: Vec<_> = game.move_history().iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, ["e4", "e5", "Nf3"]);
        assert_eq!(
            game.move_history()[0].hash_before,
            game.start_board().zobrist_hash()
        );
    }

    #[test]
    fn pending_promotion_flow() {
        let mut game = Game::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = game.to_fen();

        assert_eq!(
            game.play_squares(sq("a7"), sq("b8"), None),
            Err(RulesError::AmbiguousPromotion {
                from: sq("a7"),
                to: sq("b8")
            })
        );
        assert_eq!(
            game.pending_promotion(),
            Some(PendingPromotion {
                from: sq("a7"),
                to: sq("b8")
            })
        );
        // Nothing moved and the turn did not pass.
        assert_eq!(game.to_fen(), before);

        assert_eq!(game.choose_promotion(PieceKind::Queen).unwrap(), "axb8=Q+");
        assert_eq!(game.pending_promotion(), None);
        assert_eq!(
            game.choose_promotion(PieceKind::Queen),
            Err(RulesError::NoPendingPromotion)
        );
    }

    #[test]
    fn cancel_and_replace_pending_promotion() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(game.play_squares(sq("a7"), sq("a8"), None).is_err());
        assert!(game.cancel_promotion().is_some());
        assert_eq!(game.cancel_promotion(), None);

        assert!(game.play_squares(sq("a7"), sq("a8"), None).is_err());
        game.play_squares(sq("e1"), sq("d2"), None).unwrap();
        assert_eq!(game.pending_promotion(), None);
    }

    #[test]
    fn promotion_without_piece_is_pending_in_every_notation() {
        let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        let ambiguous = Err(RulesError::AmbiguousPromotion {
            from: sq("a7"),
            to: sq("a8"),
        });
        let pending = Some(PendingPromotion {
            from: sq("a7"),
            to: sq("a8"),
        });

        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.play_uci("a7a8"), ambiguous);
        assert_eq!(game.pending_promotion(), pending);
        assert_eq!(game.to_fen(), fen);
        assert_eq!(game.choose_promotion(PieceKind::Rook).unwrap(), "a8=R+");

        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.play_san("a8"), ambiguous);
        assert_eq!(game.pending_promotion(), pending);
        assert_eq!(game.ply_count(), 0);
        assert_eq!(game.choose_promotion(PieceKind::Knight).unwrap(), "a8=N");

        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.play_uci("a7a8q").unwrap(), "a8=Q+");
        assert_eq!(game.pending_promotion(), None);
    }

    #[test]
    fn takeback_replays_from_start() {
        let mut game = Game::new();
        for san in ["f3", "e5", "g4", "Qh4#"] {
            game.play_san(san).unwrap();
        }
        assert!(game.is_game_over());

        let undone = game.takeback().unwrap();
        assert_eq!(undone.san, "Qh4#");
        assert!(!game.is_game_over());
        assert_eq!(game.ply_count(), 3);
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2"
        );

        while game.takeback().is_some() {}
        assert_eq!(game.board(), game.start_board());
        assert_eq!(game.takeback(), None);
    }

    #[test]
    fn tags_keep_insertion_order() {
        let mut game = Game::new();
        game.set_tag("White", "Morphy");
        game.set_tag("Black", "Duke");
        game.set_tag("White", "Paul Morphy");
        assert_eq!(game.tag("White"), Some("Paul Morphy"));
        assert_eq!(game.tags().len(), 2);
        assert_eq!(game.tags()[0].0, "White");
    }
}
