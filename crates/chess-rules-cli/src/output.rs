//! Reports printed by the command-line tool, as text or JSON.

use chess_rules::{
    is_in_check, move_to_san, BoardState, Color, Game, GameResult, GameStatus, Move, MoveKind,
};
use serde::Serialize;

/// One legal move with both notations.
#[derive(Debug, Serialize)]
pub struct MoveReport {
    pub uci: String,
    pub san: String,
    pub kind: MoveKind,
}

impl MoveReport {
    pub fn new(board: &BoardState, mv: &Move) -> Self {
        MoveReport {
            uci: mv.to_uci(),
            san: move_to_san(board, mv),
            kind: mv.kind(),
        }
    }
}

/// State of a position after the requested moves.
#[derive(Debug, Serialize)]
pub struct PositionReport {
    pub fen: String,
    pub turn: Color,
    pub status: GameStatus,
    pub in_check: bool,
    /// Set when the game is over, including endings the board alone cannot show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
    /// SAN of every move played to reach the position.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<String>,
}

impl PositionReport {
    pub fn from_game(game: &Game) -> Self {
        let board = game.board();
        PositionReport {
            fen: board.to_fen(),
            turn: board.turn(),
            status: game.status(),
            in_check: is_in_check(board, board.turn()),
            result: game.result(),
            moves: game.move_history().iter().map(|m| m.san.clone()).collect(),
        }
    }

    /// Renders the report as text, board diagram first.
    pub fn render(&self, board: &BoardState) -> String {
        let mut out = format!("{}\nFEN: {}\n", board, self.fen);
        if !self.moves.is_empty() {
            out.push_str(&format!("Moves: {}\n", self.moves.join(" ")));
        }
        out.push_str(&format!("To move: {}\nStatus: {}\n", self.turn, self.status));
        if let Some(result) = self.result {
            out.push_str(&format!("Result: {} ({})\n", result.pgn_token(), result));
        }
        out
    }
}

/// Node counts from `perft`.
#[derive(Debug, Serialize)]
pub struct PerftReport {
    pub fen: String,
    pub depth: u32,
    pub nodes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub divide: Vec<DivideEntry>,
}

#[derive(Debug, Serialize)]
pub struct DivideEntry {
    pub uci: String,
    pub nodes: u64,
}

impl PerftReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.divide {
            out.push_str(&format!("{}: {}\n", entry.uci, entry.nodes));
        }
        if !self.divide.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Nodes searched (depth {}): {}\n", self.depth, self.nodes));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_report_has_both_notations() {
        let board = BoardState::startpos();
        let mv = chess_rules::legal_moves(&board)
            .into_iter()
            .find(|m| m.to_uci() == "g1f3")
            .unwrap();

        let report = MoveReport::new(&board, &mv);
        assert_eq!(report.uci, "g1f3");
        assert_eq!(report.san, "Nf3");
        assert_eq!(report.kind, MoveKind::Normal);
    }

    #[test]
    fn test_position_report_json() {
        let mut game = Game::new();
        game.play_san("e4").unwrap();

        let report = PositionReport::from_game(&game);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["fen"],
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(json["in_check"], false);
        assert_eq!(json["moves"][0], "e4");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_position_report_text_shows_result() {
        let mut game = Game::new();
        for san in ["f3", "e5", "g4", "Qh4#"] {
            game.play_san(san).unwrap();
        }

        let text = PositionReport::from_game(&game).render(game.board());
        assert!(text.contains("Moves: f3 e5 g4 Qh4#"));
        assert!(text.contains("Status: checkmate"));
        assert!(text.contains("Result: 0-1"));
    }

    #[test]
    fn test_perft_report_text() {
        let report = PerftReport {
            fen: BoardState::startpos().to_fen(),
            depth: 1,
            nodes: 20,
            divide: vec![DivideEntry {
                uci: "a2a3".to_string(),
                nodes: 1,
            }],
        };
        let text = report.render();
        assert!(text.starts_with("a2a3: 1\n\n"));
        assert!(text.ends_with("Nodes searched (depth 1): 20\n"));
    }
}
