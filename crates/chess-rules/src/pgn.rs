//! PGN (Portable Game Notation) import and export.
//!
//! Export writes the seven-tag roster, any extra tags set on the game, and
//! numbered SAN movetext wrapped at 80 columns. Import accepts the common
//! decorations found in the wild (comments, variations, NAGs, move numbers)
//! and replays the main line through [`Game::play_san`].

use crate::rules::{DrawReason, GameResult};
use crate::{Game, RulesError};
use chess_rules_core::{Color, FenFields};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Column limit for movetext lines.
const LINE_WIDTH: usize = 80;

/// Tags written first, in this order.
const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// Errors that can occur when reading or writing PGN.
#[derive(Debug, Error)]
pub enum PgnError {
    /// A header line that is not a `[Name "value"]` pair.
    #[error("invalid tag pair: {0}")]
    InvalidTag(String),

    /// A result that is none of `1-0`, `0-1`, `1/2-1/2` or `*`.
    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("unterminated variation")]
    UnterminatedVariation,

    /// The `FEN` tag does not describe a playable position.
    #[error("invalid FEN tag: {0}")]
    Fen(#[source] RulesError),

    /// A movetext move does not fit the replayed position.
    #[error("move {ply} ({san}): {source}")]
    Move {
        /// Half-move number, starting at 1.
        ply: usize,
        san: String,
        #[source]
        source: RulesError,
    },

    #[error("failed to write PGN: {0}")]
    Io(#[from] std::io::Error),
}

impl Game {
    /// Writes the game as PGN.
    pub fn to_pgn(&self) -> String {
        let result_token = self.result().map_or("*", GameResult::pgn_token);
        let mut out = String::new();

        for (name, default) in SEVEN_TAG_ROSTER {
            let value = match name {
                "Result" => result_token,
                _ => self.tag(name).unwrap_or(default),
            };
            push_tag(&mut out, name, value);
        }

        let start_fen = self.start_board().to_fen();
        if start_fen != FenFields::STARTPOS {
            push_tag(&mut out, "SetUp", "1");
            push_tag(&mut out, "FEN", &start_fen);
        }

        for (name, value) in self.tags() {
            let reserved = SEVEN_TAG_ROSTER.iter().any(|(n, _)| n == name)
                || name == "SetUp"
                || name == "FEN";
            if !reserved {
                push_tag(&mut out, name, value);
            }
        }
        out.push('\n');

        let mut tokens = Vec::with_capacity(self.ply_count() * 3 / 2 + 1);
        let mut number = self.start_board().fullmove_number();
        let mut to_move = self.start_board().turn();
        for (i, record) in self.move_history().iter().enumerate() {
            match to_move {
                Color::White => tokens.push(format!("{}.", number)),
                Color::Black if i == 0 => tokens.push(format!("{}...", number)),
                Color::Black => {}
            }
            tokens.push(record.san.clone());
            if to_move == Color::Black {
                number += 1;
            }
            to_move = to_move.opposite();
        }
        tokens.push(result_token.to_string());

        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&token);
        }
        out.push_str(&line);
        out.push('\n');
        out
    }

    /// Writes the game as PGN to `path`.
    pub fn write_pgn<P: AsRef<Path>>(&self, path: P) -> Result<(), PgnError> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_pgn().as_bytes())?;
        Ok(())
    }

    /// Reads the first game of a PGN text.
    ///
    /// Starts from the `FEN` tag when one is present. A result given in the
    /// tags or movetext is recorded unless the replayed moves already ended
    /// the game.
    pub fn from_pgn(text: &str) -> Result<Game, PgnError> {
        let mut tags = Vec::new();
        let mut movetext = String::new();
        let mut in_header = true;

        for line in text.lines() {
            let trimmed = line.trim();
            if in_header && trimmed.starts_with('[') {
                tags.push(parse_tag(trimmed)?);
                continue;
            }
            if in_header && trimmed.is_empty() {
                continue;
            }
            in_header = false;
            movetext.push_str(line);
            movetext.push('\n');
        }

        let mut game = match tags.iter().find(|(name, _)| name == "FEN") {
            Some((_, fen)) => Game::from_fen(fen).map_err(PgnError::Fen)?,
            None => Game::new(),
        };

        let mut result = None;
        if let Some((_, value)) = tags.iter().find(|(name, _)| name == "Result") {
            result = parse_result(value)?;
        }
        for (name, value) in tags {
            if name != "Result" {
                game.set_tag(name, value);
            }
        }

        let mut ply = 0;
        for token in movetext_tokens(&movetext)? {
            match token {
                Token::Result(r) => result = r,
                Token::San(san) => {
                    ply += 1;
                    game.play_san(san)
                        .map_err(|source| PgnError::Move {
                            ply,
                            san: san.to_string(),
                            source,
                        })?;
                }
            }
        }

        if let Some(result) = result {
            game.record_result(result);
        }
        Ok(game)
    }
}

fn push_tag(out: &mut String, name: &str, value: &str) {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    out.push_str(&format!("[{} \"{}\"]\n", name, escaped));
}

fn parse_tag(line: &str) -> Result<(String, String), PgnError> {
    let invalid = || PgnError::InvalidTag(line.to_string());

    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let (name, rest) = inner.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
    let quoted = rest
        .trim()
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(invalid)?;

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }

    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next().ok_or_else(invalid)?),
            '"' => return Err(invalid()),
            c => value.push(c),
        }
    }

    Ok((name.to_string(), value))
}

/// Maps a result token; `*` means the game is unfinished.
fn parse_result(token: &str) -> Result<Option<GameResult>, PgnError> {
    match token {
        "1-0" => Ok(Some(GameResult::WhiteWins)),
        "0-1" => Ok(Some(GameResult::BlackWins)),
        "1/2-1/2" => Ok(Some(GameResult::Draw(DrawReason::Agreement))),
        "*" => Ok(None),
        other => Err(PgnError::InvalidResult(other.to_string())),
    }
}

enum Token<'a> {
    San(&'a str),
    Result(Option<GameResult>),
}

/// Splits movetext into SAN moves and result tokens.
///
/// Drops `{...}` and `;` comments, nested `(...)` variations, `$n` NAGs and
/// move numbers, including numbers glued to the move as in `1.e4`.
fn movetext_tokens(text: &str) -> Result<Vec<Token<'_>>, PgnError> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut depth = 0usize;
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                flush_word(text, &mut start, i, &mut tokens)?;
                if !chars.by_ref().any(|(_, c)| c == '}') {
                    return Err(PgnError::UnterminatedComment);
                }
            }
            ';' => {
                flush_word(text, &mut start, i, &mut tokens)?;
                if !chars.by_ref().any(|(_, c)| c == '\n') {
                    break;
                }
            }
            '(' => {
                flush_word(text, &mut start, i, &mut tokens)?;
                depth += 1;
            }
            ')' => {
                flush_word(text, &mut start, i, &mut tokens)?;
                depth = depth.saturating_sub(1);
            }
            _ if depth > 0 => {}
            c if c.is_whitespace() => flush_word(text, &mut start, i, &mut tokens)?,
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    flush_word(text, &mut start, text.len(), &mut tokens)?;

    if depth > 0 {
        return Err(PgnError::UnterminatedVariation);
    }
    Ok(tokens)
}

/// Pushes the word that began at `start`, if one is open.
fn flush_word<'a>(
    text: &'a str,
    start: &mut Option<usize>,
    end: usize,
    tokens: &mut Vec<Token<'a>>,
) -> Result<(), PgnError> {
    let Some(s) = start.take() else {
        return Ok(());
    };
    let word = &text[s..end];

    if word.starts_with('$') {
        return Ok(());
    }
    if matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*") {
        tokens.push(Token::Result(parse_result(word)?));
        return Ok(());
    }

    // A leading move number: "12." "12..." or glued as in "1.e4".
    let san = match word.find(|c: char| !c.is_ascii_digit()) {
        None => "",
        Some(idx) if idx > 0 && word[idx..].starts_with('.') => word[idx..].trim_start_matches('.'),
        Some(_) => word,
    };
    if !san.is_empty() {
        tokens.push(Token::San(san));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_seven_tag_roster() {
        let mut game = Game::new();
        game.set_tag("White", "Anderssen");
        game.set_tag("Black", "Kieseritzky");
        game.set_tag("ECO", "C33");
        for san in ["e4", "e5", "f4"] {
            game.play_san(san).unwrap();
        }

        let pgn = game.to_pgn();
        let expected_header = "[Event \"?\"]\n[Site \"?\"]\n[Date \"????.??.??\"]\n\
            [Round \"?\"]\n[White \"Anderssen\"]\n[Black \"Kieseritzky\"]\n\
            [Result \"*\"]\n[ECO \"C33\"]\n\n";
        assert!(pgn.starts_with(expected_header), "{}", pgn);
        assert!(pgn.ends_with("1. e4 e5 2. f4 *\n"));
        assert!(!pgn.contains("FEN"));
    }

    #[test]
    fn export_custom_start_and_black_first() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").unwrap();
        game.play_san("Kd7").unwrap();
        game.play_san("e4").unwrap();

        let pgn = game.to_pgn();
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains("[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]"));
        assert!(pgn.ends_with("12... Kd7 13. e4 *\n"));
    }

    #[test]
    fn export_result_and_wrapping() {
        let mut game = Game::new();
        for _ in 0..6 {
            for san in ["Nf3", "Nf6", "Ng1", "Ng8"] {
                if game.is_game_over() {
                    break;
                }
                game.play_san(san).unwrap();
            }
        }
        assert!(game.is_game_over());

        let pgn = game.to_pgn();
        assert!(pgn.contains("[Result \"1/2-1/2\"]"));
        assert!(pgn.trim_end().ends_with("1/2-1/2"));
        let body = pgn.split("\n\n").nth(1).unwrap();
        assert!(body.lines().count() > 1);
        assert!(body.lines().all(|l| l.len() <= LINE_WIDTH));
    }

    #[test]
    fn import_with_decorations() {
        let text = r#"[Event "Casual"]
[White "A \"quoted\" name"]
[Result "0-1"]

1. f3 {weak} e5 2.g4?! ( 2. e4 Nc6 (2... d6) ) 2... Qh4# $4 ; mate
0-1
"#;
        let game = Game::from_pgn(text).unwrap();
        assert_eq!(game.ply_count(), 4);
        assert_eq!(game.tag("White"), Some("A \"quoted\" name"));
        assert_eq!(game.result(), Some(GameResult::BlackWins));
    }

    #[test]
    fn import_records_unfinished_result() {
        let game = Game::from_pgn("1. e4 e5 2. Nf3 1/2-1/2").unwrap();
        assert_eq!(game.ply_count(), 3);
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Agreement)));

        let game = Game::from_pgn("1. d4 *").unwrap();
        assert_eq!(game.result(), None);
    }

    #[test]
    fn import_from_fen_tag() {
        let text = "[SetUp \"1\"]\n[FEN \"4k3/P7/8/8/8/8/8/4K3 w - - 0 1\"]\n\n1. a8=Q+ Kd7 *\n";
        let game = Game::from_pgn(text).unwrap();
        assert_eq!(game.ply_count(), 2);
        assert_eq!(game.to_fen(), "Q7/3k4/8/8/8/8/8/4K3 w - - 1 2");
    }

    #[test]
    fn roundtrip_through_text() {
        let mut game = Game::new();
        for san in ["d4", "d5", "c4", "dxc4", "e3", "b5", "a4", "c6", "axb5", "cxb5"] {
            game.play_san(san).unwrap();
        }
        let back = Game::from_pgn(&game.to_pgn()).unwrap();
        assert_eq!(back.board(), game.board());
        assert_eq!(back.move_history(), game.move_history());
    }

    #[test]
    fn import_errors() {
        assert!(matches!(
            Game::from_pgn("[Event Casual]\n\n1. e4 *"),
            Err(PgnError::InvalidTag(_))
        ));
        assert!(matches!(
            Game::from_pgn("[Result \"2-0\"]\n\n1. e4"),
            Err(PgnError::InvalidResult(_))
        ));
        assert!(matches!(
            Game::from_pgn("1. e4 { never closed"),
            Err(PgnError::UnterminatedComment)
        ));
        assert!(matches!(
            Game::from_pgn("1. e4 (1. d4"),
            Err(PgnError::UnterminatedVariation)
        ));
        assert!(matches!(
            Game::from_pgn("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n\n*"),
            Err(PgnError::Fen(_))
        ));
        match Game::from_pgn("1. e4 e5 2. Ke3") {
            Err(PgnError::Move { ply, san, .. }) => {
                assert_eq!(ply, 3);
                assert_eq!(san, "Ke3");
            }
            other => panic!("unexpected {:?}", other.map(|g| g.to_fen())),
        }
    }
}
