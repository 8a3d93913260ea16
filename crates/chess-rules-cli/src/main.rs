//! chess-rules - inspect positions with the chess rules engine.
//!
//! Lists legal moves, plays move sequences, reports game status, runs perft
//! and converts PGN. Settings are read from `chess-rules.toml` when present.

mod config;
mod output;

use anyhow::Context;
use chess_rules::{
    legal_moves, legal_moves_from, parse_uci, perft, perft_divide, Game, Square,
};
use clap::{Parser, Subcommand};
use config::Config;
use output::{DivideEntry, MoveReport, PerftReport, PositionReport};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-rules")]
#[command(about = "Chess rules engine: legal moves, status, perft and PGN")]
struct Cli {
    /// Configuration file (defaults to chess-rules.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Starting position in FEN (overrides start_fen from the config)
    #[arg(long, global = true)]
    fen: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the legal moves of the position
    Moves {
        /// Only moves of the piece on this square
        #[arg(long)]
        from: Option<Square>,
    },
    /// Play moves (SAN or UCI) from the position and report the result
    Play {
        /// Moves in order, e.g. e4 e5 Nf3 or e2e4 e7e5 g1f3
        moves: Vec<String>,
        /// Write the game as PGN to this file
        #[arg(long)]
        pgn: Option<PathBuf>,
    },
    /// Report check, checkmate, stalemate or draw for the position
    Status,
    /// Count leaf nodes of the move tree
    Perft {
        /// Depth to search (defaults to perft_depth from the config)
        #[arg(short, long)]
        depth: Option<u32>,
        /// Show the node count below each move
        #[arg(long)]
        divide: bool,
    },
    /// Read a PGN file and report the final position
    Pgn {
        /// PGN file to read
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config);

    let json = cli.json || config.json;
    let fen = cli.fen.unwrap_or_else(|| config.start_fen.clone());

    match cli.command {
        Commands::Moves { from } => {
            let game = start_game(&fen)?;
            let board = game.board();
            let moves = match from {
                Some(sq) => legal_moves_from(board, sq),
                None => legal_moves(board),
            };
            let reports: Vec<MoveReport> =
                moves.iter().map(|mv| MoveReport::new(board, mv)).collect();

            if json {
                print_json(&reports)?;
            } else {
                for report in &reports {
                    println!("{:<6} {}", report.uci, report.san);
                }
                println!("{} legal moves", reports.len());
            }
        }
        Commands::Play { moves, pgn } => {
            let mut game = start_game(&fen)?;
            for text in &moves {
                play_text(&mut game, text)?;
            }
            tracing::info!(plies = game.ply_count(), "played moves");

            if let Some(path) = pgn {
                game.write_pgn(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "wrote PGN");
            }
            report_position(&game, json)?;
        }
        Commands::Status => {
            let game = start_game(&fen)?;
            report_position(&game, json)?;
        }
        Commands::Perft { depth, divide } => {
            let game = start_game(&fen)?;
            let depth = depth.unwrap_or(config.perft_depth);
            tracing::info!(depth, fen = %fen, "running perft");

            let (nodes, divide) = if divide {
                let entries: Vec<DivideEntry> = perft_divide(game.board(), depth)
                    .into_iter()
                    .map(|(uci, nodes)| DivideEntry { uci, nodes })
                    .collect();
                (entries.iter().map(|e| e.nodes).sum(), entries)
            } else {
                (perft(game.board(), depth), Vec::new())
            };

            let report = PerftReport {
                fen: game.to_fen(),
                depth,
                nodes,
                divide,
            };
            if json {
                print_json(&report)?;
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Pgn { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let game = Game::from_pgn(&text)
                .with_context(|| format!("parsing {}", file.display()))?;

            if json {
                report_position(&game, true)?;
            } else {
                print!("{}", game.to_pgn());
                println!();
                report_position(&game, false)?;
            }
        }
    }

    Ok(())
}

/// Installs the fmt subscriber; `RUST_LOG` wins over the configured filter.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn start_game(fen: &str) -> anyhow::Result<Game> {
    Game::from_fen(fen).with_context(|| format!("invalid position {:?}", fen))
}

/// Plays one move given as UCI when it reads as UCI, else as SAN.
fn play_text(game: &mut Game, text: &str) -> anyhow::Result<String> {
    let played = if parse_uci(text).is_some() {
        game.play_uci(text)
    } else {
        game.play_san(text)
    };
    played.with_context(|| format!("move {} ({})", game.ply_count() + 1, text))
}

fn report_position(game: &Game, json: bool) -> anyhow::Result<()> {
    let report = PositionReport::from_game(game);
    if json {
        print_json(&report)
    } else {
        print!("{}", report.render(game.board()));
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses_play_command() {
        let cli = Cli::try_parse_from(["chess-rules", "play", "e4", "e5", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Play { moves, pgn } => {
                assert_eq!(moves, vec!["e4", "e5"]);
                assert!(pgn.is_none());
            }
            _ => panic!("Expected play command"),
        }
    }

    #[test]
    fn test_cli_parses_moves_from_square() {
        let cli = Cli::try_parse_from(["chess-rules", "moves", "--from", "g1"]).unwrap();
        match cli.command {
            Commands::Moves { from } => {
                assert_eq!(from, Square::from_algebraic("g1"));
            }
            _ => panic!("Expected moves command"),
        }

        assert!(Cli::try_parse_from(["chess-rules", "moves", "--from", "z9"]).is_err());
    }

    #[test]
    fn test_cli_parses_perft_with_global_fen() {
        let cli = Cli::try_parse_from([
            "chess-rules",
            "--fen",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "perft",
            "-d",
            "2",
            "--divide",
        ])
        .unwrap();
        assert_eq!(cli.fen.as_deref(), Some("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
        match cli.command {
            Commands::Perft { depth, divide } => {
                assert_eq!(depth, Some(2));
                assert!(divide);
            }
            _ => panic!("Expected perft command"),
        }
    }

    #[test]
    fn test_play_text_accepts_san_and_uci() {
        let mut game = Game::new();
        assert_eq!(play_text(&mut game, "e2e4").unwrap(), "e4");
        assert_eq!(play_text(&mut game, "e5").unwrap(), "e5");
        assert_eq!(play_text(&mut game, "g1f3").unwrap(), "Nf3");

        let err = play_text(&mut game, "Ke3").unwrap_err();
        assert!(err.to_string().contains("move 4 (Ke3)"));
        assert_eq!(game.ply_count(), 3);
    }

    #[test]
    fn test_play_text_reports_missing_promotion_piece() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        for text in ["a7a8", "a8"] {
            let err = play_text(&mut game, text).unwrap_err();
            assert!(err.root_cause().to_string().contains("needs a promotion piece"));
            assert!(game.pending_promotion().is_some());
        }
        assert_eq!(play_text(&mut game, "a8=Q").unwrap(), "a8=Q+");
    }

    #[test]
    fn test_start_game_rejects_bad_fen() {
        assert!(start_game("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(start_game(chess_rules::FenFields::STARTPOS).is_ok());
    }

    #[test]
    fn test_cli_help_lists_commands() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("perft"));
        assert!(help.contains("pgn"));
    }
}
