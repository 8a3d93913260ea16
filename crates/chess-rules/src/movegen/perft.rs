//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.

use super::legal_moves;
use crate::BoardState;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(board: &BoardState, depth: u32) -> u64 {
    let mut scratch = board.clone();
    count(&mut scratch, depth)
}

fn count(board: &mut BoardState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in &moves {
        let undo = board.make(mv);
        nodes += count(board, depth - 1);
        board.unmake(undo);
    }
    nodes
}

/// Perft with divide: the node count below each legal move, keyed by its
/// UCI string and sorted.
pub fn perft_divide(board: &BoardState, depth: u32) -> Vec<(String, u64)> {
    let mut scratch = board.clone();
    let moves = legal_moves(board);
    let mut results = Vec::with_capacity(moves.len());

    for mv in &moves {
        let undo = scratch.make(mv);
        let nodes = count(&mut scratch, depth.saturating_sub(1));
        scratch.unmake(undo);
        results.push((mv.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_startpos_shallow() {
        let board = BoardState::startpos();
        assert_eq!(perft(&board, 0), 1);
        assert_eq!(perft(&board, 1), 20);
        assert_eq!(perft(&board, 2), 400);
        assert_eq!(perft(&board, 3), 8902);
    }

    #[test]
    fn perft_leaves_board_untouched() {
        let board = BoardState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = board.to_fen();
        assert_eq!(perft(&board, 2), 2039);
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let board = BoardState::startpos();
        let results = perft_divide(&board, 2);
        assert_eq!(results.len(), 20);
        assert_eq!(results[0].0, "a2a3");
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 400);
        assert!(results.iter().all(|(_, n)| *n == 20));
    }
}
