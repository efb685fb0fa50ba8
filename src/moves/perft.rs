//! Move-count node enumeration (§4.9): exercises `generate_legal` and
//! `make_move`/`undo_move` against known node counts at shallow depths. The
//! breakdown counters (captures, en-passant, castles, promotions, checks,
//! checkmates) are tagged on the edge into a node, not the node itself.

use crate::board::Board;
use crate::moves::movegen::generate_legal;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use tracing::{debug, instrument};

const MAX_LOG_DEPTH: u32 = 3;

pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        Self {
            nodes: 0,
            captures: 0,
            ep_captures: 0,
            castles: 0,
            promotions: 0,
            checks: 0,
            checkmates: 0,
        }
    }

    pub fn add(&mut self, o: &PerftCounters) {
        self.nodes += o.nodes;
        self.captures += o.captures;
        self.ep_captures += o.ep_captures;
        self.castles += o.castles;
        self.promotions += o.promotions;
        self.checks += o.checks;
        self.checkmates += o.checkmates;
    }
}

fn perft_recursive(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in &moves {
        board.make_move(mv);
        nodes += perft_recursive(board, depth - 1);
        board.undo_move(mv);
    }
    nodes
}

#[instrument(skip(board), fields(depth))]
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    perft_recursive(board, depth)
}

#[instrument(skip(board), fields(depth))]
pub fn perft_divide(board: &mut Board, depth: u32) -> u64 {
    let moves = generate_legal(board);
    if depth <= MAX_LOG_DEPTH {
        debug!(depth, moves = moves.len(), "divide: root legal moves");
    }

    let mut total = 0;
    for &mv in &moves {
        board.make_move(mv);
        let count = if depth == 1 {
            1
        } else {
            perft_recursive(board, depth - 1)
        };
        board.undo_move(mv);

        if depth <= MAX_LOG_DEPTH {
            debug!(%mv, nodes = count, "divide: root child total");
        }
        println!("{mv}: {count}");
        total += count;
    }

    debug!(depth, total, "divide: total");
    println!("Total: {total}");
    total
}

fn perft_count_recursive(board: &mut Board, depth: u32, out: &mut PerftCounters) {
    if depth == 0 {
        out.nodes += 1;
        let side_in_check = in_check(board, board.side_to_move);
        if side_in_check {
            out.checks += 1;
        }
        if side_in_check && generate_legal(board).is_empty() {
            out.checkmates += 1;
        }
        return;
    }

    let moves = generate_legal(board);
    for &mv in &moves {
        if mv.is_capture() {
            out.captures += 1;
            if mv.is_en_passant() {
                out.ep_captures += 1;
            }
        }
        if mv.is_castling() {
            out.castles += 1;
        }
        if mv.is_promotion() {
            out.promotions += 1;
        }

        #[cfg(debug_assertions)]
        let z0 = board.zobrist;

        board.make_move(mv);
        perft_count_recursive(board, depth - 1, out);
        board.undo_move(mv);

        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(board.zobrist, z0, "zobrist changed across make/undo");
            debug_assert_eq!(
                board.compute_zobrist_full(),
                board.zobrist,
                "full recompute mismatch"
            );
        }
    }
}

pub fn perft_count_with_breakdown(board: &mut Board, depth: u32, out: &mut PerftCounters) {
    perft_count_recursive(board, depth, out);
}

pub fn perft_divide_with_breakdown(board: &mut Board, depth: u32) -> Vec<(Move, PerftCounters)> {
    let moves = generate_legal(board);
    let mut out = Vec::with_capacity(moves.len());

    for &mv in &moves {
        board.make_move(mv);
        let mut pc = PerftCounters::zero();
        if depth > 1 {
            perft_count_recursive(board, depth - 1, &mut pc);
        } else {
            pc.nodes = 1;
        }
        board.undo_move(mv);
        out.push((mv, pc));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_perft_depths_one_through_three() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8_902);
    }

    #[test]
    fn startpos_perft_depth_four() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 4), 197_281);
    }

    #[test]
    fn kiwipete_perft_depth_two_breakdown() {
        let mut board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let mut out = PerftCounters::zero();
        perft_count_with_breakdown(&mut board, 2, &mut out);
        assert_eq!(out.nodes, 2_039);
        assert_eq!(out.captures, 351);
        assert_eq!(out.ep_captures, 1);
        assert_eq!(out.castles, 91);
        assert_eq!(out.checks, 3);
    }

    #[test]
    fn kiwipete_perft_depth_three() {
        let mut board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(perft(&mut board, 3), 97_862);
    }

    #[test]
    fn position_three_perft_depth_four() {
        let mut board: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();
        assert_eq!(perft(&mut board, 4), 43_238);
    }

    #[test]
    fn position_four_perft_depth_three() {
        let mut board: Board =
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1"
                .parse()
                .unwrap();
        assert_eq!(perft(&mut board, 3), 62_379);
    }
}
