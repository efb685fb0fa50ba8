//! Plain depth-first alpha-beta search with captures-only quiescence (§4.7),
//! iterative deepening, and a time-bounded worker thread (§5). No
//! transposition table, null-move/futility/late-move pruning or reductions,
//! and no aspiration windows — the ordering function in `ordering.rs` and
//! the evaluation in `eval.rs` are the entire static-knowledge surface.

use crate::board::Board;
use crate::moves::movegen::{generate_captures, generate_legal};
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::search::eval::evaluate;
use crate::search::ordering::order_moves;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const INF: i32 = 32_000;
pub const MATE_SCORE: i32 = 31_000;
const DRAW_SCORE: i32 = 0;

/// Captures-only search extension (§4.7): no depth decrement, terminates
/// when no capture improves on the stand-pat evaluation.
pub fn quiesce(board: &mut Board, stop: &AtomicBool, mut alpha: i32, beta: i32) -> i32 {
    if stop.load(Ordering::Relaxed) {
        return alpha;
    }

    let stand_pat = evaluate(board);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut moves = generate_captures(board);
    order_moves(&mut moves, board);

    for mv in moves {
        board.make_move(mv);
        let score = -quiesce(board, stop, -beta, -alpha);
        board.undo_move(mv);

        if stop.load(Ordering::Relaxed) {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

/// Depth-first alpha-beta with move ordering and quiescence only (§4.7).
/// `ply` is the distance from the search root, used only for mate-distance
/// scoring.
pub fn alphabeta(
    board: &mut Board,
    stop: &AtomicBool,
    depth: i32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    if stop.load(Ordering::Relaxed) {
        return alpha;
    }

    if ply > 0 && board.is_repetition() {
        return DRAW_SCORE;
    }

    if depth == 0 {
        return quiesce(board, stop, alpha, beta);
    }

    let mut moves = generate_legal(board);
    if moves.is_empty() {
        return if in_check(board, board.side_to_move) {
            -MATE_SCORE + ply
        } else {
            0
        };
    }
    order_moves(&mut moves, board);

    for mv in moves {
        board.make_move(mv);
        let score = -alphabeta(board, stop, depth - 1, ply + 1, -beta, -alpha);
        board.undo_move(mv);

        if stop.load(Ordering::Relaxed) {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

/// Top-level iterative-deepening wrapper: the best move found at the
/// deepest completed iteration, with its score.
pub fn search(board: &mut Board, max_depth: i32) -> (i32, Option<Move>) {
    let stop = AtomicBool::new(false);
    let mut best_move = None;
    let mut best_score = 0;

    for depth in 1..=max_depth {
        let mut moves = generate_legal(board);
        if moves.is_empty() {
            break;
        }
        order_moves(&mut moves, board);

        let mut alpha = -INF;
        let beta = INF;
        let mut iter_best = None;

        for mv in moves {
            board.make_move(mv);
            let score = -alphabeta(board, &stop, depth - 1, 1, -beta, -alpha);
            board.undo_move(mv);

            if score > alpha {
                alpha = score;
                iter_best = Some(mv);
            }
        }

        if let Some(mv) = iter_best {
            best_move = Some(mv);
            best_score = alpha;
        }

        if best_score.abs() >= MATE_SCORE - 1000 {
            break;
        }
    }

    (best_score, best_move)
}

/// Time-bounded search (§5): spawns exactly one worker thread running
/// iterative deepening, writing `(best_move, score, depth_completed)` to
/// shared atomics after each completed iteration. The caller sleeps for the
/// computed budget, signals cancellation, and joins the worker before
/// returning — a detached or unjoined worker is a defect, not an
/// optimization.
///
/// Budget: `min(our_ms / 5, game_ms / 60)`, per §4.7.
pub fn search_time(board: &Board, game_ms: u64, our_ms: u64) -> (i32, Option<Move>) {
    let root_moves = generate_legal(board);
    if root_moves.is_empty() {
        let score = if in_check(board, board.side_to_move) {
            -MATE_SCORE
        } else {
            0
        };
        return (score, None);
    }

    let budget_ms = (our_ms / 5).min(game_ms / 60).max(1);
    let budget = Duration::from_millis(budget_ms);

    let stop = Arc::new(AtomicBool::new(false));
    let best_move_from = Arc::new(AtomicU32::new(u32::MAX));
    let best_move_to = Arc::new(AtomicU32::new(u32::MAX));
    let best_move_flag = Arc::new(AtomicU32::new(u32::MAX));
    let best_score = Arc::new(AtomicI32::new(0));

    let mut worker_board = board.clone();
    let worker_stop = Arc::clone(&stop);
    let worker_from = Arc::clone(&best_move_from);
    let worker_to = Arc::clone(&best_move_to);
    let worker_flag = Arc::clone(&best_move_flag);
    let worker_score = Arc::clone(&best_score);

    let handle = std::thread::spawn(move || {
        let fallback = root_moves[0];
        let mut depth = 1;
        loop {
            if worker_stop.load(Ordering::Relaxed) {
                break;
            }

            let mut moves = generate_legal(&worker_board);
            order_moves(&mut moves, &worker_board);

            let mut alpha = -INF;
            let beta = INF;
            let mut iter_best = None;
            let mut aborted = false;

            for mv in &moves {
                worker_board.make_move(*mv);
                let score = -alphabeta(&mut worker_board, &worker_stop, depth - 1, 1, -beta, -alpha);
                worker_board.undo_move(*mv);

                if worker_stop.load(Ordering::Relaxed) {
                    aborted = true;
                    break;
                }
                if score > alpha {
                    alpha = score;
                    iter_best = Some(*mv);
                }
            }

            if !aborted {
                if let Some(mv) = iter_best {
                    worker_from.store(mv.from().index() as u32, Ordering::Relaxed);
                    worker_to.store(mv.to().index() as u32, Ordering::Relaxed);
                    worker_flag.store(mv.flag() as u32, Ordering::Relaxed);
                    worker_score.store(alpha, Ordering::Relaxed);
                }
                if alpha.abs() >= MATE_SCORE - 1000 {
                    break;
                }
                depth += 1;
            } else {
                break;
            }
        }
        fallback
    });

    std::thread::sleep(budget);
    stop.store(true, Ordering::Relaxed);
    let fallback = handle.join().expect("search worker thread panicked");

    let from = best_move_from.load(Ordering::Relaxed);
    if from == u32::MAX {
        return (0, Some(fallback));
    }

    let to = best_move_to.load(Ordering::Relaxed);
    let flag = best_move_flag.load(Ordering::Relaxed) as u8;
    let mv = Move::new(
        crate::square::Square::from_index(from as u8),
        crate::square::Square::from_index(to as u8),
        flag,
    );
    (best_score.load(Ordering::Relaxed), Some(mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn finds_mate_in_one() {
        let mut board: Board = "6k1/5ppp/8/8/8/8/8/R6K w - - 0 1".parse().unwrap();
        let (score, mv) = search(&mut board, 3);
        assert!(score >= MATE_SCORE - 100);
        assert!(mv.is_some());
    }

    #[test]
    fn returns_zero_on_stalemate() {
        let mut board: Board = "k7/8/1Q6/8/8/8/8/7K b - - 0 1".parse().unwrap();
        let (score, mv) = search(&mut board, 2);
        assert_eq!(score, 0);
        assert!(mv.is_none());
    }

    #[test]
    fn search_time_always_returns_a_legal_move_and_joins_its_worker() {
        let board = Board::new();
        let (_, mv) = search_time(&board, 10_000, 2_000);
        assert!(mv.is_some());
    }
}
