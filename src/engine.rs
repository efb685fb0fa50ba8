//! The thin facade external collaborators consume (§1, §6): `load_fen`,
//! `apply_move`, and `search_time` are the only operations a UCI front-end,
//! CLI, or embedder needs — everything else (move generation, search,
//! hashing) stays inside `Board` and `search::search`. This module adds no
//! behavior of its own beyond UCI-string disambiguation against the board's
//! own legal moves.

use crate::board::Board;
use crate::error::EngineError;
use crate::moves::movegen::generate_legal;
use crate::moves::types::Move;
use crate::search::search;

/// A single game in progress: the board plus the UCI-facing operations a
/// front-end drives it through. Intentionally thin — `Board` already does
/// all the work; this just names the external contract.
pub struct Engine {
    pub board: Board,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine { board: Board::new() }
    }

    /// Replaces the current position with the one described by `fen`.
    /// On error, the engine's board is left unchanged (§7).
    pub fn load_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let mut candidate = Board::new_empty();
        candidate.set_fen(fen)?;
        self.board = candidate;
        Ok(())
    }

    /// Parses `uci` (e.g. `e2e4`, `e7e8q`) by disambiguating against the
    /// board's own legal moves and, if found, applies it. Never mutates the
    /// board on a rejected move (§7 "illegal move request").
    pub fn apply_move(&mut self, uci: &str) -> Result<(), EngineError> {
        let mv = parse_uci_move(&self.board, uci)?;
        self.board.make_move(mv);
        Ok(())
    }

    /// Iterative-deepening search to a fixed depth; see `search::search`.
    pub fn search(&mut self, max_depth: i32) -> (i32, Option<Move>) {
        search::search(&mut self.board, max_depth)
    }

    /// Time-bounded iterative-deepening search; see `search::search_time`.
    pub fn search_time(&self, game_ms: u64, our_ms: u64) -> (i32, Option<Move>) {
        search::search_time(&self.board, game_ms, our_ms)
    }
}

/// Disambiguates a UCI move string against `board`'s legal moves (§6). The
/// string alone is ambiguous about capture/castle/en-passant/promotion
/// flags, so this matches on `(from, to, promotion)` against whatever the
/// generator actually produces rather than re-deriving the flag bits here.
pub fn parse_uci_move(board: &Board, uci: &str) -> Result<Move, EngineError> {
    if uci.len() < 4 || uci.len() > 5 {
        return Err(EngineError::MalformedUciMove(uci.to_string()));
    }
    let from = uci[0..2]
        .parse()
        .map_err(|_| EngineError::MalformedUciMove(uci.to_string()))?;
    let to = uci[2..4]
        .parse()
        .map_err(|_| EngineError::MalformedUciMove(uci.to_string()))?;
    let promo = match uci.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(crate::board::Piece::Queen),
        Some(b'r') => Some(crate::board::Piece::Rook),
        Some(b'b') => Some(crate::board::Piece::Bishop),
        Some(b'n') => Some(crate::board::Piece::Knight),
        Some(_) => return Err(EngineError::MalformedUciMove(uci.to_string())),
    };

    generate_legal(board)
        .into_iter()
        .find(|mv| mv.from() == from && mv.to() == to && mv.promotion_piece() == promo)
        .ok_or_else(|| EngineError::IllegalMove(uci.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_a_legal_opening_move() {
        let mut engine = Engine::new();
        engine.apply_move("e2e4").unwrap();
        assert_eq!(engine.board.to_fen().split(' ').next().unwrap(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    }

    #[test]
    fn rejects_illegal_move_without_mutating_board() {
        let mut engine = Engine::new();
        let before = engine.board.clone();
        let err = engine.apply_move("e2e5");
        assert!(err.is_err());
        assert_eq!(engine.board, before);
    }

    #[test]
    fn rejects_malformed_uci_string() {
        let mut engine = Engine::new();
        assert!(engine.apply_move("e2").is_err());
        assert!(engine.apply_move("e2e4x1").is_err());
    }

    #[test]
    fn disambiguates_promotion_by_suffix_character() {
        let mut engine = Engine::new();
        engine.load_fen("7k/8/8/8/8/8/4p3/6K1 b - - 0 1").unwrap();
        engine.apply_move("e2e1n").unwrap();
        assert_eq!(
            engine.board.piece_type_at("e1".parse().unwrap()),
            Some(crate::board::Piece::Knight)
        );
    }

    #[test]
    fn load_fen_leaves_board_unchanged_on_bad_input() {
        let mut engine = Engine::new();
        let before = engine.board.clone();
        assert!(engine.load_fen("not a fen").is_err());
        assert_eq!(engine.board, before);
    }
}
