//! `make_move`/`undo_move`: the only two functions allowed to mutate a
//! `Board`'s bitboards, mailbox, castling rights, en-passant square, clocks,
//! and Zobrist key. Both live as inherent `Board` methods so the irreversible
//! history stack they push/pop stays an implementation detail of the board
//! itself rather than a side channel the caller has to thread through.

use crate::board::castle_bits::*;
use crate::board::{Board, Color, HistoryRecord, Piece};
use crate::hash::zobrist::{ep_file_to_hash, xor_castling_rights_delta, zobrist_keys};
use crate::moves::types::{KING_CASTLE, Move, QUEEN_CASTLE};
use crate::square::Square;

/// `(rook_from, rook_to)` for the king's destination square of a castle move.
#[inline(always)]
fn castle_rook_squares(color: Color, flag: u8) -> (Square, Square) {
    match (color, flag) {
        (Color::White, KING_CASTLE) => (Square::from_index(7), Square::from_index(5)),
        (Color::White, QUEEN_CASTLE) => (Square::from_index(0), Square::from_index(3)),
        (Color::Black, KING_CASTLE) => (Square::from_index(63), Square::from_index(61)),
        (Color::Black, QUEEN_CASTLE) => (Square::from_index(56), Square::from_index(59)),
        _ => unreachable!("castle_rook_squares called on a non-castle flag"),
    }
}

/// Which castling right, if any, is lost when a rook on `sq` moves or is captured.
#[inline(always)]
fn rook_corner_right(color: Color, sq: Square) -> u8 {
    match (color, sq.index()) {
        (Color::White, 0) => CASTLE_WQ,
        (Color::White, 7) => CASTLE_WK,
        (Color::Black, 56) => CASTLE_BQ,
        (Color::Black, 63) => CASTLE_BK,
        _ => 0,
    }
}

#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.bb(color, piece) & !sq.bit();
    board.set_bb(color, piece, new_bb);
}

#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.bb(color, piece) | sq.bit();
    board.set_bb(color, piece, new_bb);
}

impl Board {
    /// Mutates the board per §4.3. `mv` must be one of `generate_legal`'s own
    /// outputs (or at least pseudo-legal against this exact position) — an
    /// empty `from` square is a programmer error, not a recoverable one.
    pub fn make_move(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let color = self.side_to_move;
        let moved = self
            .piece_type_at(from)
            .unwrap_or_else(|| panic!("make_move: no piece on {from}"));

        let prev_zobrist = self.zobrist;
        let prev_castling_rights = self.castling_rights;
        let prev_en_passant = self.en_passant;
        let prev_halfmove_clock = self.halfmove_clock;

        if let Some(file) = ep_file_to_hash(self) {
            self.zobrist ^= zobrist_keys().ep_file(file);
        }
        self.en_passant = None;

        let mut captured: Option<Piece> = None;

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(color, mv.flag());
            remove_piece(self, color, Piece::King, from);
            place_piece(self, color, Piece::King, to);
            remove_piece(self, color, Piece::Rook, rook_from);
            place_piece(self, color, Piece::Rook, rook_to);
        } else if mv.is_en_passant() {
            let cap_idx = if color == Color::White {
                to.index() - 8
            } else {
                to.index() + 8
            };
            let cap_sq = Square::from_index(cap_idx);
            captured = Some(Piece::Pawn);
            remove_piece(self, color.opposite(), Piece::Pawn, cap_sq);
            remove_piece(self, color, Piece::Pawn, from);
            place_piece(self, color, Piece::Pawn, to);
        } else {
            if mv.is_capture() {
                let (cap_color, cap_piece) = self
                    .piece_at(to)
                    .unwrap_or_else(|| panic!("make_move: capture flag but {to} is empty"));
                captured = Some(cap_piece);
                remove_piece(self, cap_color, cap_piece, to);
            }
            remove_piece(self, color, moved, from);
            match mv.promotion_piece() {
                Some(promoted) => place_piece(self, color, promoted, to),
                None => place_piece(self, color, moved, to),
            }
        }

        // Castling rights: king move clears both of the mover's rights; a
        // rook moving from (or being captured on) its home corner clears one.
        let mut mask_to_clear = 0u8;
        if moved == Piece::King {
            mask_to_clear |= match color {
                Color::White => CASTLE_WK | CASTLE_WQ,
                Color::Black => CASTLE_BK | CASTLE_BQ,
            };
        }
        if moved == Piece::Rook {
            mask_to_clear |= rook_corner_right(color, from);
        }
        if let Some(cap_piece) = captured
            && cap_piece == Piece::Rook
        {
            mask_to_clear |= rook_corner_right(color.opposite(), to);
        }
        let new_rights = prev_castling_rights & !mask_to_clear;
        if new_rights != self.castling_rights {
            xor_castling_rights_delta(&mut self.zobrist, zobrist_keys(), self.castling_rights, new_rights);
            self.castling_rights = new_rights;
        }

        if moved == Piece::Pawn && mv.is_double_pawn_push() {
            let skipped = if color == Color::White {
                from.index() + 8
            } else {
                from.index() - 8
            };
            self.en_passant = Some(Square::from_index(skipped));
        }

        if captured.is_some() || moved == Piece::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = prev_halfmove_clock + 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = color.opposite();
        self.zobrist ^= zobrist_keys().turn();

        if let Some(file) = ep_file_to_hash(self) {
            self.zobrist ^= zobrist_keys().ep_file(file);
        }

        self.history.push(HistoryRecord {
            captured,
            prev_castling_rights,
            prev_en_passant,
            prev_halfmove_clock,
            prev_zobrist,
        });

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Reverses the effect of `make_move(mv)`. `mv` must be the same move
    /// just made; an empty history is a programmer error (no matching
    /// `make_move` to undo).
    pub fn undo_move(&mut self, mv: Move) {
        let record = self
            .history
            .pop()
            .expect("undo_move: history is empty, nothing to undo");

        let from = mv.from();
        let to = mv.to();
        let color = self.side_to_move.opposite();

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(color, mv.flag());
            remove_piece(self, color, Piece::Rook, rook_to);
            place_piece(self, color, Piece::Rook, rook_from);
            remove_piece(self, color, Piece::King, to);
            place_piece(self, color, Piece::King, from);
        } else if mv.is_en_passant() {
            remove_piece(self, color, Piece::Pawn, to);
            place_piece(self, color, Piece::Pawn, from);
            let cap_idx = if color == Color::White {
                to.index() - 8
            } else {
                to.index() + 8
            };
            place_piece(self, color.opposite(), Piece::Pawn, Square::from_index(cap_idx));
        } else {
            match mv.promotion_piece() {
                Some(promoted) => {
                    remove_piece(self, color, promoted, to);
                    place_piece(self, color, Piece::Pawn, from);
                }
                None => {
                    let moved = self
                        .piece_type_at(to)
                        .unwrap_or_else(|| panic!("undo_move: no piece on {to}"));
                    remove_piece(self, color, moved, to);
                    place_piece(self, color, moved, from);
                }
            }
            if let Some(cap_piece) = record.captured {
                place_piece(self, color.opposite(), cap_piece, to);
            }
        }

        self.side_to_move = color;
        self.castling_rights = record.prev_castling_rights;
        self.en_passant = record.prev_en_passant;
        self.halfmove_clock = record.prev_halfmove_clock;
        if color == Color::Black {
            self.fullmove_number -= 1;
        }
        self.zobrist = record.prev_zobrist;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::movegen::generate_legal;

    #[test]
    fn make_undo_round_trips_starting_position() {
        let mut board = Board::new();
        let before = board.clone();
        let moves = generate_legal(&board);
        for &mv in &moves {
            board.make_move(mv);
            board.undo_move(mv);
            assert_eq!(board, before, "round trip mismatch for {mv}");
        }
    }

    #[test]
    fn en_passant_capture_removes_correct_pawn() {
        let mut board: Board = "8/8/8/3Pp3/8/8/8/4K2k w - e6 0 1".parse().unwrap();
        let mv = generate_legal(&board)
            .into_iter()
            .find(|m| m.is_en_passant())
            .expect("ep move must be generated");
        let before = board.clone();
        board.make_move(mv);
        assert!(board.piece_at(Square::from_index(36)).is_none()); // e5 captured pawn gone
        assert_eq!(board.piece_at(Square::from_index(44)).unwrap().1, Piece::Pawn); // e6
        board.undo_move(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let mv = generate_legal(&board)
            .into_iter()
            .find(|m| m.is_kingside_castle())
            .unwrap();
        board.make_move(mv);
        assert_eq!(board.piece_at(Square::from_index(6)).unwrap().1, Piece::King);
        assert_eq!(board.piece_at(Square::from_index(5)).unwrap().1, Piece::Rook);
        assert!(board.piece_at(Square::from_index(4)).is_none());
        assert!(board.piece_at(Square::from_index(7)).is_none());
    }

    #[test]
    fn promotion_replaces_pawn_with_chosen_piece() {
        let mut board: Board = "4k3/8/8/8/8/8/4p3/4K3 b - - 0 1".parse().unwrap();
        let promo = generate_legal(&board)
            .into_iter()
            .find(|m| m.promotion_piece() == Some(Piece::Queen))
            .unwrap();
        let before = board.clone();
        board.make_move(promo);
        assert_eq!(
            board.piece_at(Square::from_index(4)).unwrap().1,
            Piece::Queen
        );
        board.undo_move(promo);
        assert_eq!(board, before);
    }
}
