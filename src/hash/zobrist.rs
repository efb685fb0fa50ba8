//! The single Zobrist key maintained by every `Board`, constructed to match
//! the Polyglot opening-book convention so the same key serves both internal
//! repetition detection and external book lookups — no second, private hash
//! exists anywhere in the engine.

use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::utils::xorshift64;
use once_cell::sync::OnceCell;

/// `random64[0..768)` piece terms, `[768..772)` castle terms (WK,WQ,BK,BQ),
/// `[772..780)` en-passant file terms, `[780]` the side-to-move term.
pub const POLYGLOT_TABLE_LEN: usize = 781;

/// Seed for the reference xorshift64 generator that produces `random64`.
/// Fixed so the table is reproducible across builds instead of checked in as
/// a 781-entry literal array.
const POLYGLOT_SEED: u64 = 1_070_372;

pub struct ZobristKeys {
    random64: [u64; POLYGLOT_TABLE_LEN],
}

impl ZobristKeys {
    #[inline(always)]
    fn piece_kind(piece: Piece, color: Color) -> usize {
        // Polyglot order: Black-Pawn=0, White-Pawn=1, ..., White-King=11.
        let piece_index = piece as usize; // Pawn,Knight,Bishop,Rook,Queen,King = 0..6
        let color_bit = match color {
            Color::White => 1,
            Color::Black => 0,
        };
        2 * piece_index + color_bit
    }

    #[inline(always)]
    pub fn piece(&self, color: Color, piece: Piece, sq_index: u8) -> u64 {
        let kind = Self::piece_kind(piece, color);
        let rank = (sq_index / 8) as usize;
        let file = (sq_index % 8) as usize;
        self.random64[64 * kind + 8 * rank + file]
    }

    /// `slot` in `[0,4)`: 0=WK, 1=WQ, 2=BK, 3=BQ.
    #[inline(always)]
    pub fn castle(&self, slot: usize) -> u64 {
        self.random64[768 + slot]
    }

    #[inline(always)]
    pub fn ep_file(&self, file: u8) -> u64 {
        self.random64[772 + file as usize]
    }

    #[inline(always)]
    pub fn turn(&self) -> u64 {
        self.random64[780]
    }
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| {
        let mut state = POLYGLOT_SEED;
        let mut random64 = [0u64; POLYGLOT_TABLE_LEN];
        for slot in random64.iter_mut() {
            *slot = xorshift64(&mut state);
        }
        ZobristKeys { random64 }
    })
}

/// XOR the delta between two castling-rights bitfields into `hash`, using
/// the WK/WQ/BK/BQ castle-term ordering Polyglot expects.
#[inline]
pub fn xor_castling_rights_delta(hash: &mut u64, keys: &ZobristKeys, old: u8, new_rights: u8) {
    let changed = old ^ new_rights;
    if changed & CASTLE_WK != 0 {
        *hash ^= keys.castle(0);
    }
    if changed & CASTLE_WQ != 0 {
        *hash ^= keys.castle(1);
    }
    if changed & CASTLE_BK != 0 {
        *hash ^= keys.castle(2);
    }
    if changed & CASTLE_BQ != 0 {
        *hash ^= keys.castle(3);
    }
}

/// `Some(file)` iff the board's en-passant square should contribute to the
/// hash this ply — i.e. an enemy pawn could actually capture onto it.
/// Pseudo-legal only (pins/king safety are irrelevant to the hash contract).
pub fn ep_file_to_hash(board: &Board) -> Option<u8> {
    let ep = board.en_passant?;
    let idx = ep.index();
    let rank = idx / 8;
    if rank != 2 && rank != 5 {
        return None;
    }

    let ep_bb = 1u64 << idx;
    let has_capturing_pawn = match board.side_to_move {
        Color::White => {
            let from_ne = (ep_bb >> 9) & !crate::bitboard::FILE_H;
            let from_nw = (ep_bb >> 7) & !crate::bitboard::FILE_A;
            (from_ne | from_nw) & board.bb(Color::White, Piece::Pawn) != 0
        }
        Color::Black => {
            let from_se = (ep_bb << 7) & !crate::bitboard::FILE_A;
            let from_sw = (ep_bb << 9) & !crate::bitboard::FILE_H;
            (from_se | from_sw) & board.bb(Color::Black, Piece::Pawn) != 0
        }
    };

    has_capturing_pawn.then_some(idx % 8)
}

/// Full recompute of the Polyglot-compatible key from scratch. Used only by
/// `Board::refresh_zobrist` (construction, FEN loading) and the debug
/// cross-check against the incrementally-maintained key — never on the
/// make/undo hot path.
pub fn compute_zobrist_full(board: &Board) -> u64 {
    let keys = zobrist_keys();
    let mut hash = 0u64;

    const PIECES: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];
    for &color in &[Color::White, Color::Black] {
        for &piece in &PIECES {
            let mut bb = board.bb(color, piece);
            while bb != 0 {
                let sq = bb.trailing_zeros() as u8;
                hash ^= keys.piece(color, piece, sq);
                bb &= bb - 1;
            }
        }
    }

    if board.castling_rights & CASTLE_WK != 0 {
        hash ^= keys.castle(0);
    }
    if board.castling_rights & CASTLE_WQ != 0 {
        hash ^= keys.castle(1);
    }
    if board.castling_rights & CASTLE_BK != 0 {
        hash ^= keys.castle(2);
    }
    if board.castling_rights & CASTLE_BQ != 0 {
        hash ^= keys.castle(3);
    }

    if let Some(file) = ep_file_to_hash(board) {
        hash ^= keys.ep_file(file);
    }

    if board.side_to_move == Color::White {
        hash ^= keys.turn();
    }

    hash
}
