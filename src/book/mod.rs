//! Polyglot opening book support (§6): loads a sequence of 16-byte records
//! sorted by position key and probes by the board's own `zobrist` field —
//! the same Polyglot-compatible key the board already maintains for
//! repetition detection, so no second hash is ever computed here.

pub mod polyglot_entry;

use crate::board::{Board, Piece};
use crate::error::EngineError;
use crate::moves::types::{
    CAPTURE, EN_PASSANT, PROMO_BISHOP, PROMO_BISHOP_CAPTURE, PROMO_KNIGHT, PROMO_KNIGHT_CAPTURE,
    PROMO_QUEEN, PROMO_QUEEN_CAPTURE, PROMO_ROOK, PROMO_ROOK_CAPTURE, QUIET,
};
use crate::moves::types::Move;
use polyglot_entry::PolyglotEntry;
use rand::Rng;
use std::fs;
use std::path::Path;

pub(crate) fn flag_for(promo: Option<Piece>, is_capture: bool, is_en_passant: bool) -> u8 {
    if is_en_passant {
        return EN_PASSANT;
    }
    match (promo, is_capture) {
        (Some(Piece::Queen), true) => PROMO_QUEEN_CAPTURE,
        (Some(Piece::Queen), false) => PROMO_QUEEN,
        (Some(Piece::Rook), true) => PROMO_ROOK_CAPTURE,
        (Some(Piece::Rook), false) => PROMO_ROOK,
        (Some(Piece::Bishop), true) => PROMO_BISHOP_CAPTURE,
        (Some(Piece::Bishop), false) => PROMO_BISHOP,
        (Some(Piece::Knight), true) => PROMO_KNIGHT_CAPTURE,
        (Some(Piece::Knight), false) => PROMO_KNIGHT,
        (_, true) => CAPTURE,
        (_, false) => QUIET,
    }
}

pub struct PolyglotBook {
    entries: Vec<PolyglotEntry>,
}

impl PolyglotBook {
    /// Loads and validates a book file, sorted ascending by key as the
    /// format requires (`probe` binary-searches on that invariant).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let bytes = fs::read(path).map_err(|_| EngineError::TruncatedPolyglotRecord {
            expected: PolyglotEntry::BYTE_LEN,
            got: 0,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() % PolyglotEntry::BYTE_LEN != 0 {
            return Err(EngineError::TruncatedPolyglotRecord {
                expected: PolyglotEntry::BYTE_LEN,
                got: bytes.len() % PolyglotEntry::BYTE_LEN,
            });
        }
        let mut entries = Vec::with_capacity(bytes.len() / PolyglotEntry::BYTE_LEN);
        for chunk in bytes.chunks_exact(PolyglotEntry::BYTE_LEN) {
            entries.push(PolyglotEntry::from_bytes(chunk)?);
        }
        entries.sort_by_key(|e| e.key);
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binary-searches the sorted table for `board.zobrist`, then chooses
    /// among the matching records by weighted random selection (§6).
    pub fn probe(&self, board: &Board) -> Option<Move> {
        let key = board.zobrist;
        let start = self.entries.partition_point(|e| e.key < key);
        let end = self.entries.partition_point(|e| e.key <= key);
        let matches = &self.entries[start..end];
        if matches.is_empty() {
            return None;
        }

        let total_weight: u32 = matches.iter().map(|e| e.weight as u32 + 1).sum();
        let mut pick = rand::rng().random_range(0..total_weight);
        for entry in matches {
            let w = entry.weight as u32 + 1;
            if pick < w {
                return entry.decode_move(board);
            }
            pick -= w;
        }
        matches.last().and_then(|e| e.decode_move(board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: u64, move_poly: u16, weight: u16) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&key.to_be_bytes());
        bytes[8..10].copy_from_slice(&move_poly.to_be_bytes());
        bytes[10..12].copy_from_slice(&weight.to_be_bytes());
        bytes
    }

    #[test]
    fn loads_and_sorts_records_by_key() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&record(5, 0, 1));
        bytes.extend_from_slice(&record(1, 0, 1));
        let book = PolyglotBook::from_bytes(&bytes).unwrap();
        assert_eq!(book.len(), 2);
        assert!(book.entries[0].key <= book.entries[1].key);
    }

    #[test]
    fn rejects_byte_stream_not_a_multiple_of_record_size() {
        let bytes = vec![0u8; 17];
        assert!(PolyglotBook::from_bytes(&bytes).is_err());
    }

    #[test]
    fn probe_finds_a_move_for_the_startpos_key() {
        let board = crate::board::Board::new();
        // e2e4: from e2(file4,rank1)=idx12, to e4(file4,rank3)=idx28
        let move_poly: u16 = 4 | (3 << 3) | (4 << 6) | (1 << 9);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&record(board.zobrist, move_poly, 10));
        let book = PolyglotBook::from_bytes(&bytes).unwrap();
        let mv = book.probe(&board);
        assert!(mv.is_some());
    }

    #[test]
    fn probe_returns_none_when_key_absent() {
        let board = crate::board::Board::new();
        let book = PolyglotBook::from_bytes(&[]).unwrap();
        assert!(book.probe(&board).is_none());
    }
}
