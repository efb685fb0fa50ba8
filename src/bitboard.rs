//! Bit-scan, pop-count, directional shift, and ray/sliding/xray attack
//! primitives over a plain `u64` bitboard. a1 = bit 0, h8 = bit 63.

use crate::square::{Direction, Square};

pub const FILE_A: u64 = 0x0101_0101_0101_0101;
pub const FILE_H: u64 = 0x8080_8080_8080_8080;
pub const RANK_1: u64 = 0x0000_0000_0000_00FF;
pub const RANK_8: u64 = 0xFF00_0000_0000_0000;

pub trait BitboardExt {
    /// Index of the least-significant set bit. Precondition: `self != 0`.
    fn bitscan_forward(self) -> u8;
    /// Index of the most-significant set bit. Precondition: `self != 0`.
    fn bitscan_reverse(self) -> u8;
    /// Index of the single bit set (alias used where the bitboard is a
    /// known singleton, e.g. a king bitboard).
    fn lsb(self) -> u64;
    fn pop_count(self) -> u32;
    /// Clears and returns the least-significant set bit's index.
    fn pop_lsb(&mut self) -> u8;
}

impl BitboardExt for u64 {
    #[inline(always)]
    fn bitscan_forward(self) -> u8 {
        debug_assert!(self != 0, "bitscan_forward on empty bitboard");
        self.trailing_zeros() as u8
    }

    #[inline(always)]
    fn bitscan_reverse(self) -> u8 {
        debug_assert!(self != 0, "bitscan_reverse on empty bitboard");
        63 - self.leading_zeros() as u8
    }

    #[inline(always)]
    fn lsb(self) -> u64 {
        self & self.wrapping_neg()
    }

    #[inline(always)]
    fn pop_count(self) -> u32 {
        self.count_ones()
    }

    #[inline(always)]
    fn pop_lsb(&mut self) -> u8 {
        let idx = self.bitscan_forward();
        *self &= *self - 1;
        idx
    }
}

/// Shift a bitboard one step in `dir`, without edge masking — callers combine
/// with `FILE_A`/`FILE_H` masks where wraparound would otherwise matter.
#[inline(always)]
pub fn shift(bb: u64, dir: Direction) -> u64 {
    match dir {
        Direction::North => bb << 8,
        Direction::NorthEast => bb << 9,
        Direction::East => bb << 1,
        Direction::NorthWest => bb << 7,
        Direction::South => bb >> 8,
        Direction::SouthWest => bb >> 9,
        Direction::West => bb >> 1,
        Direction::SouthEast => bb >> 7,
    }
}

/// Ray from `sq` in direction `dir`, truncated at (and including) the first
/// occupied square. Positive directions scan forward, negative scan reverse.
#[inline]
pub fn ray_attacks(dir: Direction, sq: Square, occ: u64) -> u64 {
    let full_ray = crate::attacks::tables().ray[dir as usize][sq.index() as usize];
    let blockers = full_ray & occ;
    if blockers == 0 {
        return full_ray;
    }
    if dir.is_positive() {
        let blocker_sq = blockers.bitscan_forward();
        full_ray & !crate::attacks::tables().ray[dir as usize][blocker_sq as usize]
    } else {
        let blocker_sq = blockers.bitscan_reverse();
        full_ray & !crate::attacks::tables().ray[dir as usize][blocker_sq as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidingPiece {
    Bishop,
    Rook,
    Queen,
}

const ROOK_DIRS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];
const BISHOP_DIRS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

/// Union of the relevant rays for a sliding piece from `sq` given `occ`.
#[inline]
pub fn sliding_attacks(pt: SlidingPiece, sq: Square, occ: u64) -> u64 {
    match pt {
        SlidingPiece::Rook => ROOK_DIRS
            .iter()
            .fold(0u64, |acc, &d| acc | ray_attacks(d, sq, occ)),
        SlidingPiece::Bishop => BISHOP_DIRS
            .iter()
            .fold(0u64, |acc, &d| acc | ray_attacks(d, sq, occ)),
        SlidingPiece::Queen => {
            sliding_attacks(SlidingPiece::Rook, sq, occ)
                | sliding_attacks(SlidingPiece::Bishop, sq, occ)
        }
    }
}

/// `xray_attacks<pt>(occ, own_blockers, sq)`: the attack set seen "through"
/// the first layer of `own_blockers`, used to detect pins. A square in the
/// result is attacked by `sq` only once a blocking piece on `own_blockers` is
/// removed from `occ` — i.e. it is pinned against whatever lies beyond it.
#[inline]
pub fn xray_attacks(pt: SlidingPiece, occ: u64, own_blockers: u64, sq: Square) -> u64 {
    let attacks = sliding_attacks(pt, sq, occ);
    let blockers_in_attack = attacks & own_blockers;
    attacks ^ sliding_attacks(pt, sq, occ ^ blockers_in_attack)
}
