//! Square/File/Rank/Direction geometry: the coordinate system every other
//! module is built on. Little-endian rank-file mapping: a1=0, h1=7, a8=56, h8=63.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    #[inline(always)]
    pub const fn from_index(i: u8) -> Self {
        debug_assert!(i < 64);
        Square(i)
    }

    #[inline(always)]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    #[inline(always)]
    pub const fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    #[inline(always)]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }
}

impl TryFrom<u64> for Square {
    type Error = &'static str;

    /// Builds a Square from a single-bit bitboard (e.g. the result of `bb.lsb()`).
    fn try_from(single_bit_bb: u64) -> Result<Self, Self::Error> {
        if single_bit_bb == 0 || single_bit_bb & (single_bit_bb - 1) != 0 {
            return Err("not a single-bit bitboard");
        }
        Ok(Square(single_bit_bb.trailing_zeros() as u8))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl std::str::FromStr for Square {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file_ch = chars
            .next()
            .ok_or_else(|| crate::error::EngineError::malformed_square(s))?;
        let rank_ch = chars
            .next()
            .ok_or_else(|| crate::error::EngineError::malformed_square(s))?;
        if chars.next().is_some() {
            return Err(crate::error::EngineError::malformed_square(s));
        }
        if !('a'..='h').contains(&file_ch) || !('1'..='8').contains(&rank_ch) {
            return Err(crate::error::EngineError::malformed_square(s));
        }
        let file = file_ch as u8 - b'a';
        let rank = rank_ch as u8 - b'1';
        Ok(Square::from_file_rank(file, rank))
    }
}

/// One of the eight compass directions a sliding piece attacks along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// True for the four "positive" (increasing square index) directions, which
    /// need a forward bit-scan to find the first blocker; false for the rest.
    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }

    #[inline(always)]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }

    /// (file_delta, rank_delta) taken by one step in this direction.
    #[inline(always)]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}
