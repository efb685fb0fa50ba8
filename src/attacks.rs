//! Precomputed, read-only per-square attack tables: pawn captures, knight
//! and king neighborhoods, the eight directional rays, and the
//! direction-between lookup used by pin detection. Built once behind a
//! `OnceCell` and never mutated afterward.

use crate::board::Color;
use crate::square::{Direction, Square};
use once_cell::sync::OnceCell;

pub struct AttackTables {
    pub pawn_attacks: [[u64; 64]; 2],
    pub knight_moves: [u64; 64],
    pub king_moves: [u64; 64],
    pub ray: [[u64; 64]; 8],
    /// `direction_between[from][to]`, `None` if not on a common rank/file/diagonal.
    pub direction_between: [[Option<Direction>; 64]; 64],
}

pub fn tables() -> &'static AttackTables {
    static TABLES: OnceCell<AttackTables> = OnceCell::new();
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> AttackTables {
    AttackTables {
        pawn_attacks: build_pawn_attacks(),
        knight_moves: build_knight_moves(),
        king_moves: build_king_moves(),
        ray: build_rays(),
        direction_between: build_direction_between(),
    }
}

fn in_bounds(file: i8, rank: i8) -> bool {
    (0..8).contains(&file) && (0..8).contains(&rank)
}

fn build_pawn_attacks() -> [[u64; 64]; 2] {
    let mut table = [[0u64; 64]; 2];
    for sq in 0..64u8 {
        let s = Square::from_index(sq);
        let file = s.file() as i8;
        let rank = s.rank() as i8;

        let mut white = 0u64;
        let mut black = 0u64;
        for &df in &[-1i8, 1i8] {
            if in_bounds(file + df, rank + 1) {
                white |= Square::from_file_rank((file + df) as u8, (rank + 1) as u8).bit();
            }
            if in_bounds(file + df, rank - 1) {
                black |= Square::from_file_rank((file + df) as u8, (rank - 1) as u8).bit();
            }
        }
        table[Color::White as usize][sq as usize] = white;
        table[Color::Black as usize][sq as usize] = black;
    }
    table
}

fn build_knight_moves() -> [u64; 64] {
    const DELTAS: [(i8, i8); 8] = [
        (1, 2),
        (2, 1),
        (2, -1),
        (1, -2),
        (-1, -2),
        (-2, -1),
        (-2, 1),
        (-1, 2),
    ];
    let mut table = [0u64; 64];
    for sq in 0..64u8 {
        let s = Square::from_index(sq);
        let file = s.file() as i8;
        let rank = s.rank() as i8;
        let mut bb = 0u64;
        for &(df, dr) in &DELTAS {
            if in_bounds(file + df, rank + dr) {
                bb |= Square::from_file_rank((file + df) as u8, (rank + dr) as u8).bit();
            }
        }
        table[sq as usize] = bb;
    }
    table
}

fn build_king_moves() -> [u64; 64] {
    let mut table = [0u64; 64];
    for sq in 0..64u8 {
        let s = Square::from_index(sq);
        let file = s.file() as i8;
        let rank = s.rank() as i8;
        let mut bb = 0u64;
        for df in -1i8..=1 {
            for dr in -1i8..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                if in_bounds(file + df, rank + dr) {
                    bb |= Square::from_file_rank((file + df) as u8, (rank + dr) as u8).bit();
                }
            }
        }
        table[sq as usize] = bb;
    }
    table
}

fn build_rays() -> [[u64; 64]; 8] {
    let mut table = [[0u64; 64]; 8];
    for (dir_idx, &dir) in Direction::ALL.iter().enumerate() {
        let (df, dr) = dir.delta();
        for sq in 0..64u8 {
            let s = Square::from_index(sq);
            let mut file = s.file() as i8 + df;
            let mut rank = s.rank() as i8 + dr;
            let mut bb = 0u64;
            while in_bounds(file, rank) {
                bb |= Square::from_file_rank(file as u8, rank as u8).bit();
                file += df;
                rank += dr;
            }
            table[dir_idx][sq as usize] = bb;
        }
    }
    table
}

fn build_direction_between() -> [[Option<Direction>; 64]; 64] {
    let mut table = [[None; 64]; 64];
    for from in 0..64u8 {
        let fsq = Square::from_index(from);
        for &dir in &Direction::ALL {
            let (df, dr) = dir.delta();
            let mut file = fsq.file() as i8 + df;
            let mut rank = fsq.rank() as i8 + dr;
            while in_bounds(file, rank) {
                let to = Square::from_file_rank(file as u8, rank as u8);
                table[from as usize][to.index() as usize] = Some(dir);
                file += df;
                rank += dr;
            }
        }
    }
    table
}
