//! Legal move generation (§4.4): single public entry points `generate_legal`
//! and `generate_captures`, each producing a bounded, duplicate-free list of
//! fully legal moves for the side to move. Check-evasion and pins are
//! computed once per call and used to filter every piece class, rather than
//! generating pseudo-legal moves and re-testing king safety after the fact.

use crate::attacks::tables;
use crate::bitboard::{self, BitboardExt, SlidingPiece};
use crate::board::{Board, Color, Piece};
use crate::moves::square_control::{attackers_to, attacked_squares, is_legal_castling};
use crate::moves::types::{
    CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KING_CASTLE, Move, MoveList, PROMO_BISHOP,
    PROMO_BISHOP_CAPTURE, PROMO_KNIGHT, PROMO_KNIGHT_CAPTURE, PROMO_QUEEN, PROMO_QUEEN_CAPTURE,
    PROMO_ROOK, PROMO_ROOK_CAPTURE, QUEEN_CASTLE, QUIET,
};
use crate::square::Square;

const RANK_3: u64 = 0x0000_0000_00FF_0000;
const RANK_6: u64 = 0x0000_FF00_0000_0000;

const WHITE_KINGSIDE_BETWEEN: u64 = 0x0000_0000_0000_0060;
const WHITE_QUEENSIDE_BETWEEN: u64 = 0x0000_0000_0000_000E;
const BLACK_KINGSIDE_BETWEEN: u64 = 0x6000_0000_0000_0000;
const BLACK_QUEENSIDE_BETWEEN: u64 = 0x0E00_0000_0000_0000;

const ALL_SQUARES: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// State shared by every piece-class emitter for one `generate_*` call:
/// the check-evasion mask (§4.4 "check mask"), the pin rays, and the set of
/// squares the opponent attacks with the king removed from occupancy.
struct GenState {
    us: u64,
    them: u64,
    occ: u64,
    check_mask: u64,
    n_checkers: u32,
    pinned: u64,
    pinner_rays: u64,
}

fn prepare(board: &Board) -> (GenState, Square) {
    let color = board.side_to_move;
    let opp = color.opposite();
    let us = board.occupancy(color);
    let them = board.occupancy(opp);
    let occ = us | them;
    let king_bb = board.pieces(Piece::King, color);
    let ksq = Square::try_from(king_bb.lsb()).expect("side to move must have exactly one king");

    // Remove our king from occupancy so sliding attackers see through it:
    // the king must not be allowed to "hide" behind its own square when
    // stepping along a check ray.
    let occ_without_king = occ ^ king_bb;

    let checkers = attackers_to(board, ksq, opp, occ_without_king);
    let n_checkers = checkers.pop_count();

    let check_mask = match n_checkers {
        0 => ALL_SQUARES,
        1 => {
            let checker_sq = Square::from_index(checkers.bitscan_forward());
            checkers | squares_between(checker_sq, ksq)
        }
        _ => 0, // unused: only king moves are emitted when in double check
    };

    let (pinned, pinner_rays) = if n_checkers <= 1 {
        compute_pins(board, opp, occ, us, ksq)
    } else {
        (0, 0)
    };

    (
        GenState {
            us,
            them,
            occ,
            check_mask,
            n_checkers,
            pinned,
            pinner_rays,
        },
        ksq,
    )
}

/// Squares strictly between `from` and `to` along their common ray; empty if
/// they share none.
fn squares_between(from: Square, to: Square) -> u64 {
    match tables().direction_between[from.index() as usize][to.index() as usize] {
        Some(dir) => {
            let ray_from = tables().ray[dir as usize][from.index() as usize];
            let opposite = dir as usize ^ 0b100; // N<->S, NE<->SW, E<->W, SE<->NW
            let ray_to = tables().ray[opposite][to.index() as usize];
            ray_from & ray_to
        }
        None => 0,
    }
}

/// Pinned pieces (§4.4): for each xray-discovered pinner, the ray from pinner
/// to king (inclusive of the pinner) restricts the lone piece standing on it.
fn compute_pins(board: &Board, opp: Color, occ: u64, us: u64, ksq: Square) -> (u64, u64) {
    let opp_rooks = board.pieces(Piece::Rook, opp) | board.pieces(Piece::Queen, opp);
    let opp_bishops = board.pieces(Piece::Bishop, opp) | board.pieces(Piece::Queen, opp);

    let rook_pinners = bitboard::xray_attacks(SlidingPiece::Rook, occ, us, ksq) & opp_rooks;
    let bishop_pinners = bitboard::xray_attacks(SlidingPiece::Bishop, occ, us, ksq) & opp_bishops;

    let mut pinned = 0u64;
    let mut pinner_rays = 0u64;

    let mut pinners = rook_pinners | bishop_pinners;
    while pinners != 0 {
        let p = Square::from_index(pinners.bitscan_forward());
        pinners &= pinners - 1;
        let between = squares_between(p, ksq);
        pinned |= between & us;
        pinner_rays |= between | p.bit();
    }

    (pinned, pinner_rays)
}

#[inline(always)]
fn dest_mask(state: &GenState, from: Square, raw_targets: u64) -> u64 {
    let mut targets = raw_targets & !state.us & state.check_mask;
    if state.pinned & from.bit() != 0 {
        targets &= state.pinner_rays;
    }
    targets
}

#[inline(always)]
fn push_targets(from: Square, mut targets: u64, them: u64, out: &mut MoveList) {
    while targets != 0 {
        let to = Square::from_index(targets.bitscan_forward());
        targets &= targets - 1;
        let flag = if them & to.bit() != 0 { CAPTURE } else { QUIET };
        out.push(Move::new(from, to, flag));
    }
}

fn generate_king(board: &Board, state: &GenState, ksq: Square, opp_attacks: u64, out: &mut MoveList) {
    let color = board.side_to_move;
    let targets = tables().king_moves[ksq.index() as usize] & !state.us & !opp_attacks;
    push_targets(ksq, targets, state.them, out);

    if state.n_checkers >= 2 {
        return;
    }

    if board.has_kingside_castle(color) {
        let between = kingside_between(color);
        if state.occ & between == 0 {
            let to = Square::from_index(ksq.index() + 2);
            let mv = Move::new(ksq, to, KING_CASTLE);
            if is_legal_castling(board, mv) {
                out.push(mv);
            }
        }
    }
    if board.has_queenside_castle(color) {
        let between = queenside_between(color);
        if state.occ & between == 0 {
            let to = Square::from_index(ksq.index() - 2);
            let mv = Move::new(ksq, to, QUEEN_CASTLE);
            if is_legal_castling(board, mv) {
                out.push(mv);
            }
        }
    }
}

#[inline(always)]
fn kingside_between(color: Color) -> u64 {
    match color {
        Color::White => WHITE_KINGSIDE_BETWEEN,
        Color::Black => BLACK_KINGSIDE_BETWEEN,
    }
}

#[inline(always)]
fn queenside_between(color: Color) -> u64 {
    match color {
        Color::White => WHITE_QUEENSIDE_BETWEEN,
        Color::Black => BLACK_QUEENSIDE_BETWEEN,
    }
}

fn generate_knight(board: &Board, state: &GenState, out: &mut MoveList) {
    let color = board.side_to_move;
    let mut bb = board.pieces(Piece::Knight, color);
    while bb != 0 {
        let from = Square::from_index(bb.bitscan_forward());
        bb &= bb - 1;
        let raw = tables().knight_moves[from.index() as usize];
        push_targets(from, dest_mask(state, from, raw), state.them, out);
    }
}

fn generate_sliders(board: &Board, state: &GenState, piece: Piece, out: &mut MoveList) {
    let color = board.side_to_move;
    let sliding_piece = match piece {
        Piece::Bishop => SlidingPiece::Bishop,
        Piece::Rook => SlidingPiece::Rook,
        Piece::Queen => SlidingPiece::Queen,
        _ => unreachable!("generate_sliders called on a non-sliding piece"),
    };
    let mut bb = board.pieces(piece, color);
    while bb != 0 {
        let from = Square::from_index(bb.bitscan_forward());
        bb &= bb - 1;
        let raw = bitboard::sliding_attacks(sliding_piece, from, state.occ);
        push_targets(from, dest_mask(state, from, raw), state.them, out);
    }
}

const PROMOS_QUIET: [u8; 4] = [PROMO_QUEEN, PROMO_ROOK, PROMO_BISHOP, PROMO_KNIGHT];
const PROMOS_CAPTURE: [u8; 4] = [
    PROMO_QUEEN_CAPTURE,
    PROMO_ROOK_CAPTURE,
    PROMO_BISHOP_CAPTURE,
    PROMO_KNIGHT_CAPTURE,
];

fn generate_pawns(
    board: &Board,
    state: &GenState,
    ksq: Square,
    captures_only: bool,
    out: &mut MoveList,
) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let empty = !state.occ;

    let (promo_rank, third_rank, forward_offset): (u64, u64, i8) = match color {
        Color::White => (crate::bitboard::RANK_8, RANK_3, 8),
        Color::Black => (crate::bitboard::RANK_1, RANK_6, -8),
    };

    if !captures_only {
        let single = shift_forward(pawns, forward_offset) & empty;
        let double = shift_forward(single & third_rank, forward_offset) & empty;

        let mut quiet_pushes = single & !promo_rank;
        while quiet_pushes != 0 {
            let to = Square::from_index(quiet_pushes.bitscan_forward());
            quiet_pushes &= quiet_pushes - 1;
            let from = Square::from_index((to.index() as i8 - forward_offset) as u8);
            if dest_mask(state, from, to.bit()) != 0 {
                out.push(Move::new(from, to, QUIET));
            }
        }

        let mut doubles = double;
        while doubles != 0 {
            let to = Square::from_index(doubles.bitscan_forward());
            doubles &= doubles - 1;
            let from = Square::from_index((to.index() as i8 - 2 * forward_offset) as u8);
            if dest_mask(state, from, to.bit()) != 0 {
                out.push(Move::new(from, to, DOUBLE_PAWN_PUSH));
            }
        }

        let mut promo_pushes = single & promo_rank;
        while promo_pushes != 0 {
            let to = Square::from_index(promo_pushes.bitscan_forward());
            promo_pushes &= promo_pushes - 1;
            let from = Square::from_index((to.index() as i8 - forward_offset) as u8);
            if dest_mask(state, from, to.bit()) != 0 {
                for &flag in &PROMOS_QUIET {
                    out.push(Move::new(from, to, flag));
                }
            }
        }
    }

    let mut attackers = pawns;
    while attackers != 0 {
        let from = Square::from_index(attackers.bitscan_forward());
        attackers &= attackers - 1;
        let raw = tables().pawn_attacks[color as usize][from.index() as usize];
        let targets = dest_mask(state, from, raw & state.them);
        let mut t = targets & !promo_rank;
        while t != 0 {
            let to = Square::from_index(t.bitscan_forward());
            t &= t - 1;
            out.push(Move::new(from, to, CAPTURE));
        }
        let mut promo_t = targets & promo_rank;
        while promo_t != 0 {
            let to = Square::from_index(promo_t.bitscan_forward());
            promo_t &= promo_t - 1;
            for &flag in &PROMOS_CAPTURE {
                out.push(Move::new(from, to, flag));
            }
        }
    }

    if let Some(ep_sq) = board.en_passant {
        generate_en_passant(board, state, ksq, ep_sq, out);
    }
}

#[inline(always)]
fn shift_forward(bb: u64, forward_offset: i8) -> u64 {
    if forward_offset > 0 { bb << 8 } else { bb >> 8 }
}

/// En-passant legality (§4.4 step 6): the only case requiring a full
/// make/undo-style simulation instead of the static pin/check masks, since
/// removing the captured pawn can expose a horizontal discovered check that
/// no ray from the king through the mover's own square would catch.
fn generate_en_passant(
    board: &Board,
    state: &GenState,
    ksq: Square,
    ep_sq: Square,
    out: &mut MoveList,
) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let cap_idx = match color {
        Color::White => ep_sq.index() - 8,
        Color::Black => ep_sq.index() + 8,
    };
    let cap_sq = Square::from_index(cap_idx);

    let attacks_to_ep = tables().pawn_attacks[color.opposite() as usize][ep_sq.index() as usize];
    let mut movers = pawns & attacks_to_ep;
    while movers != 0 {
        let from = Square::from_index(movers.bitscan_forward());
        movers &= movers - 1;

        let resolves_check = state.check_mask == ALL_SQUARES
            || (state.check_mask & cap_sq.bit()) != 0
            || (state.check_mask & ep_sq.bit()) != 0;
        if !resolves_check {
            continue;
        }

        if !ep_leaves_king_safe(board, color, ksq, from, cap_sq, ep_sq) {
            continue;
        }
        out.push(Move::new(from, ep_sq, EN_PASSANT));
    }
}

/// Simulates removing both the mover and the captured pawn and placing the
/// mover on `ep_sq`, then re-tests rook/queen and bishop/queen attacks along
/// the resulting occupancy — the classic en-passant horizontal (and
/// incidentally diagonal-pin) discovered-check case.
fn ep_leaves_king_safe(
    board: &Board,
    color: Color,
    ksq: Square,
    from: Square,
    cap_sq: Square,
    ep_sq: Square,
) -> bool {
    let occ_after = (board.occupied() ^ from.bit() ^ cap_sq.bit()) | ep_sq.bit();
    let opp = color.opposite();

    let rook_attacks = bitboard::sliding_attacks(SlidingPiece::Rook, ksq, occ_after);
    let opp_rooks = board.pieces(Piece::Rook, opp) | board.pieces(Piece::Queen, opp);
    if rook_attacks & opp_rooks != 0 {
        return false;
    }
    let bishop_attacks = bitboard::sliding_attacks(SlidingPiece::Bishop, ksq, occ_after);
    let opp_bishops = board.pieces(Piece::Bishop, opp) | board.pieces(Piece::Queen, opp);
    bishop_attacks & opp_bishops == 0
}

fn generate_all(board: &Board, captures_only: bool, out: &mut MoveList) {
    out.clear();
    let color = board.side_to_move;
    let (state, ksq) = prepare(board);
    let occ_without_our_king = state.occ ^ board.pieces(Piece::King, color);
    let opp_attacks = attacked_squares(board, color.opposite(), occ_without_our_king);

    generate_king(board, &state, ksq, opp_attacks, out);
    if state.n_checkers >= 2 {
        return;
    }

    generate_pawns(board, &state, ksq, captures_only, out);
    generate_knight(board, &state, out);
    generate_sliders(board, &state, Piece::Bishop, out);
    generate_sliders(board, &state, Piece::Rook, out);
    generate_sliders(board, &state, Piece::Queen, out);

    if captures_only {
        out.retain(|mv| mv.is_capture() || mv.is_promotion());
    }
}

/// All fully legal moves for the side to move (§4.4).
pub fn generate_legal(board: &Board) -> MoveList {
    let mut out = MoveList::new();
    generate_all(board, false, &mut out);
    out
}

/// All fully legal captures, en-passant captures, and promotions (including
/// non-capturing promotions, since quiescence must not discard them) for the
/// side to move. Used by quiescence search.
pub fn generate_captures(board: &Board) -> MoveList {
    let mut out = MoveList::new();
    generate_all(board, true, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use std::collections::HashSet;

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let board = Board::new();
        assert_eq!(generate_legal(&board).len(), 20);
    }

    #[test]
    fn no_duplicate_moves_in_kiwipete() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let moves = generate_legal(&board);
        let mut seen = HashSet::new();
        for &mv in &moves {
            assert!(seen.insert(mv), "duplicate move emitted: {mv}");
        }
    }

    #[test]
    fn pinned_pawn_cannot_capture_off_the_pin_ray() {
        let board: Board = "4k3/8/8/3q4/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal(&board);
        let e2 = Square::from_file_rank(4, 1);
        let d5 = Square::from_file_rank(3, 4);
        assert!(!moves.iter().any(|m| m.from() == e2 && m.to() == d5));
    }

    #[test]
    fn en_passant_emitted_when_legal() {
        let board: Board = "8/8/8/3Pp3/8/8/8/4K2k w - e6 0 1".parse().unwrap();
        let moves = generate_legal(&board);
        assert!(moves.iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn en_passant_withheld_on_horizontal_discovered_check() {
        let board: Board = "8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1".parse().unwrap();
        let moves = generate_legal(&board);
        assert!(!moves.iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn four_promotion_choices_from_e2() {
        let board: Board = "4k3/8/8/8/8/8/4p3/4K3 b - - 0 1".parse().unwrap();
        let moves = generate_legal(&board);
        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
    }

    #[test]
    fn both_castling_rights_present_and_independently_clearable() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let moves = generate_legal(&board);
        assert!(moves.iter().any(|m| m.is_kingside_castle()));
        assert!(moves.iter().any(|m| m.is_queenside_castle()));

        let board2: Board = "r3k2r/8/8/8/8/8/8/4K2R w Kkq - 0 1".parse().unwrap();
        let moves2 = generate_legal(&board2);
        assert!(moves2.iter().any(|m| m.is_kingside_castle()));
        assert!(!moves2.iter().any(|m| m.is_queenside_castle()));
    }

    #[test]
    fn double_check_emits_only_king_moves() {
        let board: Board = "4k3/8/8/8/8/2b5/8/R3K3 b - - 0 1".parse().unwrap();
        let ksq = board.king_square(Color::Black);
        let checkers = attackers_to(&board, ksq, Color::White, board.occupied());
        if checkers.pop_count() >= 2 {
            let moves = generate_legal(&board);
            assert!(moves.iter().all(|m| m.from() == ksq));
        }
    }
}
