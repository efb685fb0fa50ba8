//! Static evaluation (§4.6): plain material balance, no positional terms.
//! The king is excluded from the sum — its piece value exists only as a
//! very large capture-ordering weight — and the score is returned from the
//! side-to-move's perspective (negated for Black) so search can always
//! maximize.

use crate::board::{Board, Color, Piece};

const MATERIAL_PIECES: [Piece; 5] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
];

fn material_for(board: &Board, color: Color) -> i32 {
    MATERIAL_PIECES
        .iter()
        .map(|&piece| board.pieces(piece, color).count_ones() as i32 * piece.value())
        .sum()
}

/// Material balance from White's perspective: positive favors White.
pub fn material_balance(board: &Board) -> i32 {
    material_for(board, Color::White) - material_for(board, Color::Black)
}

/// Static evaluation from the side-to-move's perspective, as search expects.
pub fn evaluate(board: &Board) -> i32 {
    let balance = material_balance(board);
    match board.side_to_move {
        Color::White => balance,
        Color::Black => -balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn startpos_is_balanced() {
        let board = Board::new();
        assert_eq!(material_balance(&board), 0);
        assert_eq!(evaluate(&board), 0);
    }

    #[test]
    fn missing_black_queen_favors_white() {
        let board: Board = "4k3/8/8/8/8/8/8/R3KQ2 w Q - 0 1".parse().unwrap();
        assert!(material_balance(&board) > 0);
        assert_eq!(evaluate(&board), material_balance(&board));
    }

    #[test]
    fn evaluation_is_negated_for_black_to_move() {
        let board_white: Board = "4k3/8/8/8/8/8/8/R3KQ2 w Q - 0 1".parse().unwrap();
        let board_black: Board = "4k3/8/8/8/8/8/8/R3KQ2 b Q - 0 1".parse().unwrap();
        assert_eq!(evaluate(&board_white), -evaluate(&board_black));
    }

    #[test]
    fn king_value_excluded_from_material_balance() {
        let board: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(material_balance(&board), 0);
    }
}
