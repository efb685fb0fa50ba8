//! FEN parsing/serialization: a pure string <-> Board converter. Not part of
//! the engine core proper (§1 scope), kept here because `Board` needs a way
//! to construct itself from the standard notation.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::error::EngineError;
use crate::square::Square;

impl Board {
    pub fn set_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let fen = fen.trim();
        let mut fields = fen.split_whitespace();

        let placement = fields
            .next()
            .ok_or_else(|| EngineError::MalformedFen(fen.to_string()))?;
        let side = fields.next().unwrap_or("w");
        let castling = fields.next().unwrap_or("-");
        let ep = fields.next().unwrap_or("-");
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(EngineError::MalformedFen(fen.to_string()));
        }

        *self = Board::new_empty();

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as u8;
                } else {
                    let (piece, color) = CHAR_TO_PC[ch as usize]
                        .ok_or_else(|| EngineError::MalformedFen(fen.to_string()))?;
                    if file >= 8 {
                        return Err(EngineError::MalformedFen(fen.to_string()));
                    }
                    let sq = Square::from_file_rank(file, rank);
                    let bb = self.bb(color, piece) | sq.bit();
                    self.set_bb(color, piece, bb);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(EngineError::MalformedFen(fen.to_string()));
            }
        }

        self.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(EngineError::MalformedFen(fen.to_string())),
        };

        self.castling_rights = 0;
        if castling != "-" {
            for ch in castling.chars() {
                self.castling_rights |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(EngineError::MalformedFen(fen.to_string())),
                };
            }
        }

        self.en_passant = if ep == "-" {
            None
        } else {
            Some(
                ep.parse::<Square>()
                    .map_err(|_| EngineError::MalformedFen(fen.to_string()))?,
            )
        };

        self.halfmove_clock = halfmove.parse().unwrap_or(0);
        self.fullmove_number = fullmove.parse().unwrap_or(1);
        self.history.clear();
        self.refresh_zobrist();

        self.validate().map_err(EngineError::MalformedFen)?;

        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank_from_top in 0..8u8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    None => empty_run += 1,
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        placement.push(PC_TO_CHAR[idx]);
                    }
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_starting_position() {
        let board = Board::new();
        let fen = board.to_fen();
        assert_eq!(
            fen,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        let parsed: Board = fen.parse().unwrap();
        assert_eq!(parsed.zobrist, board.zobrist);
        assert_eq!(parsed.piece_bb, board.piece_bb);
    }

    #[test]
    fn round_trips_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn rejects_bad_piece_letter() {
        let fen = "rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(fen.parse::<Board>().is_err());
    }

    #[test]
    fn rejects_wrong_rank_count() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1";
        assert!(fen.parse::<Board>().is_err());
    }

    #[test]
    fn parses_en_passant_square() {
        let fen = "8/8/8/3Pp3/8/8/8/4K2k w - e6 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.en_passant.unwrap().to_string(), "e6");
    }
}
