//! Core types shared by the board, evaluator, heuristic and arbiter.
//!
//! The `chess` crate is the rules backend: its board and square types are
//! re-exported here so the rest of the crate has one source of truth.
//! Engine-specific types (material values, heuristic scores, notation
//! conversions) live alongside them.

mod score;
mod convert;

pub use score::{Score, CONFIDENCE_MAX};
pub use convert::{
    fen_char, is_light_square, piece_from_fen_char, piece_from_san_letter, promotion_from_char,
    ToNotation,
};

pub use chess::{
    Board,
    ChessMove,
    Square,
    Piece,
    Color,
    File,
    Rank,
    CastleRights,
    MoveGen,
    BoardStatus,
    EMPTY,
};

/// Material value in whole pawns.
pub type Value = i32;

pub const PAWN_VALUE: Value = 1;
pub const KNIGHT_VALUE: Value = 3;
pub const BISHOP_VALUE: Value = 3;
pub const ROOK_VALUE: Value = 5;
pub const QUEEN_VALUE: Value = 9;
pub const KING_VALUE: Value = 0;

/// Get the material value of a piece in pawns
#[inline]
pub const fn piece_value(piece: Piece) -> Value {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

/// +1 for the first mover (White), -1 for Black.
#[inline]
pub const fn color_sign(color: Color) -> Value {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Pieces a pawn may promote to, in the order moves are listed.
pub const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Squares rewarded as central by the scoring heuristic.
pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// Lowercase side name, as used in payloads and the console.
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_scale() {
        assert_eq!(piece_value(Piece::Queen), 9);
        assert_eq!(piece_value(Piece::King), 0);
        assert_eq!(piece_value(Piece::Knight), piece_value(Piece::Bishop));
    }

    #[test]
    fn test_color_sign() {
        assert_eq!(color_sign(Color::White) * PAWN_VALUE, 1);
        assert_eq!(color_sign(Color::Black) * ROOK_VALUE, -5);
    }
}
