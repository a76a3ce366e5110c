//! Conversions between `chess` crate types and their textual notation.
//!
//! SAN uses uppercase piece letters, coordinate notation uses lowercase
//! promotion letters, FEN uses case for colour. These helpers keep the three
//! consistent.

use chess::{Color as ChessColor, Piece as ChessPiece, Square as ChessSquare};

/// Trait for rendering chess crate types as notation characters.
pub trait ToNotation {
    /// Uppercase SAN letter (empty for pawns where SAN omits it).
    fn san_letter(self) -> &'static str;
    /// Lowercase coordinate-notation letter.
    fn coord_char(self) -> char;
}

impl ToNotation for ChessPiece {
    #[inline]
    fn san_letter(self) -> &'static str {
        match self {
            ChessPiece::Pawn => "",
            ChessPiece::Knight => "N",
            ChessPiece::Bishop => "B",
            ChessPiece::Rook => "R",
            ChessPiece::Queen => "Q",
            ChessPiece::King => "K",
        }
    }

    #[inline]
    fn coord_char(self) -> char {
        match self {
            ChessPiece::Pawn => 'p',
            ChessPiece::Knight => 'n',
            ChessPiece::Bishop => 'b',
            ChessPiece::Rook => 'r',
            ChessPiece::Queen => 'q',
            ChessPiece::King => 'k',
        }
    }
}

/// FEN character for a coloured piece.
#[inline]
pub fn fen_char(piece: ChessPiece, color: ChessColor) -> char {
    let c = piece.coord_char();
    match color {
        ChessColor::White => c.to_ascii_uppercase(),
        ChessColor::Black => c,
    }
}

/// Parse a FEN piece character into piece and colour.
pub fn piece_from_fen_char(c: char) -> Option<(ChessPiece, ChessColor)> {
    let color = if c.is_ascii_uppercase() {
        ChessColor::White
    } else {
        ChessColor::Black
    };
    let piece = match c.to_ascii_lowercase() {
        'p' => ChessPiece::Pawn,
        'n' => ChessPiece::Knight,
        'b' => ChessPiece::Bishop,
        'r' => ChessPiece::Rook,
        'q' => ChessPiece::Queen,
        'k' => ChessPiece::King,
        _ => return None,
    };
    Some((piece, color))
}

/// Parse a promotion letter (either case). Only the four promotable kinds.
#[inline]
pub fn promotion_from_char(c: char) -> Option<ChessPiece> {
    match c.to_ascii_lowercase() {
        'q' => Some(ChessPiece::Queen),
        'r' => Some(ChessPiece::Rook),
        'b' => Some(ChessPiece::Bishop),
        'n' => Some(ChessPiece::Knight),
        _ => None,
    }
}

/// Parse a SAN piece letter (uppercase only, `K` included).
#[inline]
pub fn piece_from_san_letter(c: char) -> Option<ChessPiece> {
    match c {
        'N' => Some(ChessPiece::Knight),
        'B' => Some(ChessPiece::Bishop),
        'R' => Some(ChessPiece::Rook),
        'Q' => Some(ChessPiece::Queen),
        'K' => Some(ChessPiece::King),
        _ => None,
    }
}

/// Light squares have odd file+rank parity with a1 dark.
#[inline]
pub fn is_light_square(sq: ChessSquare) -> bool {
    (sq.get_file().to_index() + sq.get_rank().to_index()) % 2 == 1
}
