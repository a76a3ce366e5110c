//! Immutable position value.
//!
//! `chess::Board` holds placement, side to move, castling rights and the
//! en-passant state; the move clocks are tracked here because the rules
//! backend does not keep them. Applying a move always yields a new
//! `Position`, so snapshots handed to other components stay valid.

use std::fmt;
use std::str::FromStr;

use crate::error::{ChessError, ChessResult};
use crate::types::{
    fen_char, piece_from_fen_char, Board, CastleRights, ChessMove, Color, File, Piece, Rank,
    Square,
};

use super::movegen::{self, LegalMoveSet};
use super::Move;

/// FEN of the standard initial position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess position: board, side to move, rights and move clocks.
#[derive(Clone, Copy)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    /// Standard initial position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a FEN string. The two clock fields are optional (`0 1`).
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(ChessError::invalid_fen(fen, "expected 4 to 6 fields"));
        }

        validate_placement(fen, fields[0])?;

        if fields[1] != "w" && fields[1] != "b" {
            return Err(ChessError::invalid_fen(fen, "side to move must be 'w' or 'b'"));
        }

        let castling = fields[2];
        if castling != "-" {
            let mut seen = String::new();
            for c in castling.chars() {
                if !"KQkq".contains(c) || seen.contains(c) {
                    return Err(ChessError::invalid_fen(fen, "bad castling field"));
                }
                seen.push(c);
            }
        }

        let ep = fields[3];
        if ep != "-" {
            let sq = Square::from_str(ep)
                .map_err(|_| ChessError::invalid_fen(fen, "bad en-passant square"))?;
            let expected_rank = if fields[1] == "w" { Rank::Sixth } else { Rank::Third };
            if sq.get_rank() != expected_rank {
                return Err(ChessError::invalid_fen(fen, "en-passant square on wrong rank"));
            }
        }

        let halfmove_clock = match fields.get(4) {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| ChessError::invalid_fen(fen, "bad half-move clock"))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(s) => s
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| ChessError::invalid_fen(fen, "bad full-move number"))?,
            None => 1,
        };

        let core = format!("{} {} {} {} 0 1", fields[0], fields[1], fields[2], fields[3]);
        let board = Board::from_str(&core)
            .map_err(|_| ChessError::invalid_fen(fen, "position is not legal"))?;

        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Serialize as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {}",
            self.repetition_key(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// The first four FEN fields. Two positions with the same key are
    /// the same position for repetition purposes.
    pub fn repetition_key(&self) -> String {
        let side = match self.turn() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .en_passant_target()
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{} {} {} {}", self.placement(), side, self.castling_field(), ep)
    }

    /// Piece placement field (rank 8 first).
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
                match self.piece_at(sq) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(fen_char(piece, color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    fn castling_field(&self) -> String {
        let mut s = String::new();
        let white = self.board.castle_rights(Color::White);
        let black = self.board.castle_rights(Color::Black);
        if white.has_kingside() {
            s.push('K');
        }
        if white.has_queenside() {
            s.push('Q');
        }
        if black.has_kingside() {
            s.push('k');
        }
        if black.has_queenside() {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// Castling rights of one side.
    pub fn castle_rights(&self, color: Color) -> CastleRights {
        self.board.castle_rights(color)
    }

    /// Square a pawn could capture onto en passant, if any.
    pub fn en_passant_target(&self) -> Option<Square> {
        // The backend stores the square of the pawn that just advanced two;
        // FEN wants the square it skipped.
        let pawn = self.board.en_passant()?;
        let rank = match self.turn() {
            Color::White => Rank::Sixth,
            Color::Black => Rank::Third,
        };
        Some(Square::make_square(rank, pawn.get_file()))
    }

    /// The rules backend board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move. White is the first mover.
    #[inline]
    pub fn turn(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Piece and colour on a square.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    /// All fully legal moves in board-scan order.
    pub fn legal_moves(&self) -> LegalMoveSet {
        movegen::generate(self, None)
    }

    /// Legal moves starting on `from`, same ordering as [`Position::legal_moves`].
    pub fn legal_moves_from(&self, from: Square) -> LegalMoveSet {
        movegen::generate(self, Some(from))
    }

    /// Apply the move identified by origin, destination and promotion.
    ///
    /// The triple must match exactly one legal move. A pawn reaching the
    /// last rank without a promotion piece is rejected with
    /// [`ChessError::PromotionRequired`]; nothing defaults to a queen.
    pub fn apply_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> ChessResult<(Position, Move)> {
        let label = describe_request(from, to, promotion);

        if matches!(promotion, Some(Piece::King) | Some(Piece::Pawn)) {
            return Err(ChessError::IllegalMove(label));
        }

        let candidates = self.legal_moves_from(from);
        let mut to_dest = candidates.iter().filter(|m| m.to == to).peekable();
        if to_dest.peek().is_none() {
            return Err(ChessError::IllegalMove(label));
        }

        let mut matched: Option<&Move> = None;
        let mut needs_promotion = false;
        for m in to_dest {
            if m.promotion.is_some() && promotion.is_none() {
                needs_promotion = true;
            }
            if m.promotion == promotion {
                if matched.is_some() {
                    return Err(ChessError::AmbiguousMove(label));
                }
                matched = Some(m);
            }
        }

        match matched {
            Some(m) => Ok((self.play(m.chess_move()), m.clone())),
            None if needs_promotion => Err(ChessError::PromotionRequired(label)),
            None => Err(ChessError::IllegalMove(label)),
        }
    }

    /// Apply a move written in SAN. Malformed or ambiguous text is rejected.
    pub fn apply_san(&self, san: &str) -> ChessResult<(Position, Move)> {
        let legal = self.legal_moves();
        let m = super::san::resolve(&legal, san)?;
        Ok((self.play(m.chess_move()), m.clone()))
    }

    /// Apply a move in coordinate notation (`e2e4`, `e7e8q`).
    pub fn apply_uci(&self, text: &str) -> ChessResult<(Position, Move)> {
        let (from, to, promotion) = parse_coord(text)?;
        self.apply_move(from, to, promotion)
    }

    /// Make a move already known to be legal.
    pub(crate) fn play(&self, m: ChessMove) -> Position {
        let moving = self.board.piece_on(m.get_source());
        let capture = self.board.piece_on(m.get_dest()).is_some()
            || (moving == Some(Piece::Pawn)
                && m.get_source().get_file() != m.get_dest().get_file());

        let halfmove_clock = if capture || moving == Some(Piece::Pawn) {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        let fullmove_number = match self.turn() {
            Color::White => self.fullmove_number,
            Color::Black => self.fullmove_number.saturating_add(1),
        };

        Position {
            board: self.board.make_move_new(m),
            halfmove_clock,
            fullmove_number,
        }
    }
}

/// Parse coordinate notation into origin, destination and promotion.
pub fn parse_coord(text: &str) -> ChessResult<(Square, Square, Option<Piece>)> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.len() != 4 && chars.len() != 5 {
        return Err(ChessError::Unparseable(text.to_string()));
    }
    let square = |a: char, b: char| -> ChessResult<Square> {
        let s: String = [a.to_ascii_lowercase(), b].iter().collect();
        Square::from_str(&s).map_err(|_| ChessError::Unparseable(text.to_string()))
    };
    let from = square(chars[0], chars[1])?;
    let to = square(chars[2], chars[3])?;
    let promotion = match chars.get(4) {
        Some(c) => Some(
            crate::types::promotion_from_char(*c)
                .ok_or_else(|| ChessError::Unparseable(text.to_string()))?,
        ),
        None => None,
    };
    Ok((from, to, promotion))
}

fn describe_request(from: Square, to: Square, promotion: Option<Piece>) -> String {
    use crate::types::ToNotation;
    match promotion {
        Some(p) => format!("{}{}{}", from, to, p.coord_char()),
        None => format!("{}{}", from, to),
    }
}

/// Structural check of the placement field; also enforces one king per side.
fn validate_placement(fen: &str, placement: &str) -> ChessResult<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::invalid_fen(fen, "placement must have 8 ranks"));
    }

    let mut kings = [0u32; 2];
    for rank in ranks {
        let mut width = 0u32;
        for c in rank.chars() {
            if let Some(d) = c.to_digit(10) {
                if d == 0 || d > 8 {
                    return Err(ChessError::invalid_fen(fen, "bad empty-square count"));
                }
                width += d;
            } else if let Some((piece, color)) = piece_from_fen_char(c) {
                if piece == Piece::King {
                    kings[color.to_index()] += 1;
                }
                width += 1;
            } else {
                return Err(ChessError::invalid_fen(fen, format!("unknown piece {c:?}")));
            }
        }
        if width != 8 {
            return Err(ChessError::invalid_fen(fen, "rank does not have 8 squares"));
        }
    }

    if kings != [1, 1] {
        return Err(ChessError::invalid_fen(fen, "each side needs exactly one king"));
    }
    Ok(())
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board.get_hash() == other.board.get_hash() && self.to_fen() == other.to_fen()
    }
}

impl Eq for Position {}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_fen_roundtrip() {
        let pos = Position::new();
        assert_eq!(pos.to_fen(), START_FEN);
        assert_eq!(Position::from_fen(START_FEN).unwrap(), pos);
    }

    #[test]
    fn test_clocks_default_when_missing() {
        let pos = Position::from_fen("8/8/8/4k3/8/8/8/4K3 w - -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn test_rejects_malformed_fen() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("9/8/8/4k3/8/8/8/4K3 w - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/4k3/8/8/8/4K3 x - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/4k3/8/8/8/4K3 w - - zero 1").is_err());
        assert!(Position::from_fen("8/8/8/4kk2/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn test_clock_updates() {
        let pos = Position::new();
        let (pos, _) = pos.apply_uci("g1f3").unwrap();
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 1);
        let (pos, _) = pos.apply_uci("e7e5").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 2);
    }

    #[test]
    fn test_clocks_saturate_at_limit() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 4294967295").unwrap();
        let (pos, _) = pos.apply_uci("e8d8").unwrap();
        assert_eq!(pos.fullmove_number(), u32::MAX);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 4294967295 1").unwrap();
        let (pos, _) = pos.apply_uci("e1d1").unwrap();
        assert_eq!(pos.halfmove_clock(), u32::MAX);
        assert!(pos.is_draw());
    }

    #[test]
    fn test_en_passant_target_in_fen() {
        let pos = Position::from_fen("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
        let (pos, _) = pos.apply_uci("e2e4").unwrap();
        assert_eq!(pos.en_passant_target(), Some(Square::E3));
        assert_eq!(pos.to_fen(), "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");
        let reloaded = Position::from_fen(&pos.to_fen()).unwrap();
        assert_eq!(reloaded, pos);
    }

    #[test]
    fn test_apply_is_copy_on_write() {
        let before = Position::new();
        let snapshot = before;
        let (after, _) = before.apply_uci("e2e4").unwrap();
        assert_eq!(before, snapshot);
        assert_ne!(after, before);
        assert_eq!(after.turn(), Color::Black);
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!(
            parse_coord("e7e8q").unwrap(),
            (Square::E7, Square::E8, Some(Piece::Queen))
        );
        assert!(parse_coord("e7e8k").is_err());
        assert!(parse_coord("e9e8").is_err());
        assert!(parse_coord("é7e8").is_err());
    }
}
