//! Position evaluation.
//!
//! Material balance on the 1/3/3/5/9 scale plus cheap signals (mobility,
//! check, game phase). Everything here is a pure function of a [`Position`].

mod analysis;

pub use analysis::{analyze, Analysis};

use serde::Serialize;

use crate::board::Position;
use crate::types::{color_sign, fen_char, piece_value, Color, Piece, Value};

/// Rough stage of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

/// Material verdict from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    Winning,
    Advantage,
    Equal,
    Disadvantage,
    Losing,
}

impl PositionType {
    /// Classify a material balance already oriented to the side of interest.
    pub fn from_balance(balance: Value) -> Self {
        match balance {
            b if b >= 5 => PositionType::Winning,
            b if b >= 2 => PositionType::Advantage,
            b if b <= -5 => PositionType::Losing,
            b if b <= -2 => PositionType::Disadvantage,
            _ => PositionType::Equal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionType::Winning => "winning",
            PositionType::Advantage => "advantage",
            PositionType::Equal => "equal",
            PositionType::Disadvantage => "disadvantage",
            PositionType::Losing => "losing",
        }
    }
}

/// Signals computed for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// White material minus Black material.
    pub material_balance: Value,
    /// Number of legal moves for the side to move.
    pub mobility: usize,
    pub in_check: bool,
    pub phase: Phase,
}

impl Evaluation {
    /// Material balance seen from `side` (positive = `side` is ahead).
    #[inline]
    pub fn balance_for(&self, side: Color) -> Value {
        self.material_balance * color_sign(side)
    }

    pub fn position_type_for(&self, side: Color) -> PositionType {
        PositionType::from_balance(self.balance_for(side))
    }
}

/// Evaluate the position.
pub fn evaluate(position: &Position) -> Evaluation {
    Evaluation {
        material_balance: material_balance(position),
        mobility: position.legal_moves().len(),
        in_check: position.is_check(),
        phase: phase(position),
    }
}

/// Simple material evaluation (white's perspective)
pub fn material_balance(position: &Position) -> Value {
    let board = position.board();
    let mut score: Value = 0;

    for piece in &[Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        let count = |color: Color| (*board.pieces(*piece) & *board.color_combined(color)).popcnt();
        let diff = count(Color::White) as Value - count(Color::Black) as Value;
        score += piece_value(*piece) * diff;
    }

    score
}

/// Endgame once the queens are gone and at most eight minor/major pieces
/// remain; opening for the first ten moves otherwise.
pub fn phase(position: &Position) -> Phase {
    let board = position.board();
    let queens = board.pieces(Piece::Queen).popcnt();
    let officers = (*board.pieces(Piece::Knight)
        | *board.pieces(Piece::Bishop)
        | *board.pieces(Piece::Rook))
        .popcnt();

    if queens == 0 && officers <= 8 {
        Phase::Endgame
    } else if position.fullmove_number() <= 10 {
        Phase::Opening
    } else {
        Phase::Middlegame
    }
}

/// Pieces each side has taken, relative to the standard initial set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedPieces {
    /// Black pieces captured by White (FEN letters, lowercase).
    pub white: Vec<char>,
    /// White pieces captured by Black (FEN letters, uppercase).
    pub black: Vec<char>,
}

const INITIAL_COUNTS: [(Piece, u32); 5] = [
    (Piece::Pawn, 8),
    (Piece::Knight, 2),
    (Piece::Bishop, 2),
    (Piece::Rook, 2),
    (Piece::Queen, 1),
];

pub fn captured_pieces(position: &Position) -> CapturedPieces {
    let board = position.board();
    let mut captured = CapturedPieces::default();

    for (piece, initial) in INITIAL_COUNTS {
        let on_board =
            |color: Color| (*board.pieces(piece) & *board.color_combined(color)).popcnt();
        let white_lost = initial.saturating_sub(on_board(Color::White));
        let black_lost = initial.saturating_sub(on_board(Color::Black));
        captured
            .white
            .extend(std::iter::repeat(fen_char(piece, Color::Black)).take(black_lost as usize));
        captured
            .black
            .extend(std::iter::repeat(fen_char(piece, Color::White)).take(white_lost as usize));
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position() {
        let eval = evaluate(&Position::new());
        assert_eq!(eval.material_balance, 0);
        assert_eq!(eval.mobility, 20);
        assert!(!eval.in_check);
        assert_eq!(eval.phase, Phase::Opening);
    }

    #[test]
    fn test_material_sign() {
        // white is a rook up
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        let eval = evaluate(&pos);
        assert_eq!(eval.material_balance, 5);
        assert_eq!(eval.balance_for(Color::Black), -5);
        assert_eq!(eval.position_type_for(Color::Black), PositionType::Losing);
        assert_eq!(eval.position_type_for(Color::White), PositionType::Winning);
        assert_eq!(eval.phase, Phase::Endgame);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(evaluate(&pos), evaluate(&pos));
        assert_eq!(evaluate(&pos).mobility, 48);
    }

    #[test]
    fn test_position_type_thresholds() {
        assert_eq!(PositionType::from_balance(2), PositionType::Advantage);
        assert_eq!(PositionType::from_balance(1), PositionType::Equal);
        assert_eq!(PositionType::from_balance(-2), PositionType::Disadvantage);
        assert_eq!(PositionType::from_balance(-4), PositionType::Disadvantage);
    }

    #[test]
    fn test_captured_pieces() {
        let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/8/8/8/PPPP1PPP/RNB1KBNR w KQkq - 0 1")
            .unwrap();
        let captured = captured_pieces(&pos);
        assert_eq!(captured.white, vec!['p', 'q']);
        assert_eq!(captured.black, vec!['P', 'Q']);
    }
}
