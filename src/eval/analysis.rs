//! Human-readable position analysis.
//!
//! Produces the short lists of factors, threats and opportunities that are
//! shown next to the board and offered to decision sources as context.

use serde::Serialize;

use crate::board::{Position, FIFTY_MOVE_PLIES};
use crate::types::{color_name, Color, Piece};

use super::{captured_pieces, evaluate, Evaluation, PositionType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub evaluation: Evaluation,
    /// Verdict for the side to move.
    pub position_type: PositionType,
    pub key_factors: Vec<String>,
    pub threats: Vec<String>,
    pub opportunities: Vec<String>,
}

pub fn analyze(position: &Position) -> Analysis {
    let evaluation = evaluate(position);
    let side = position.turn();
    let balance = evaluation.balance_for(side);

    let mut key_factors = Vec::new();
    let mut threats = Vec::new();
    let mut opportunities = Vec::new();

    key_factors.push(format!("{} to move", capitalized(side)));

    let white_rights = position.castle_rights(Color::White);
    let black_rights = position.castle_rights(Color::Black);
    let white_can = white_rights.has_kingside() || white_rights.has_queenside();
    let black_can = black_rights.has_kingside() || black_rights.has_queenside();
    if white_can {
        opportunities.push("White can castle".to_string());
    }
    if black_can {
        opportunities.push("Black can castle".to_string());
    }
    if !white_can && !black_can {
        key_factors.push("No castling rights remaining".to_string());
    }

    if let Some(sq) = position.en_passant_target() {
        opportunities.push(format!("En passant target on {}", sq));
    }

    let clock = position.halfmove_clock();
    if clock >= FIFTY_MOVE_PLIES * 4 / 5 {
        key_factors.push("Approaching 50-move rule (draw risk)".to_string());
    } else if clock >= FIFTY_MOVE_PLIES * 2 / 5 {
        key_factors.push("Half-move clock rising".to_string());
    }

    let board = position.board();
    if board.pieces(Piece::Queen).popcnt() == 0 && evaluation.phase == super::Phase::Endgame {
        key_factors.push("Endgame features (few majors/minors, no queens)".to_string());
    }

    if balance > 3 {
        key_factors.push("Significant material advantage".to_string());
        opportunities.push("Convert material into winning endgame".to_string());
    } else if balance < -3 {
        key_factors.push("Material deficit, need counterplay".to_string());
        threats.push("Risk of losing due to material disadvantage".to_string());
    }

    if evaluation.in_check {
        threats.push("King under immediate attack".to_string());
        key_factors.push("Must respond to check".to_string());
    }

    if evaluation.mobility < 10 {
        threats.push("Limited piece mobility".to_string());
    } else if evaluation.mobility > 30 {
        opportunities.push("Excellent piece activity".to_string());
    }

    let captured = captured_pieces(position);
    if captured.white.len() + captured.black.len() > 6 {
        key_factors.push("Complex tactical position with many captures".to_string());
    }

    Analysis {
        evaluation,
        position_type: PositionType::from_balance(balance),
        key_factors,
        threats,
        opportunities,
    }
}

fn capitalized(side: Color) -> &'static str {
    match color_name(side) {
        "white" => "White",
        _ => "Black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_analysis() {
        let a = analyze(&Position::new());
        assert_eq!(a.position_type, PositionType::Equal);
        assert_eq!(a.key_factors[0], "White to move");
        assert!(a.opportunities.contains(&"White can castle".to_string()));
        assert!(a.threats.is_empty());
    }

    #[test]
    fn test_check_and_deficit() {
        // black to move, in check, a rook down
        let a = analyze(&Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 60 40").unwrap());
        assert_eq!(a.position_type, PositionType::Losing);
        assert!(a.threats.contains(&"King under immediate attack".to_string()));
        assert!(a.threats.contains(&"Limited piece mobility".to_string()));
        assert!(a.key_factors.contains(&"No castling rights remaining".to_string()));
        assert!(a.key_factors.contains(&"Half-move clock rising".to_string()));
    }
}
