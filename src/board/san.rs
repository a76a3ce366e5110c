//! Standard algebraic notation.
//!
//! Writing SAN needs the full legal move list for disambiguation. Reading
//! SAN is done against a [`LegalMoveSet`]: the text is normalized, compared
//! with the generated SAN, and otherwise decomposed into piece, origin hints,
//! destination and promotion and matched structurally.

use std::str::FromStr;

use crate::error::{ChessError, ChessResult};
use crate::types::{
    piece_from_san_letter, promotion_from_char, Board, ChessMove, Piece, Square, ToNotation,
};

use super::movegen::{LegalMoveSet, Move, MoveKind};

/// Render one legal move in SAN.
#[allow(clippy::too_many_arguments)]
pub(crate) fn format(
    board: &Board,
    m: ChessMove,
    piece: Piece,
    kind: MoveKind,
    capture: bool,
    legal: &[ChessMove],
    gives_check: bool,
    mates: bool,
) -> String {
    let mut san = match kind {
        MoveKind::CastleKingside => "O-O".to_string(),
        MoveKind::CastleQueenside => "O-O-O".to_string(),
        _ => {
            let from = m.get_source();
            let mut s = String::with_capacity(8);
            if piece == Piece::Pawn {
                if capture {
                    s.push(file_char(from));
                }
            } else {
                s.push_str(piece.san_letter());
                s.push_str(&disambiguation(board, m, piece, legal));
            }
            if capture {
                s.push('x');
            }
            s.push_str(&m.get_dest().to_string());
            if let Some(promo) = m.get_promotion() {
                s.push('=');
                s.push_str(promo.san_letter());
            }
            s
        }
    };

    if mates {
        san.push('#');
    } else if gives_check {
        san.push('+');
    }
    san
}

/// Origin hint needed when another piece of the same kind can reach the
/// same square: file if unique, else rank, else the full square.
fn disambiguation(board: &Board, m: ChessMove, piece: Piece, legal: &[ChessMove]) -> String {
    let from = m.get_source();
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|o| {
            o.get_dest() == m.get_dest()
                && o.get_source() != from
                && board.piece_on(o.get_source()) == Some(piece)
        })
        .map(|o| o.get_source())
        .collect();

    if rivals.is_empty() || piece == Piece::King {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.get_file() != from.get_file()) {
        return file_char(from).to_string();
    }
    if rivals.iter().all(|sq| sq.get_rank() != from.get_rank()) {
        return rank_char(from).to_string();
    }
    from.to_string()
}

#[inline]
fn file_char(sq: Square) -> char {
    char::from(b'a' + sq.get_file().to_index() as u8)
}

#[inline]
fn rank_char(sq: Square) -> char {
    char::from(b'1' + sq.get_rank().to_index() as u8)
}

/// Strip annotation and check suffixes, normalize zero-castling.
fn normalize(text: &str) -> String {
    let mut s = text.trim().to_string();
    for suffix in ["e.p.", "ep"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.trim_end().to_string();
        }
    }
    let s = s.trim_end_matches(&['+', '#', '!', '?'][..]);
    match s {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        _ => s.to_string(),
    }
}

fn strip_check(san: &str) -> &str {
    san.trim_end_matches(&['+', '#'][..])
}

/// Structured pieces of a SAN string.
#[derive(Debug, PartialEq, Eq)]
struct SanParts {
    piece: Piece,
    from_file: Option<usize>,
    from_rank: Option<usize>,
    capture: bool,
    to: Square,
    promotion: Option<Piece>,
}

fn parse_parts(text: &str) -> Option<SanParts> {
    let mut chars: Vec<char> = text.chars().filter(|c| *c != '-').collect();

    let piece = match chars.first().copied().and_then(piece_from_san_letter) {
        Some(p) => {
            chars.remove(0);
            p
        }
        None => Piece::Pawn,
    };

    // a trailing letter can only be a promotion, since squares end in a digit
    let mut promotion = None;
    if let Some(last) = chars.last().copied() {
        if last.is_ascii_alphabetic() {
            promotion = Some(promotion_from_char(last)?);
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }
    }

    if chars.len() < 2 {
        return None;
    }
    let dest: String = chars[chars.len() - 2..].iter().collect();
    let to = Square::from_str(&dest).ok()?;
    chars.truncate(chars.len() - 2);

    let mut capture = false;
    let mut from_file = None;
    let mut from_rank = None;
    for c in chars {
        match c {
            'x' | 'X' | ':' if !capture => capture = true,
            'a'..='h' if from_file.is_none() && !capture => {
                from_file = Some(c as usize - 'a' as usize);
            }
            '1'..='8' if from_rank.is_none() && !capture => {
                from_rank = Some(c as usize - '1' as usize);
            }
            _ => return None,
        }
    }

    Some(SanParts {
        piece,
        from_file,
        from_rank,
        capture,
        to,
        promotion,
    })
}

/// Find the legal move a SAN string names.
pub(crate) fn resolve<'a>(legal: &'a LegalMoveSet, text: &str) -> ChessResult<&'a Move> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Err(ChessError::Unparseable(text.to_string()));
    }

    if let Some(m) = legal.iter().find(|m| strip_check(&m.san) == cleaned) {
        return Ok(m);
    }

    if cleaned == "O-O" || cleaned == "O-O-O" {
        return Err(ChessError::IllegalMove(text.to_string()));
    }

    let parts = parse_parts(&cleaned).ok_or_else(|| ChessError::Unparseable(text.to_string()))?;

    let shape_matches: Vec<&Move> = legal
        .iter()
        .filter(|m| {
            m.piece == parts.piece
                && m.to == parts.to
                && !m.is_castle()
                && parts.from_file.map_or(true, |f| m.from.get_file().to_index() == f)
                && parts.from_rank.map_or(true, |r| m.from.get_rank().to_index() == r)
                && (!parts.capture || m.is_capture())
        })
        .collect();

    let exact: Vec<&Move> = shape_matches
        .iter()
        .copied()
        .filter(|m| m.promotion == parts.promotion)
        .collect();

    match exact.as_slice() {
        [m] => Ok(*m),
        [] if parts.promotion.is_none() && shape_matches.iter().any(|m| m.is_promotion()) => {
            Err(ChessError::PromotionRequired(text.to_string()))
        }
        [] => Err(ChessError::IllegalMove(text.to_string())),
        _ => Err(ChessError::AmbiguousMove(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    fn sans(fen: &str) -> Vec<String> {
        Position::from_fen(fen)
            .unwrap()
            .legal_moves()
            .iter()
            .map(|m| m.san.clone())
            .collect()
    }

    #[test]
    fn test_file_disambiguation() {
        // knights on b1 and f1 can both reach d2
        let moves = sans("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert!(moves.contains(&"Nbd2".to_string()));
        assert!(moves.contains(&"Nfd2".to_string()));
    }

    #[test]
    fn test_rank_disambiguation() {
        // rooks on a1 and a5 share a file
        let moves = sans("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert!(moves.contains(&"R1a3".to_string()));
        assert!(moves.contains(&"R5a3".to_string()));
    }

    #[test]
    fn test_check_and_mate_suffixes() {
        let moves = sans("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        assert!(moves.contains(&"Ra8#".to_string()));
        let moves = sans("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert!(moves.contains(&"Ra8+".to_string()));
    }

    #[test]
    fn test_promotion_san() {
        let moves = sans("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        assert!(moves.contains(&"a8=Q".to_string()));
        assert!(moves.contains(&"a8=N".to_string()));
    }

    #[test]
    fn test_resolve_variants() {
        let pos = Position::new();
        let legal = pos.legal_moves();
        assert_eq!(resolve(&legal, "Nf3").unwrap().uci(), "g1f3");
        assert_eq!(resolve(&legal, " Ng1f3 ").unwrap().uci(), "g1f3");
        assert_eq!(resolve(&legal, "Ng1-f3").unwrap().uci(), "g1f3");
        assert_eq!(resolve(&legal, "e4!?").unwrap().uci(), "e2e4");
        assert_eq!(resolve(&legal, "e2e4").unwrap().uci(), "e2e4");
    }

    #[test]
    fn test_resolve_rejections() {
        let pos = Position::new();
        let legal = pos.legal_moves();
        assert!(matches!(resolve(&legal, ""), Err(ChessError::Unparseable(_))));
        assert!(matches!(resolve(&legal, "hello"), Err(ChessError::Unparseable(_))));
        assert!(matches!(resolve(&legal, "Nf3€"), Err(ChessError::Unparseable(_))));
        assert!(matches!(resolve(&legal, "e5"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(resolve(&legal, "O-O"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(resolve(&legal, "Nxf3"), Err(ChessError::IllegalMove(_))));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        let legal = pos.legal_moves();
        assert!(matches!(resolve(&legal, "Nd2"), Err(ChessError::AmbiguousMove(_))));
        assert_eq!(resolve(&legal, "Nbd2").unwrap().from, Square::B1);
    }

    #[test]
    fn test_resolve_promotion() {
        let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let legal = pos.legal_moves();
        assert_eq!(resolve(&legal, "a8=Q").unwrap().promotion, Some(Piece::Queen));
        assert_eq!(resolve(&legal, "a8n").unwrap().promotion, Some(Piece::Knight));
        assert!(matches!(resolve(&legal, "a8"), Err(ChessError::PromotionRequired(_))));
        assert!(matches!(resolve(&legal, "a8=K"), Err(ChessError::Unparseable(_))));
    }

    #[test]
    fn test_zero_castling() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let legal = pos.legal_moves();
        assert_eq!(resolve(&legal, "0-0").unwrap().kind, MoveKind::CastleKingside);
    }
}
