//! Legal move generation in a stable order.
//!
//! The rules backend generates moves grouped by piece type. Callers refer to
//! moves by index, so the set is re-sorted into board-scan order: origin
//! squares from a8 to h1 (rank 8 first, files a to h), then destination in
//! the same order, then promotion piece (queen, rook, bishop, knight).

use std::ops::Index;

use serde::Serialize;

use crate::types::{
    BoardStatus, ChessMove, MoveGen, Piece, Square, ToNotation, EMPTY, PROMOTION_PIECES,
};

use super::position::Position;
use super::san;

/// What kind of move this is, beyond origin and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

/// A legal move, described relative to the position it was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
    pub gives_check: bool,
    pub san: String,
}

impl Move {
    /// Coordinate notation: origin, destination, optional promotion letter.
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.coord_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }

    /// The backend move this describes.
    #[inline]
    pub fn chess_move(&self) -> ChessMove {
        ChessMove::new(self.from, self.to, self.promotion)
    }
}

/// Ordered legal moves of one position. Indices are only valid for that
/// position; the generating FEN is kept so callers can check.
#[derive(Debug, Clone)]
pub struct LegalMoveSet {
    fen: String,
    moves: Vec<Move>,
}

impl LegalMoveSet {
    /// FEN of the position these moves belong to.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    /// Look up by a signed index as it arrives from outside; negative or
    /// out-of-range indices give `None`.
    pub fn get_signed(&self, index: i64) -> Option<&Move> {
        usize::try_from(index).ok().and_then(|i| self.moves.get(i))
    }

    /// Find a move by coordinate notation (case-insensitive, trimmed).
    pub fn find_coord(&self, coord: &str) -> Option<(usize, &Move)> {
        let wanted = coord.trim().to_ascii_lowercase();
        self.moves
            .iter()
            .enumerate()
            .find(|(_, m)| m.uci() == wanted)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }
}

impl Index<usize> for LegalMoveSet {
    type Output = Move;

    fn index(&self, index: usize) -> &Move {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a LegalMoveSet {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Scan index of a square: a8 = 0, h8 = 7, a7 = 8, ..., h1 = 63.
#[inline]
pub fn scan_index(sq: Square) -> usize {
    (7 - sq.get_rank().to_index()) * 8 + sq.get_file().to_index()
}

#[inline]
fn promotion_rank(p: Option<Piece>) -> usize {
    match p {
        None => 0,
        Some(piece) => 1 + PROMOTION_PIECES
            .iter()
            .position(|q| *q == piece)
            .unwrap_or(PROMOTION_PIECES.len()),
    }
}

#[inline]
fn order_key(m: &ChessMove) -> (usize, usize, usize) {
    (
        scan_index(m.get_source()),
        scan_index(m.get_dest()),
        promotion_rank(m.get_promotion()),
    )
}

pub(crate) fn generate(position: &Position, from: Option<Square>) -> LegalMoveSet {
    let board = position.board();
    let mut all: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    all.sort_by_key(order_key);

    let moves = all
        .iter()
        .filter(|m| from.map_or(true, |sq| m.get_source() == sq))
        .filter_map(|m| describe(position, *m, &all))
        .collect();

    LegalMoveSet {
        fen: position.to_fen(),
        moves,
    }
}

/// Build the full description (kind, capture, SAN) of a legal backend move.
fn describe(position: &Position, m: ChessMove, legal: &[ChessMove]) -> Option<Move> {
    let board = position.board();
    let from = m.get_source();
    let to = m.get_dest();
    let piece = board.piece_on(from)?;

    let file_delta = to.get_file().to_index() as i32 - from.get_file().to_index() as i32;
    let rank_delta = to.get_rank().to_index() as i32 - from.get_rank().to_index() as i32;

    let mut captured = board.piece_on(to);
    let kind = match piece {
        Piece::King if file_delta == 2 => MoveKind::CastleKingside,
        Piece::King if file_delta == -2 => MoveKind::CastleQueenside,
        Piece::Pawn if file_delta != 0 && captured.is_none() => {
            captured = Some(Piece::Pawn);
            MoveKind::EnPassant
        }
        Piece::Pawn if rank_delta.abs() == 2 => MoveKind::DoublePush,
        _ => MoveKind::Normal,
    };

    let after = board.make_move_new(m);
    let gives_check = *after.checkers() != EMPTY;
    let mates = after.status() == BoardStatus::Checkmate;

    let san = san::format(board, m, piece, kind, captured.is_some(), legal, gives_check, mates);

    Some(Move {
        from,
        to,
        promotion: m.get_promotion(),
        piece,
        captured,
        kind,
        gives_check,
        san,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perft(position: &Position, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = position.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|m| {
                let (next, _) = position.apply_move(m.from, m.to, m.promotion).unwrap();
                perft(&next, depth - 1)
            })
            .sum()
    }

    #[test]
    fn test_start_position_has_twenty_moves() {
        let moves = Position::new().legal_moves();
        assert_eq!(moves.len(), 20);
        // rank 2 pawns come first, then the knights on rank 1
        assert_eq!(moves[0].uci(), "a2a4");
        assert_eq!(moves[1].uci(), "a2a3");
        assert_eq!(moves[16].san, "Na3");
        assert_eq!(moves[18].san, "Nf3");
        assert_eq!(moves[19].uci(), "g1h3");
    }

    #[test]
    fn test_perft_start() {
        let pos = Position::new();
        assert_eq!(perft(&pos, 1), 20);
        assert_eq!(perft(&pos, 2), 400);
        assert_eq!(perft(&pos, 3), 8902);
    }

    #[test]
    fn test_perft_kiwipete() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&pos, 1), 48);
        assert_eq!(perft(&pos, 2), 2039);
    }

    #[test]
    fn test_apply_accepts_exactly_the_legal_set() {
        use std::collections::HashSet;

        use chess::{ALL_PIECES, ALL_SQUARES};

        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ];
        let promotions: Vec<Option<Piece>> =
            std::iter::once(None).chain(ALL_PIECES.iter().copied().map(Some)).collect();

        for fen in fens {
            let pos = Position::from_fen(fen).unwrap();
            let legal: HashSet<(Square, Square, Option<Piece>)> =
                pos.legal_moves().iter().map(|m| (m.from, m.to, m.promotion)).collect();

            let mut accepted = HashSet::new();
            for from in ALL_SQUARES {
                for to in ALL_SQUARES {
                    for &promotion in &promotions {
                        if let Ok((_, m)) = pos.apply_move(from, to, promotion) {
                            assert_eq!((m.from, m.to, m.promotion), (from, to, promotion));
                            accepted.insert((from, to, promotion));
                        }
                    }
                }
            }
            assert_eq!(accepted, legal, "{}", fen);
        }
    }

    #[test]
    fn test_ordering_is_stable() {
        let pos = Position::new();
        let a: Vec<String> = pos.legal_moves().iter().map(Move::uci).collect();
        let b: Vec<String> = pos.legal_moves().iter().map(Move::uci).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_by_origin() {
        let pos = Position::new();
        let knight = pos.legal_moves_from(Square::G1);
        let ucis: Vec<String> = knight.iter().map(Move::uci).collect();
        assert_eq!(ucis, vec!["g1f3", "g1h3"]);
        assert!(pos.legal_moves_from(Square::E4).is_empty());
    }

    #[test]
    fn test_promotions_ordered() {
        let pos = Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promos: Vec<String> = pos.legal_moves_from(Square::A7).iter().map(Move::uci).collect();
        assert_eq!(promos, vec!["a7a8q", "a7a8r", "a7a8b", "a7a8n"]);
    }

    #[test]
    fn test_special_move_kinds() {
        let pos = Position::from_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();
        let moves = pos.legal_moves();
        let ep = moves.iter().find(|m| m.uci() == "e5d6").unwrap();
        assert_eq!(ep.kind, MoveKind::EnPassant);
        assert_eq!(ep.captured, Some(Piece::Pawn));
        assert_eq!(ep.san, "exd6");
        let short = moves.iter().find(|m| m.uci() == "e1g1").unwrap();
        assert_eq!(short.kind, MoveKind::CastleKingside);
        assert_eq!(short.san, "O-O");
        let long = moves.iter().find(|m| m.uci() == "e1c1").unwrap();
        assert_eq!(long.san, "O-O-O");
    }

    #[test]
    fn test_every_legal_move_leaves_king_safe() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mover = pos.turn();
        for m in pos.legal_moves().iter() {
            let (next, _) = pos.apply_move(m.from, m.to, m.promotion).unwrap();
            let own_king = next.board().king_square(mover);
            assert!(
                !super::super::status::square_attacked(next.board(), own_king, !mover),
                "{} leaves the king en prise",
                m.uci()
            );
        }
    }

    #[test]
    fn test_signed_index_lookup() {
        let moves = Position::new().legal_moves();
        assert!(moves.get_signed(-1).is_none());
        assert!(moves.get_signed(20).is_none());
        assert!(moves.get_signed(19).is_some());
        assert_eq!(moves.find_coord(" G1F3 ").map(|(i, _)| i), Some(18));
    }
}
