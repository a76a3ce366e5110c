//! Game progress: the live position and its append-only record.
//!
//! [`Game`] is the only owner allowed to advance play. Every successful
//! apply appends exactly one ply; failures leave the record untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChessResult;
use crate::eval::{self, CapturedPieces, Evaluation};
use crate::types::{color_name, Color, Piece, Square};

use super::position::{Position, START_FEN};
use super::status::{Outcome, Termination};
use super::{LegalMoveSet, Move};

/// One applied half-move.
#[derive(Debug, Clone)]
pub struct Ply {
    pub mv: Move,
    pub position: Position,
}

/// Starting position plus every ply applied since.
#[derive(Debug, Clone)]
pub struct GameRecord {
    start: Position,
    plies: Vec<Ply>,
}

impl GameRecord {
    fn new(start: Position) -> Self {
        Self {
            start,
            plies: Vec::new(),
        }
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// Current position (the start position before any ply).
    pub fn current(&self) -> &Position {
        self.plies.last().map(|p| &p.position).unwrap_or(&self.start)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.plies.last().map(|p| &p.mv)
    }

    /// SAN of every applied move, in order.
    pub fn san_list(&self) -> Vec<String> {
        self.plies.iter().map(|p| p.mv.san.clone()).collect()
    }

    fn push(&mut self, mv: Move, position: Position) {
        self.plies.push(Ply { mv, position });
    }

    fn positions(&self) -> impl Iterator<Item = &Position> {
        std::iter::once(&self.start).chain(self.plies.iter().map(|p| &p.position))
    }
}

/// Serialized game: opaque start position plus moves in coordinate notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub start: String,
    pub moves: Vec<String>,
}

/// Summary of the game for display or transport.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub fen: String,
    pub move_history: Vec<String>,
    pub current_turn: &'static str,
    pub is_game_over: bool,
    /// "white", "black", "draw" or absent while the game is running.
    pub winner: Option<&'static str>,
    pub last_move: Option<String>,
    pub evaluation: Evaluation,
    pub captured_pieces: CapturedPieces,
}

/// Owner of the live position and the game record.
#[derive(Debug, Clone)]
pub struct Game {
    record: GameRecord,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// New game from the standard initial position.
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    pub fn from_position(start: Position) -> Self {
        Self {
            record: GameRecord::new(start),
        }
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Live position, by value.
    #[inline]
    pub fn position(&self) -> Position {
        *self.record.current()
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// Number of plies applied so far.
    #[inline]
    pub fn ply_count(&self) -> usize {
        self.record.len()
    }

    pub fn turn(&self) -> Color {
        self.position().turn()
    }

    pub fn legal_moves(&self) -> LegalMoveSet {
        self.position().legal_moves()
    }

    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> ChessResult<Move> {
        let (next, mv) = self.position().apply_move(from, to, promotion)?;
        Ok(self.commit(next, mv))
    }

    pub fn apply_san(&mut self, san: &str) -> ChessResult<Move> {
        let (next, mv) = self.position().apply_san(san)?;
        Ok(self.commit(next, mv))
    }

    pub fn apply_uci(&mut self, text: &str) -> ChessResult<Move> {
        let (next, mv) = self.position().apply_uci(text)?;
        Ok(self.commit(next, mv))
    }

    fn commit(&mut self, next: Position, mv: Move) -> Move {
        debug!(ply = self.record.len() + 1, san = %mv.san, fen = %next, "move applied");
        self.record.push(mv.clone(), next);
        mv
    }

    /// Current position has occurred at least three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let key = self.position().repetition_key();
        self.record
            .positions()
            .filter(|p| p.repetition_key() == key)
            .count()
            >= 3
    }

    pub fn is_draw(&self) -> bool {
        self.position().is_draw() || self.is_threefold_repetition()
    }

    pub fn is_game_over(&self) -> bool {
        self.position().is_checkmate() || self.is_draw()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.position().outcome().or_else(|| {
            self.is_threefold_repetition()
                .then_some(Outcome::Draw(Termination::ThreefoldRepetition))
        })
    }

    /// Snapshot suitable for external persistence.
    pub fn save(&self) -> SavedGame {
        SavedGame {
            start: self.record.start().to_fen(),
            moves: self.record.plies().iter().map(|p| p.mv.uci()).collect(),
        }
    }

    /// Rebuild a game by replaying the saved moves from the saved start.
    pub fn restore(saved: &SavedGame) -> ChessResult<Self> {
        let mut game = Game::from_fen(&saved.start)?;
        for mv in &saved.moves {
            game.apply_uci(mv)?;
        }
        Ok(game)
    }

    /// Movetext with move numbers and the result token.
    pub fn pgn(&self) -> String {
        let mut out = String::new();
        let start = self.record.start();
        if start.to_fen() != START_FEN {
            out.push_str(&format!("[SetUp \"1\"]\n[FEN \"{}\"]\n\n", start.to_fen()));
        }

        let mut tokens: Vec<String> = Vec::new();
        let mut prev = *start;
        for (i, ply) in self.record.plies().iter().enumerate() {
            match prev.turn() {
                Color::White => tokens.push(format!("{}.", prev.fullmove_number())),
                Color::Black if i == 0 => tokens.push(format!("{}...", prev.fullmove_number())),
                Color::Black => {}
            }
            tokens.push(ply.mv.san.clone());
            prev = ply.position;
        }
        tokens.push(
            self.outcome()
                .map(|o| o.result_token())
                .unwrap_or("*")
                .to_string(),
        );
        out.push_str(&tokens.join(" "));
        out
    }

    /// Display summary: FEN, history, turn, result, evaluation, captures.
    pub fn state(&self) -> GameState {
        let position = self.position();
        let outcome = self.outcome();
        GameState {
            fen: position.to_fen(),
            move_history: self.record.san_list(),
            current_turn: color_name(position.turn()),
            is_game_over: self.is_game_over(),
            winner: outcome.map(|o| match o.winner() {
                Some(c) => color_name(c),
                None => "draw",
            }),
            last_move: self.record.last_move().map(|m| m.san.clone()),
            evaluation: eval::evaluate(&position),
            captured_pieces: eval::captured_pieces(&position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChessError;

    #[test]
    fn test_apply_appends_one_ply() {
        let mut game = Game::new();
        let mv = game.apply_move(Square::G1, Square::F3, None).unwrap();
        assert_eq!(mv.san, "Nf3");
        assert_eq!(game.ply_count(), 1);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn test_failed_apply_leaves_record() {
        let mut game = Game::new();
        assert!(game.apply_move(Square::E2, Square::E5, None).is_err());
        assert!(game.apply_san("Qh5").is_err());
        assert!(game.apply_uci("zz").is_err());
        assert_eq!(game.ply_count(), 0);
        assert_eq!(game.position(), Position::new());
    }

    #[test]
    fn test_promotion_required() {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let err = game.apply_move(Square::A7, Square::A8, None).unwrap_err();
        assert!(matches!(err, ChessError::PromotionRequired(_)));
        assert_eq!(game.ply_count(), 0);
        assert!(matches!(
            game.apply_move(Square::A7, Square::A8, Some(Piece::King)),
            Err(ChessError::IllegalMove(_))
        ));
        let mv = game.apply_move(Square::A7, Square::A8, Some(Piece::Rook)).unwrap();
        assert_eq!(mv.san, "a8=R");
    }

    #[test]
    fn test_promotion_on_quiet_move_rejected() {
        let mut game = Game::new();
        assert!(matches!(
            game.apply_move(Square::E2, Square::E4, Some(Piece::Queen)),
            Err(ChessError::IllegalMove(_))
        ));
    }

    #[test]
    fn test_threefold_repetition() {
        let mut game = Game::new();
        for mv in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"] {
            assert!(!game.is_game_over());
            game.apply_san(mv).unwrap();
        }
        assert!(game.is_threefold_repetition());
        assert!(game.is_draw());
        assert_eq!(
            game.outcome(),
            Some(Outcome::Draw(Termination::ThreefoldRepetition))
        );
    }

    #[test]
    fn test_save_restore_roundtrip() {
        let mut game = Game::new();
        for mv in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"] {
            game.apply_san(mv).unwrap();
        }
        let saved = game.save();
        assert_eq!(saved.moves[0], "e2e4");
        let json = serde_json::to_string(&saved).unwrap();
        let back: SavedGame = serde_json::from_str(&json).unwrap();
        let restored = Game::restore(&back).unwrap();
        assert_eq!(restored.position(), game.position());
        assert_eq!(restored.ply_count(), game.ply_count());
        let a: Vec<String> = restored.legal_moves().iter().map(Move::uci).collect();
        let b: Vec<String> = game.legal_moves().iter().map(Move::uci).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_restore_rejects_bad_moves() {
        let saved = SavedGame {
            start: START_FEN.to_string(),
            moves: vec!["e2e4".into(), "e2e4".into()],
        };
        assert!(Game::restore(&saved).is_err());
    }

    #[test]
    fn test_pgn_movetext() {
        let mut game = Game::new();
        for mv in ["f3", "e5", "g4", "Qh4#"] {
            game.apply_san(mv).unwrap();
        }
        assert_eq!(game.pgn(), "1. f3 e5 2. g4 Qh4# 0-1");
    }

    #[test]
    fn test_state_summary() {
        let mut game = Game::new();
        game.apply_san("e4").unwrap();
        let state = game.state();
        assert_eq!(state.current_turn, "black");
        assert_eq!(state.last_move.as_deref(), Some("e4"));
        assert!(!state.is_game_over);
        assert!(state.winner.is_none());
        assert_eq!(state.evaluation.material_balance, 0);
    }
}
