//! Check and terminal-state detection.
//!
//! Checkmate and stalemate are exact. Draws recognised on a bare position:
//! stalemate, insufficient material and the 50-move rule. Threefold
//! repetition needs history and is detected by [`super::Game`].

use std::fmt;

use crate::types::{is_light_square, BoardStatus, Color, Piece, EMPTY};
#[cfg(test)]
use crate::types::{Board, Square};

use super::position::Position;

/// Half-move clock value at which the 50-move rule applies.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Decisive { winner: Color, termination: Termination },
    Draw(Termination),
}

impl Outcome {
    /// PGN result token.
    pub fn result_token(&self) -> &'static str {
        match self {
            Outcome::Decisive { winner: Color::White, .. } => "1-0",
            Outcome::Decisive { winner: Color::Black, .. } => "0-1",
            Outcome::Draw(_) => "1/2-1/2",
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Decisive { winner, .. } => Some(*winner),
            Outcome::Draw(_) => None,
        }
    }

    pub fn termination(&self) -> Termination {
        match self {
            Outcome::Decisive { termination, .. } | Outcome::Draw(termination) => *termination,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Decisive { winner, termination } => {
                write!(f, "{} wins by {:?}", crate::types::color_name(*winner), termination)
            }
            Outcome::Draw(termination) => write!(f, "draw by {:?}", termination),
        }
    }
}

/// Is `sq` attacked by any piece of colour `by`?
#[cfg(test)]
pub(crate) fn square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    use chess::{
        get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    };

    let theirs = *board.color_combined(by);
    let occupied = *board.combined();
    let diagonal = (*board.pieces(Piece::Bishop) | *board.pieces(Piece::Queen)) & theirs;
    let straight = (*board.pieces(Piece::Rook) | *board.pieces(Piece::Queen)) & theirs;

    (get_bishop_moves(sq, occupied) & diagonal) != EMPTY
        || (get_rook_moves(sq, occupied) & straight) != EMPTY
        || (get_knight_moves(sq) & *board.pieces(Piece::Knight) & theirs) != EMPTY
        || (get_king_moves(sq) & *board.pieces(Piece::King) & theirs) != EMPTY
        || (get_pawn_attacks(sq, !by, !EMPTY) & *board.pieces(Piece::Pawn) & theirs) != EMPTY
}

impl Position {
    /// Side to move is in check.
    pub fn is_check(&self) -> bool {
        *self.board().checkers() != EMPTY
    }

    /// No legal moves and in check.
    pub fn is_checkmate(&self) -> bool {
        self.board().status() == BoardStatus::Checkmate
    }

    /// No legal moves and not in check.
    pub fn is_stalemate(&self) -> bool {
        self.board().status() == BoardStatus::Stalemate
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// only bishops that all stand on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let board = self.board();
        let heavy =
            *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = board.pieces(Piece::Knight).popcnt();
        let bishops = *board.pieces(Piece::Bishop);
        match (knights, bishops.popcnt()) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (0, _) => {
                let light = bishops.into_iter().filter(|sq| is_light_square(*sq)).count();
                light == 0 || light == bishops.popcnt() as usize
            }
            _ => false,
        }
    }

    /// Half-move clock has reached 100.
    pub fn is_fifty_move_rule(&self) -> bool {
        self.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    /// Draw by stalemate, insufficient material or the 50-move rule.
    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_insufficient_material() || self.is_fifty_move_rule()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Result if the game is over on this position alone.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_checkmate() {
            return Some(Outcome::Decisive {
                winner: !self.turn(),
                termination: Termination::Checkmate,
            });
        }
        if self.is_stalemate() {
            return Some(Outcome::Draw(Termination::Stalemate));
        }
        if self.is_insufficient_material() {
            return Some(Outcome::Draw(Termination::InsufficientMaterial));
        }
        if self.is_fifty_move_rule() {
            return Some(Outcome::Draw(Termination::FiftyMoveRule));
        }
        None
    }
}
