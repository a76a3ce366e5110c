//! Board state and move legality.
//!
//! - `position`: immutable [`Position`] value and FEN
//! - `movegen`: ordered [`LegalMoveSet`] generation
//! - `san`: SAN writing and tolerant reading
//! - `status`: check, mate, stalemate and draw detection
//! - `game`: the [`Game`] owner with its append-only [`GameRecord`]

mod game;
mod movegen;
mod position;
mod san;
mod status;

pub use game::{Game, GameRecord, GameState, Ply, SavedGame};
pub use movegen::{scan_index, LegalMoveSet, Move, MoveKind};
pub use position::{parse_coord, Position, START_FEN};
pub use status::{Outcome, Termination, FIFTY_MOVE_PLIES};
