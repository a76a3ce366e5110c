//! Chess move arbitration.
//!
//! A rules engine ([`board`]), a material evaluator ([`eval`]) and a
//! deterministic move-scoring heuristic ([`heuristic`]) underneath an
//! [`arbiter`] that takes moves from slow or unreliable decision sources,
//! discards answers that arrive for a position that no longer exists, and
//! retries bad answers a bounded number of times.

pub mod arbiter;
pub mod board;
pub mod config;
pub mod console;
pub mod error;
pub mod eval;
pub mod heuristic;
pub mod types;

pub use arbiter::{Arbiter, DecisionSource, Participant, Seats};
pub use board::{Game, Move, Position};
pub use error::{ChessError, ChessResult};
