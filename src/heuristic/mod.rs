//! Deterministic move-scoring heuristic.
//!
//! Used as the built-in decision source and by the console `suggest`
//! command. No search: each legal move is scored on its own features.

mod profile;
mod scoring;

pub use profile::Profile;
pub use scoring::{score_move, suggest, ScoredCandidate, Suggestion, MAX_ALTERNATIVES};
