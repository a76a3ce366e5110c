//! Additive move scoring.
//!
//! Every candidate starts from a base score and collects bonuses for
//! tactical and positional features. The profile decides how much captures
//! and checks are worth, and the material situation can add a swing bonus.

use crate::board::{LegalMoveSet, Move};
use crate::eval::{Evaluation, PositionType};
use crate::types::{Color, Score, CENTER_SQUARES};

use super::Profile;

/// Move score constants
const BASE_SCORE: i32 = 50;
const AGGRESSIVE_CAPTURE_BONUS: i32 = 30;
const CAPTURE_BONUS: i32 = 15;
const AGGRESSIVE_CHECK_BONUS: i32 = 25;
const CHECK_BONUS: i32 = 10;
const PROMOTION_BONUS: i32 = 40;
const DESPERATION_BONUS: i32 = 20;
const CONSOLIDATION_BONUS: i32 = 15;
const CENTER_BONUS: i32 = 10;

/// How many runners-up are reported next to the best move.
pub const MAX_ALTERNATIVES: usize = 3;

/// A legal move with its heuristic score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Index into the legal move set the candidate came from.
    pub index: usize,
    pub mv: Move,
    pub score: Score,
    pub rationale: String,
}

/// Heuristic recommendation for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub best: ScoredCandidate,
    pub alternatives: Vec<ScoredCandidate>,
    pub position_type: PositionType,
    pub reasoning: String,
    /// Best score divided by ten, clamped to 0..=10.
    pub confidence: f64,
}

/// Score a single move (higher = better)
pub fn score_move(m: &Move, profile: Profile, position_type: PositionType) -> (Score, String) {
    let aggressive = profile == Profile::Aggressive;
    let mut score = Score::new(BASE_SCORE);
    let mut why = String::new();

    if m.is_capture() {
        if aggressive {
            score += AGGRESSIVE_CAPTURE_BONUS;
            why.push_str("Aggressive capture. ");
        } else {
            score += CAPTURE_BONUS;
            why.push_str("Material gain. ");
        }
    }

    if m.gives_check {
        if aggressive {
            score += AGGRESSIVE_CHECK_BONUS;
            why.push_str("Checking the king! ");
        } else {
            score += CHECK_BONUS;
            why.push_str("Applying pressure. ");
        }
    }

    if m.is_promotion() {
        score += PROMOTION_BONUS;
        why.push_str("Pawn promotion! ");
    }

    match (position_type, profile) {
        (PositionType::Losing, Profile::Aggressive) if m.is_capture() => {
            score += DESPERATION_BONUS;
            why.push_str("Desperate counterplay needed. ");
        }
        (PositionType::Winning, Profile::Defensive) if !m.is_capture() => {
            score += CONSOLIDATION_BONUS;
            why.push_str("Consolidating advantage. ");
        }
        _ => {}
    }

    if CENTER_SQUARES.contains(&m.to) {
        score += CENTER_BONUS;
        why.push_str("Controlling center. ");
    }

    let why = match why.trim_end() {
        "" => "Solid developing move.".to_string(),
        text => text.to_string(),
    };
    (score, why)
}

/// Rank every legal move for `side` and pick the best.
///
/// Sorting is stable, so equal scores keep legal-move order and the earliest
/// candidate wins ties. Returns `None` when there are no legal moves.
pub fn suggest(
    legal: &LegalMoveSet,
    profile: Profile,
    evaluation: &Evaluation,
    side: Color,
) -> Option<Suggestion> {
    let position_type = evaluation.position_type_for(side);

    let mut scored: Vec<ScoredCandidate> = legal
        .iter()
        .enumerate()
        .map(|(index, m)| {
            let (score, rationale) = score_move(m, profile, position_type);
            ScoredCandidate {
                index,
                mv: m.clone(),
                score,
                rationale,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut ranked = scored.into_iter();
    let best = ranked.next()?;
    let alternatives: Vec<ScoredCandidate> = ranked.take(MAX_ALTERNATIVES).collect();

    let reasoning = format!(
        "{} Position: {}. {}",
        best.rationale,
        position_type.as_str(),
        profile.blurb()
    );
    let confidence = best.score.confidence();

    Some(Suggestion {
        best,
        alternatives,
        position_type,
        reasoning,
        confidence,
    })
}
