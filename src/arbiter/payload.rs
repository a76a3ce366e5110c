//! Wire shapes exchanged with decision sources.

use serde::{Deserialize, Serialize};

use crate::board::{LegalMoveSet, Position};
use crate::eval::evaluate;
use crate::heuristic::Profile;

use super::source::SourceError;

/// One entry of the indexed legal-move catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub index: usize,
    pub san: String,
    pub coord: String,
}

/// Everything a decision source needs to pick a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub profile: Profile,
    /// FEN of the position the candidates belong to.
    pub position: String,
    pub candidates: Vec<Candidate>,
    pub material_balance: i32,
    pub in_check: bool,
}

impl DecisionRequest {
    pub fn new(profile: Profile, position: &Position, legal: &LegalMoveSet) -> Self {
        let eval = evaluate(position);
        Self {
            profile,
            position: position.to_fen(),
            candidates: legal
                .iter()
                .enumerate()
                .map(|(index, m)| Candidate {
                    index,
                    san: m.san.clone(),
                    coord: m.uci(),
                })
                .collect(),
            material_balance: eval.material_balance,
            in_check: eval.in_check,
        }
    }
}

fn default_success() -> bool {
    true
}

/// Reply from a decision source.
///
/// Accepts `{index}`, `{coord}` (alias `uci`) or `{san}`, each with an
/// optional `rationale` (alias `reasoning`) and `confidence`.
/// `{"success": false, "error": ...}` reports a failed decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, alias = "uci", skip_serializing_if = "Option::is_none")]
    pub coord: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
    #[serde(default, alias = "reasoning", skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecisionResponse {
    fn empty() -> Self {
        Self {
            success: true,
            index: None,
            coord: None,
            san: None,
            rationale: None,
            confidence: None,
            error: None,
        }
    }

    pub fn index(index: i64) -> Self {
        Self {
            index: Some(index),
            ..Self::empty()
        }
    }

    pub fn coord(coord: impl Into<String>) -> Self {
        Self {
            coord: Some(coord.into()),
            ..Self::empty()
        }
    }

    pub fn san(san: impl Into<String>) -> Self {
        Self {
            san: Some(san.into()),
            ..Self::empty()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::empty()
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Pull the first `{...}` object out of free text and parse it.
    /// Markdown code fences and surrounding prose are ignored.
    pub fn from_reply_text(text: &str) -> Result<Self, SourceError> {
        let start = text.find('{');
        let end = text.rfind('}');
        match (start, end) {
            (Some(s), Some(e)) if s < e => Ok(serde_json::from_str(&text[s..=e])?),
            _ => Err(SourceError::Failed(format!(
                "no JSON object in reply: {:?}",
                truncate(text.trim(), 80)
            ))),
        }
    }
}

/// First `limit` characters of `text`.
pub(crate) fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
