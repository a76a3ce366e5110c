//! Decision sources: anything that can pick a move for a position.
//!
//! A source is injected per side as a trait object. It may be slow, fail,
//! or answer with garbage; the arbiter validates whatever comes back.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::board::Position;
use crate::eval::evaluate;
use crate::heuristic::suggest;

use super::payload::{truncate, DecisionRequest, DecisionResponse};

/// Transport-level failures of a decision source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("decision timed out after {0:?}")]
    Timeout(Duration),
    #[error("decision source failed: {0}")]
    Failed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("process exited with {status}: {stderr}")]
    Process { status: String, stderr: String },
}

/// Something that chooses a move.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// Pick one of `request.candidates`, or answer with a coordinate or SAN.
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, SourceError>;
}

/// Built-in source backed by the scoring heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSource;

#[async_trait]
impl DecisionSource for HeuristicSource {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, SourceError> {
        let position = Position::from_fen(&request.position)
            .map_err(|e| SourceError::Failed(e.to_string()))?;
        let legal = position.legal_moves();
        let suggestion = suggest(&legal, request.profile, &evaluate(&position), position.turn())
            .ok_or_else(|| SourceError::Failed("no legal moves".to_string()))?;

        Ok(DecisionResponse::index(suggestion.best.index as i64)
            .with_rationale(suggestion.reasoning)
            .with_confidence(suggestion.confidence))
    }
}

/// External program: request JSON on stdin, reply text on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSource {
    program: String,
    args: Vec<String>,
}

impl ProcessSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace. `None` when it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DecisionSource for ProcessSource {
    async fn decide(&self, request: DecisionRequest) -> Result<DecisionResponse, SourceError> {
        let payload = serde_json::to_vec(&request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        debug!(program = %self.program, bytes = payload.len(), "decision process spawned");

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            stdin.write_all(b"\n").await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SourceError::Process {
                status: output.status.to_string(),
                stderr: truncate(String::from_utf8_lossy(&output.stderr).trim(), 200),
            });
        }

        DecisionResponse::from_reply_text(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Profile;

    #[tokio::test]
    async fn test_heuristic_source_answers_with_index() {
        let pos = Position::new();
        let request = DecisionRequest::new(Profile::Strategic, &pos, &pos.legal_moves());
        let response = HeuristicSource.decide(request).await.unwrap();
        assert!(response.success);
        // d2d4 is the first central pawn push in catalog order
        assert_eq!(response.index, Some(6));
        assert_eq!(response.confidence, Some(6.0));
        assert!(response.rationale.unwrap().contains("Position: equal"));
    }

    #[tokio::test]
    async fn test_heuristic_source_bad_fen() {
        let request = DecisionRequest {
            profile: Profile::Strategic,
            position: "not a fen".to_string(),
            candidates: Vec::new(),
            material_balance: 0,
            in_check: false,
        };
        assert!(matches!(
            HeuristicSource.decide(request).await,
            Err(SourceError::Failed(_))
        ));
    }

    #[test]
    fn test_command_line_split() {
        let src = ProcessSource::from_command_line("  python3 agent.py --fast ").unwrap();
        assert_eq!(src.program(), "python3");
        assert_eq!(src.args, vec!["agent.py", "--fast"]);
        assert!(ProcessSource::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_source_roundtrip() {
        let src = ProcessSource::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"cat > /dev/null; echo '{"coord": "e2e4", "rationale": "open"}'"#.to_string(),
            ],
        );
        let pos = Position::new();
        let request = DecisionRequest::new(Profile::Aggressive, &pos, &pos.legal_moves());
        let response = src.decide(request).await.unwrap();
        assert_eq!(response.coord.as_deref(), Some("e2e4"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_source_failure_status() {
        let src = ProcessSource::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; exit 3".to_string()],
        );
        let pos = Position::new();
        let request = DecisionRequest::new(Profile::Aggressive, &pos, &pos.legal_moves());
        assert!(matches!(
            src.decide(request).await,
            Err(SourceError::Process { .. })
        ));
    }
}
