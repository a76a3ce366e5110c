//! User-visible move log.

use std::fmt;

use crate::heuristic::Profile;
use crate::types::{color_name, Color};

/// Placeholder move text for a turn that produced no move.
pub const NO_MOVE: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Human,
    Agent(Profile),
    /// Every attempt of an agent turn failed.
    Failure(Profile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub side: Color,
    pub kind: EntryKind,
    pub san: String,
    pub rationale: String,
    pub confidence: Option<f64>,
}

impl LogEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EntryKind::Failure(_))
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.kind {
            EntryKind::Human => "human".to_string(),
            EntryKind::Agent(p) => p.to_string(),
            EntryKind::Failure(p) => format!("{} (failed)", p),
        };
        write!(f, "{} {}: {}", color_name(self.side), who, self.san)?;
        if let Some(c) = self.confidence {
            write!(f, " [{:.1}]", c)?;
        }
        if !self.rationale.is_empty() {
            write!(f, " - {}", self.rationale)?;
        }
        Ok(())
    }
}

/// Append-only list of what each side did.
#[derive(Debug, Clone, Default)]
pub struct MoveLog {
    entries: Vec<LogEntry>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let entry = LogEntry {
            side: Color::White,
            kind: EntryKind::Agent(Profile::Aggressive),
            san: "Nf3".to_string(),
            rationale: "develop".to_string(),
            confidence: Some(6.0),
        };
        assert_eq!(entry.to_string(), "white aggressive: Nf3 [6.0] - develop");

        let failed = LogEntry {
            side: Color::Black,
            kind: EntryKind::Failure(Profile::Defensive),
            san: NO_MOVE.to_string(),
            rationale: String::new(),
            confidence: None,
        };
        assert_eq!(failed.to_string(), "black defensive (failed): --");
        assert!(failed.is_failure());
    }
}
