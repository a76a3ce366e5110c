//! Runtime configuration loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration: a human playing White against the built-in heuristic.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arbiter::{HeuristicSource, Participant, ProcessSource, RetryPolicy};
use crate::heuristic::Profile;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Seat {0} uses a process source but has no command")]
    MissingCommand(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub arbiter: ArbiterConfig,
    #[serde(default)]
    pub auto_play: AutoPlayConfig,
    #[serde(default = "default_white")]
    pub white: SeatConfig,
    #[serde(default = "default_black")]
    pub black: SeatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            auto_play: AutoPlayConfig::default(),
            white: default_white(),
            black: default_black(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Arbitration round settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArbiterConfig {
    /// Attempts per turn before the turn is given up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before retry `n` is `n * retry_base_delay_ms`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,
    /// Rationale text is cut to this many characters.
    #[serde(default = "default_rationale_limit")]
    pub rationale_limit: usize,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    800
}

fn default_decision_timeout_ms() -> u64 {
    30_000
}

fn default_rationale_limit() -> usize {
    160
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            decision_timeout_ms: default_decision_timeout_ms(),
            rationale_limit: default_rationale_limit(),
        }
    }
}

impl ArbiterConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_base_delay_ms))
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }
}

/// Agent-vs-agent auto-play settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutoPlayConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Stop after this many applied plies (unbounded when absent).
    #[serde(default)]
    pub max_plies: Option<usize>,
}

fn default_interval_ms() -> u64 {
    2_000
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_plies: None,
        }
    }
}

/// Who sits on a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatKind {
    #[default]
    Human,
    Heuristic,
    Process,
}

impl FromStr for SeatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(SeatKind::Human),
            "heuristic" => Ok(SeatKind::Heuristic),
            "process" => Ok(SeatKind::Process),
            other => Err(format!("unknown seat kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeatConfig {
    #[serde(default)]
    pub kind: SeatKind,
    #[serde(default)]
    pub profile: Profile,
    /// Command line for a process source, split on whitespace.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_white() -> SeatConfig {
    SeatConfig::default()
}

fn default_black() -> SeatConfig {
    SeatConfig {
        kind: SeatKind::Heuristic,
        ..SeatConfig::default()
    }
}

impl SeatConfig {
    /// Build the participant for this seat. `side` only labels errors.
    pub fn participant(&self, side: &'static str) -> Result<Participant, ConfigError> {
        match self.kind {
            SeatKind::Human => Ok(Participant::Human),
            SeatKind::Heuristic => Ok(Participant::Agent {
                profile: self.profile,
                source: Arc::new(HeuristicSource),
            }),
            SeatKind::Process => {
                let command = self
                    .command
                    .as_deref()
                    .and_then(ProcessSource::from_command_line)
                    .ok_or(ConfigError::MissingCommand(side))?;
                Ok(Participant::Agent {
                    profile: self.profile,
                    source: Arc::new(command),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let cfg = Config::from_yaml_str("").unwrap();
        assert_eq!(cfg.arbiter.max_attempts, 3);
        assert_eq!(cfg.arbiter.retry_base_delay_ms, 800);
        assert_eq!(cfg.arbiter.rationale_limit, 160);
        assert_eq!(cfg.auto_play.interval_ms, 2000);
        assert_eq!(cfg.white.kind, SeatKind::Human);
        assert_eq!(cfg.black.kind, SeatKind::Heuristic);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
arbiter:
  max_attempts: 5
auto_play:
  max_plies: 40
white:
  kind: heuristic
  profile: aggressive
black:
  kind: process
  command: "python3 agent.py --fast"
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.arbiter.max_attempts, 5);
        assert_eq!(cfg.arbiter.retry_base_delay_ms, 800);
        assert_eq!(cfg.auto_play.max_plies, Some(40));
        assert_eq!(cfg.white.profile, Profile::Aggressive);
        assert!(cfg.white.participant("white").unwrap().is_agent());
        assert!(cfg.black.participant("black").unwrap().is_agent());
    }

    #[test]
    fn test_process_without_command() {
        let seat = SeatConfig {
            kind: SeatKind::Process,
            ..SeatConfig::default()
        };
        assert!(matches!(
            seat.participant("black"),
            Err(ConfigError::MissingCommand("black"))
        ));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            Config::from_yaml_str("arbiter: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
