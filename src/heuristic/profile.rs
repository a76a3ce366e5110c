use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Play style of an agent. Tunes the heuristic bonuses and is forwarded to
/// external decision sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Aggressive,
    Defensive,
    #[default]
    Strategic,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Aggressive, Profile::Defensive, Profile::Strategic];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Aggressive => "aggressive",
            Profile::Defensive => "defensive",
            Profile::Strategic => "strategic",
        }
    }

    /// One-line summary appended to heuristic reasoning.
    pub fn blurb(self) -> &'static str {
        match self {
            Profile::Aggressive => "Seeking active play and initiative.",
            Profile::Defensive => "Prioritizing safety and solid structure.",
            Profile::Strategic => "Balancing attack and defense strategically.",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown profile '{}'", s))
    }
}
