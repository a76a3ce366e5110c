//! Heuristic score type.
//!
//! Candidate moves are ranked by an additive integer score. The confidence
//! reported to callers is the score scaled down by ten and clamped.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Upper bound of the reported confidence.
pub const CONFIDENCE_MAX: f64 = 10.0;

/// A heuristic move score (higher is better).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    #[inline]
    pub const fn new(points: i32) -> Self {
        Score(points)
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Score divided by ten, clamped to `[0, CONFIDENCE_MAX]`.
    #[inline]
    pub fn confidence(self) -> f64 {
        (f64::from(self.0) / 10.0).clamp(0.0, CONFIDENCE_MAX)
    }
}

impl Add for Score {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Score(self.0 + rhs.0)
    }
}

impl Add<i32> for Score {
    type Output = Self;
    #[inline]
    fn add(self, rhs: i32) -> Self {
        Score(self.0 + rhs)
    }
}

impl AddAssign<i32> for Score {
    #[inline]
    fn add_assign(&mut self, rhs: i32) {
        self.0 += rhs;
    }
}

impl From<i32> for Score {
    #[inline]
    fn from(v: i32) -> Self {
        Score(v)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.0)
    }
}
