//! Core types for review scheduling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::policy::SchedulingPolicy;

/// The learner's recall judgment for one review of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value, matching the study-screen shortcuts.
    pub fn from_value(value: u8) -> Result<Self, SchedulerError> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            other => Err(SchedulerError::InvalidRating(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(rating) = Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
        {
            return Ok(rating);
        }
        match trimmed.parse::<u8>() {
            Ok(value) => Self::from_value(value),
            Err(_) => Err(SchedulerError::InvalidRating(s.to_string())),
        }
    }
}

/// Scheduling-relevant subset of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardReviewState {
    /// Days until the next review. Continuous; only the due date is rounded.
    pub interval: f64,
    pub ease_factor: f64,
    pub next_review_date: DateTime<Utc>,
    pub review_count: u32,
}

impl CardReviewState {
    /// State of a freshly created card: due immediately.
    pub fn new(now: DateTime<Utc>, policy: &SchedulingPolicy) -> Self {
        Self {
            interval: 0.0,
            ease_factor: policy.default_ease,
            next_review_date: now,
            review_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_date
    }
}

/// A card offered to session selection: its identity, review state and
/// creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyCandidate<Id> {
    pub id: Id,
    pub state: CardReviewState,
    pub created_at: DateTime<Utc>,
}
