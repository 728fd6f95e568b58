//! Spaced-repetition core shared by the backend and its tests.
//!
//! Provides:
//! - SM-2 derived scheduler (`compute_next_review`, `Scheduler`)
//! - Per-rating scheduling policy with validation
//! - Study-session selection (`select_study_cards`)
//! - Shared types (CardReviewState, Rating, StudyCandidate)

pub mod error;
pub mod policy;
pub mod scheduler;
pub mod selection;
pub mod types;

pub use error::{Result, SchedulerError};
pub use policy::{RatingPolicy, SchedulingPolicy};
pub use scheduler::{compute_next_review, Scheduler};
pub use selection::select_study_cards;
pub use types::{CardReviewState, Rating, StudyCandidate};
