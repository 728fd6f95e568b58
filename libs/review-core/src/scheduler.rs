//! SM-2 derived review scheduler.
//!
//! A pure transition `(state, rating, policy, now) -> state`. The caller
//! supplies `now`; nothing here reads a clock, touches storage or logs.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SchedulerError};
use crate::policy::SchedulingPolicy;
use crate::types::{CardReviewState, Rating};

/// Scheduler bound to a validated policy.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    policy: SchedulingPolicy,
}

impl Scheduler {
    pub fn new(policy: SchedulingPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Initial state for a card created at `now`.
    pub fn initial_state(&self, now: DateTime<Utc>) -> CardReviewState {
        CardReviewState::new(now, &self.policy)
    }

    /// Calculate the state that follows `state` after it is rated `rating`.
    pub fn schedule(
        &self,
        state: &CardReviewState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<CardReviewState> {
        next_state(&self.policy, state, rating, now)
    }
}

/// Compute the next review state, falling back to the default policy when
/// `policy` is `None`.
pub fn compute_next_review(
    state: &CardReviewState,
    rating: Rating,
    policy: Option<&SchedulingPolicy>,
    now: DateTime<Utc>,
) -> Result<CardReviewState> {
    match policy {
        Some(policy) => {
            policy.validate()?;
            next_state(policy, state, rating, now)
        }
        None => next_state(&SchedulingPolicy::default(), state, rating, now),
    }
}

fn next_state(
    policy: &SchedulingPolicy,
    state: &CardReviewState,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<CardReviewState> {
    validate_state(state, policy)?;

    let floor = policy.ease_floor;
    let coeffs = policy.for_rating(rating);
    let grown = state.interval * coeffs.interval_multiplier;

    let (interval, ease) = match rating {
        Rating::Again => (
            coeffs.min_interval,
            floor.max(state.ease_factor + coeffs.ease_change),
        ),
        Rating::Hard => (
            coeffs.min_interval.max(grown),
            floor.max(state.ease_factor + coeffs.ease_change),
        ),
        Rating::Good => (coeffs.min_interval.max(grown), state.ease_factor),
        // Not floor-clamped; validated policies only let Easy raise ease.
        Rating::Easy => (
            coeffs.min_interval.max(grown),
            state.ease_factor + coeffs.ease_change,
        ),
    };

    let ease = match policy.max_ease {
        Some(cap) => ease.min(cap),
        None => ease,
    };

    Ok(CardReviewState {
        interval,
        ease_factor: ease,
        next_review_date: due_after(now, interval)?,
        review_count: state.review_count.saturating_add(1),
    })
}

fn validate_state(state: &CardReviewState, policy: &SchedulingPolicy) -> Result<()> {
    if !state.interval.is_finite() || state.interval < 0.0 {
        return Err(SchedulerError::InvalidState(format!(
            "interval must be a non-negative number of days, got {}",
            state.interval
        )));
    }
    if !state.ease_factor.is_finite() || state.ease_factor < policy.ease_floor {
        return Err(SchedulerError::InvalidState(format!(
            "ease factor {} is below the floor of {}",
            state.ease_factor, policy.ease_floor
        )));
    }
    Ok(())
}

/// `now` plus the interval rounded up to whole days.
fn due_after(now: DateTime<Utc>, interval: f64) -> Result<DateTime<Utc>> {
    let days = interval.ceil();
    if !days.is_finite() || days > i64::MAX as f64 {
        return Err(SchedulerError::DueDateOutOfRange { interval });
    }
    Duration::try_days(days as i64)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(SchedulerError::DueDateOutOfRange { interval })
}
