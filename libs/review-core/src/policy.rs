//! Per-rating scheduling coefficients.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::types::Rating;

/// Coefficients applied when a card receives one particular rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPolicy {
    /// Factor applied to the current interval. Zero means reset.
    pub interval_multiplier: f64,
    /// Additive delta applied to the ease factor.
    pub ease_change: f64,
    /// Lower bound for the new interval, in days.
    pub min_interval: f64,
}

impl RatingPolicy {
    pub const fn new(interval_multiplier: f64, ease_change: f64, min_interval: f64) -> Self {
        Self {
            interval_multiplier,
            ease_change,
            min_interval,
        }
    }
}

/// Full scheduling configuration. Not persisted per card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    pub again: RatingPolicy,
    pub hard: RatingPolicy,
    pub good: RatingPolicy,
    pub easy: RatingPolicy,
    pub ease_floor: f64,
    pub default_ease: f64,
    /// Optional ceiling for the ease factor. Off by default.
    ///
    /// Applied after every rating, so a card whose ease already exceeds the
    /// cap is pulled down to it even on Good, which otherwise leaves ease
    /// untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ease: Option<f64>,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            again: RatingPolicy::new(0.0, -0.2, 0.0),
            hard: RatingPolicy::new(1.2, -0.15, 1.0),
            good: RatingPolicy::new(2.5, 0.0, 3.0),
            easy: RatingPolicy::new(4.0, 0.1, 7.0),
            ease_floor: 1.3,
            default_ease: 2.5,
            max_ease: None,
        }
    }
}

impl SchedulingPolicy {
    pub fn for_rating(&self, rating: Rating) -> &RatingPolicy {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }

    /// Check that every coefficient is usable.
    pub fn validate(&self) -> Result<()> {
        for rating in Rating::ALL {
            let p = self.for_rating(rating);
            ensure_finite(p.interval_multiplier, rating, "interval_multiplier")?;
            ensure_finite(p.ease_change, rating, "ease_change")?;
            ensure_finite(p.min_interval, rating, "min_interval")?;
            if p.interval_multiplier < 0.0 {
                return Err(SchedulerError::InvalidPolicy(format!(
                    "{rating}.interval_multiplier must not be negative, got {}",
                    p.interval_multiplier
                )));
            }
            if p.min_interval < 0.0 {
                return Err(SchedulerError::InvalidPolicy(format!(
                    "{rating}.min_interval must not be negative, got {}",
                    p.min_interval
                )));
            }
        }

        // Easy skips the floor clamp, so it may only raise ease.
        if self.easy.ease_change < 0.0 {
            return Err(SchedulerError::InvalidPolicy(format!(
                "easy.ease_change must not be negative, got {}",
                self.easy.ease_change
            )));
        }

        if !self.ease_floor.is_finite() || self.ease_floor <= 0.0 {
            return Err(SchedulerError::InvalidPolicy(format!(
                "ease_floor must be positive, got {}",
                self.ease_floor
            )));
        }
        if !self.default_ease.is_finite() || self.default_ease < self.ease_floor {
            return Err(SchedulerError::InvalidPolicy(format!(
                "default_ease {} is below ease_floor {}",
                self.default_ease, self.ease_floor
            )));
        }
        if let Some(max) = self.max_ease {
            if !max.is_finite() || max < self.default_ease {
                return Err(SchedulerError::InvalidPolicy(format!(
                    "max_ease {} is below default_ease {}",
                    max, self.default_ease
                )));
            }
        }

        Ok(())
    }
}

fn ensure_finite(value: f64, rating: Rating, field: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SchedulerError::InvalidPolicy(format!(
            "{rating}.{field} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_policy_matches_documented_table() {
        let policy = SchedulingPolicy::default();
        assert_eq!(policy.for_rating(Rating::Again), &RatingPolicy::new(0.0, -0.2, 0.0));
        assert_eq!(policy.for_rating(Rating::Hard), &RatingPolicy::new(1.2, -0.15, 1.0));
        assert_eq!(policy.for_rating(Rating::Good), &RatingPolicy::new(2.5, 0.0, 3.0));
        assert_eq!(policy.for_rating(Rating::Easy), &RatingPolicy::new(4.0, 0.1, 7.0));
        assert_eq!(policy.ease_floor, 1.3);
        assert_eq!(policy.default_ease, 2.5);
        assert_eq!(policy.max_ease, None);
    }

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(SchedulingPolicy::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_multiplier() {
        let mut policy = SchedulingPolicy::default();
        policy.hard.interval_multiplier = -1.0;
        assert!(matches!(
            policy.validate(),
            Err(SchedulerError::InvalidPolicy(msg)) if msg.contains("hard.interval_multiplier")
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut policy = SchedulingPolicy::default();
        policy.good.min_interval = f64::NAN;
        assert!(policy.validate().is_err());

        let mut policy = SchedulingPolicy::default();
        policy.again.ease_change = f64::NEG_INFINITY;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_negative_easy_ease_change() {
        let mut policy = SchedulingPolicy::default();
        policy.easy.ease_change = -0.1;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_default_ease_below_floor() {
        let policy = SchedulingPolicy {
            default_ease: 1.0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_floor() {
        let policy = SchedulingPolicy {
            ease_floor: 0.0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_max_ease_below_default() {
        let policy = SchedulingPolicy {
            max_ease: Some(2.0),
            ..Default::default()
        };
        assert!(policy.validate().is_err());

        let policy = SchedulingPolicy {
            max_ease: Some(3.5),
            ..Default::default()
        };
        assert_eq!(policy.validate(), Ok(()));
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let policy: SchedulingPolicy = serde_json::from_str(
            r#"{ "good": { "interval_multiplier": 2.0, "ease_change": 0.0, "min_interval": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(policy.good.interval_multiplier, 2.0);
        assert_eq!(policy.good.min_interval, 2.0);
        assert_eq!(policy.easy, SchedulingPolicy::default().easy);
        assert_eq!(policy.ease_floor, 1.3);
    }
}
