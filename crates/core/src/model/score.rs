use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::mark::QuestionMark;

/// Points awarded for a fully correct theoretical answer.
pub const POINTS_PER_QUESTION: u32 = 10;

/// Weight of the theoretical part in the composite score.
pub const THEORETICAL_WEIGHT: f64 = 70.0;

/// Weight of the practical part in the composite score.
pub const PRACTICAL_WEIGHT: f64 = 30.0;

/// Minimum composite score (inclusive) that counts as a pass.
pub const PASS_MARK: f64 = 60.0;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("practical score must be between 0 and 10 in steps of 0.5, got {0}")]
    InvalidPracticalScore(f64),
}

//
// ─── PRACTICAL SCORE ──────────────────────────────────────────────────────────
//

/// The reviewer's practical-task score: 0 to 10 in half-point steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PracticalScore(f64);

impl PracticalScore {
    /// Validates a raw slider value.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::InvalidPracticalScore` if the value is outside
    /// `[0, 10]` or not a multiple of 0.5.
    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if !(0.0..=10.0).contains(&value) || (value * 2.0).fract() != 0.0 {
            return Err(ScoreError::InvalidPracticalScore(value));
        }
        Ok(Self(value))
    }

    /// Clamps an untrusted value (e.g. from a legacy snapshot) to the valid
    /// domain: out-of-range values saturate, off-step values round to the
    /// nearest half point.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let clamped = value.clamp(0.0, 10.0);
        Self((clamped * 2.0).round() / 2.0)
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

//
// ─── SCORE BREAKDOWN ──────────────────────────────────────────────────────────
//

/// The weighted composite of theoretical and practical performance.
///
/// This is a pure function of the recorded marks and the practical score —
/// it is recomputed on every read and doubles as the `scores` object of the
/// finalize payload, hence the camelCase serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub theoretical_earned: u32,
    pub theoretical_max: u32,
    pub practical_score: f64,
    pub composite_score: f64,
}

impl ScoreBreakdown {
    /// Computes the composite from the current marks.
    ///
    /// `total_questions` is the size of the module's question set, which
    /// bounds the theoretical maximum; an empty set contributes zero rather
    /// than dividing by zero.
    #[must_use]
    pub fn compute<'a, I>(marks: I, total_questions: usize, practical: PracticalScore) -> Self
    where
        I: IntoIterator<Item = &'a QuestionMark>,
    {
        let theoretical_earned: u32 = marks.into_iter().map(|m| m.score()).sum();
        let total = u32::try_from(total_questions).unwrap_or(u32::MAX);
        let theoretical_max = total.saturating_mul(POINTS_PER_QUESTION);

        let theoretical_pct = if theoretical_max > 0 {
            f64::from(theoretical_earned) / f64::from(theoretical_max)
        } else {
            0.0
        };
        let practical_pct = practical.value() / 10.0;
        let composite_score = theoretical_pct * THEORETICAL_WEIGHT + practical_pct * PRACTICAL_WEIGHT;

        Self {
            theoretical_earned,
            theoretical_max,
            practical_score: practical.value(),
            composite_score,
        }
    }

    /// Whether the composite score meets the pass mark.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.composite_score >= PASS_MARK
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;
    use crate::model::mark::MarkStatus;

    fn marks(statuses: &[MarkStatus]) -> Vec<QuestionMark> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| QuestionMark::new(QuestionId::new(i as u64 + 1), *status))
            .collect()
    }

    #[test]
    fn practical_score_validation() {
        assert!(PracticalScore::new(0.0).is_ok());
        assert!(PracticalScore::new(7.5).is_ok());
        assert!(PracticalScore::new(10.0).is_ok());
        assert!(matches!(
            PracticalScore::new(10.5),
            Err(ScoreError::InvalidPracticalScore(_))
        ));
        assert!(matches!(
            PracticalScore::new(3.3),
            Err(ScoreError::InvalidPracticalScore(_))
        ));
        assert!(matches!(
            PracticalScore::new(-0.5),
            Err(ScoreError::InvalidPracticalScore(_))
        ));
    }

    #[test]
    fn practical_score_clamping() {
        assert_eq!(PracticalScore::clamped(11.0).value(), 10.0);
        assert_eq!(PracticalScore::clamped(-2.0).value(), 0.0);
        assert_eq!(PracticalScore::clamped(3.3).value(), 3.5);
        assert_eq!(PracticalScore::clamped(f64::NAN).value(), 0.0);
    }

    #[test]
    fn composite_matches_worked_example() {
        // 4 questions: Answered, Answered, NeedsImprovement, Wrong.
        let marks = marks(&[
            MarkStatus::Answered,
            MarkStatus::Answered,
            MarkStatus::NeedsImprovement,
            MarkStatus::Wrong,
        ]);
        let practical = PracticalScore::new(8.0).unwrap();

        let score = ScoreBreakdown::compute(&marks, 4, practical);
        assert_eq!(score.theoretical_earned, 25);
        assert_eq!(score.theoretical_max, 40);
        assert!((score.composite_score - 67.75).abs() < 1e-9);
        assert!(score.passed());
    }

    #[test]
    fn pass_mark_is_inclusive() {
        let exactly_60 = ScoreBreakdown {
            theoretical_earned: 0,
            theoretical_max: 0,
            practical_score: 0.0,
            composite_score: 60.0,
        };
        assert!(exactly_60.passed());

        let just_below = ScoreBreakdown {
            composite_score: 59.99,
            ..exactly_60
        };
        assert!(!just_below.passed());
    }

    #[test]
    fn empty_module_scores_practical_only() {
        let practical = PracticalScore::new(8.0).unwrap();
        let score = ScoreBreakdown::compute(&[], 0, practical);
        assert_eq!(score.theoretical_max, 0);
        assert!((score.composite_score - 24.0).abs() < 1e-9);
        assert!(!score.passed());
    }

    #[test]
    fn serializes_camel_case() {
        let score = ScoreBreakdown {
            theoretical_earned: 25,
            theoretical_max: 40,
            practical_score: 8.0,
            composite_score: 67.75,
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["theoreticalEarned"], 25);
        assert_eq!(json["compositeScore"], 67.75);
    }
}
