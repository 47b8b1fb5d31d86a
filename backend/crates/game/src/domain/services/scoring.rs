//! Scoring Engine
//!
//! Maps a guess and the real price to a difference, a percentage error,
//! mode-specific points and a continue/stop decision.

use crate::domain::value_objects::GameMode;
use crate::error::{GameError, GameResult};

/// A streak guess is correct when its error is at most this percentage.
pub const DEFAULT_STREAK_TOLERANCE_PERCENT: f64 = 10.0;

/// Points for an exact challenge guess.
pub const DEFAULT_CHALLENGE_MAX_POINTS: i64 = 1000;

/// Error percentage at which challenge points reach zero.
pub const DEFAULT_CHALLENGE_CEILING_PERCENT: f64 = 50.0;

/// Tunable scoring policy
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    pub streak_tolerance_percent: f64,
    pub challenge_max_points: i64,
    pub challenge_ceiling_percent: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            streak_tolerance_percent: DEFAULT_STREAK_TOLERANCE_PERCENT,
            challenge_max_points: DEFAULT_CHALLENGE_MAX_POINTS,
            challenge_ceiling_percent: DEFAULT_CHALLENGE_CEILING_PERCENT,
        }
    }
}

impl ScoringPolicy {
    /// Reject policies that would break score monotonicity.
    pub fn validate(&self) -> GameResult<()> {
        if !(self.streak_tolerance_percent.is_finite() && self.streak_tolerance_percent >= 0.0) {
            return Err(GameError::InvalidInput(
                "streak tolerance must be a non-negative percentage".into(),
            ));
        }
        if self.challenge_max_points <= 0 {
            return Err(GameError::InvalidInput(
                "challenge max points must be positive".into(),
            ));
        }
        if !(self.challenge_ceiling_percent.is_finite() && self.challenge_ceiling_percent > 0.0) {
            return Err(GameError::InvalidInput(
                "challenge ceiling must be a positive percentage".into(),
            ));
        }
        Ok(())
    }
}

/// Result of scoring one guess
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    /// |guess - actual|
    pub difference: i64,
    /// difference / actual * 100
    pub percentage_error: f64,
    /// Contribution to the session's cumulative score
    pub points: i64,
    /// Within the streak tolerance band (informational in other modes)
    pub correct: bool,
    /// False only for a missed streak guess; the challenge bound is enforced by the session
    pub continues: bool,
}

/// Score a guess.
///
/// `guessed_price` must be >= 0 and `actual_price` > 0.
pub fn score(
    mode: GameMode,
    guessed_price: i64,
    actual_price: i64,
    policy: &ScoringPolicy,
) -> GameResult<ScoreOutcome> {
    if guessed_price < 0 {
        return Err(GameError::InvalidInput(
            "guessed price cannot be negative".into(),
        ));
    }
    if actual_price <= 0 {
        return Err(GameError::InvalidInput(
            "listing price must be positive".into(),
        ));
    }

    let difference = (guessed_price - actual_price).abs();
    let percentage_error = percentage_error(difference, actual_price);
    let correct = percentage_error <= policy.streak_tolerance_percent;

    let (points, continues) = match mode {
        GameMode::Zero => (difference, true),
        GameMode::Streak => (i64::from(correct), correct),
        GameMode::Challenge => (challenge_points(percentage_error, policy), true),
    };

    Ok(ScoreOutcome {
        difference,
        percentage_error,
        points,
        correct,
        continues,
    })
}

fn percentage_error(difference: i64, actual_price: i64) -> f64 {
    if difference == 0 {
        return 0.0;
    }
    (difference as f64 / actual_price as f64 * 100.0).max(0.0)
}

/// Linear decay from `challenge_max_points` at 0% error to 0 at the ceiling.
pub fn challenge_points(percentage_error: f64, policy: &ScoringPolicy) -> i64 {
    if percentage_error >= policy.challenge_ceiling_percent {
        return 0;
    }
    let remaining = 1.0 - percentage_error / policy.challenge_ceiling_percent;
    (policy.challenge_max_points as f64 * remaining)
        .round()
        .clamp(0.0, policy.challenge_max_points as f64) as i64
}
