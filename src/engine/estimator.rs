//! IRT ability estimation.
//!
//! Two-parameter logistic model shared by the timed placement screener and
//! ongoing practice. The continuous update is a fixed-step gradient rule
//! rather than a full MLE refit: one attempt moves theta by at most the
//! learning rate.

use serde::Serialize;

use crate::engine::config::EngineConfig;
use crate::engine::types::{StudentSkillState, THETA_MAX, THETA_MIN};

/// P(correct | theta) under the 2PL model.
pub fn probability_correct(theta: f64, difficulty: f64, discrimination: f64) -> f64 {
    let exponent = -discrimination * (theta - difficulty);
    1.0 / (1.0 + exponent.exp())
}

/// Fisher information contributed by one item at the given theta:
/// a^2 * P * (1 - P). Peaks where b is closest to theta.
pub fn fisher_information(theta: f64, difficulty: f64, discrimination: f64) -> f64 {
    let p = probability_correct(theta, difficulty, discrimination);
    discrimination * discrimination * p * (1.0 - p)
}

/// Incremental theta update: +k(1-P) on a correct answer, -kP on an
/// incorrect one, clamped to the theta bounds.
pub fn update_theta(theta: f64, correct: bool, probability: f64, learning_rate: f64) -> f64 {
    let delta = if correct {
        learning_rate * (1.0 - probability)
    } else {
        -learning_rate * probability
    };
    (theta + delta).clamp(THETA_MIN, THETA_MAX)
}

/// SE shrinks monotonically with attempt count.
pub fn standard_error(se0: f64, attempts_count: u32) -> f64 {
    se0 / ((attempts_count as f64) + 1.0).sqrt()
}

/// Approximate percentile rank under N(0, 1), via the Abramowitz-Stegun
/// erf approximation.
pub fn theta_to_percentile(theta: f64) -> u32 {
    let z = theta;
    let t = 1.0 / (1.0 + 0.5 * z.abs());
    let tau = t
        * (-z * z - 1.26551223
            + t * (1.00002368
                + t * (0.37409196
                    + t * (0.09678418
                        + t * (-0.18628806
                            + t * (0.27886807
                                + t * (-1.13520398
                                    + t * (1.48851587
                                        + t * (-0.82215223 + t * 0.17087277)))))))))
            .exp();
    let cdf = if z >= 0.0 { 1.0 - 0.5 * tau } else { 0.5 * tau };
    (cdf * 100.0).round().clamp(0.0, 100.0) as u32
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityUpdate {
    pub theta_before: f64,
    pub theta_after: f64,
    pub probability: f64,
    pub standard_error: f64,
}

/// Applies one attempt to a skill state: theta, SE, counters and streak.
pub fn apply_attempt(
    state: &mut StudentSkillState,
    correct: bool,
    difficulty: f64,
    discrimination: f64,
    config: &EngineConfig,
) -> AbilityUpdate {
    let theta_before = state.theta;
    let probability = probability_correct(state.theta, difficulty, discrimination);

    state.theta = update_theta(state.theta, correct, probability, config.learning_rate);
    state.attempts_count += 1;
    if correct {
        state.correct_count += 1;
        state.consecutive_correct += 1;
    } else {
        state.consecutive_correct = 0;
    }
    state.standard_error = standard_error(config.se0, state.attempts_count);

    AbilityUpdate {
        theta_before,
        theta_after: state.theta,
        probability,
        standard_error: state.standard_error,
    }
}

/// Theta for a skill with no attempts yet: the finalized placement theta
/// for its domain if one exists, otherwise the grade-band midpoint.
pub fn initial_theta(
    placement_theta: Option<f64>,
    band_midpoint: f64,
) -> f64 {
    placement_theta
        .unwrap_or(band_midpoint)
        .clamp(THETA_MIN, THETA_MAX)
}
