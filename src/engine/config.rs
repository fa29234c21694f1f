use serde::{Deserialize, Serialize};

use crate::engine::types::{AnswerType, FluencyEnvelope, GradeBand, MasteryTier};

/// Theta midpoint per grade band. The screener ladder finalizes onto these
/// midpoints; the mapping is configuration, not a hard-coded scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMidpoints {
    pub pre_k: f64,
    pub elementary: f64,
    pub middle_school: f64,
    pub high_school: f64,
    pub calculus: f64,
    pub multivariable_calculus: f64,
}

impl Default for BandMidpoints {
    fn default() -> Self {
        Self {
            pre_k: -2.5,
            elementary: -0.5,
            middle_school: 0.5,
            high_school: 1.4,
            calculus: 2.2,
            multivariable_calculus: 2.7,
        }
    }
}

impl BandMidpoints {
    pub fn midpoint(&self, band: GradeBand) -> f64 {
        match band {
            GradeBand::PreK => self.pre_k,
            GradeBand::Elementary => self.elementary,
            GradeBand::MiddleSchool => self.middle_school,
            GradeBand::HighSchool => self.high_school,
            GradeBand::Calculus => self.calculus,
            GradeBand::MultivariableCalculus => self.multivariable_calculus,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirement {
    pub required_problems: u32,
    pub required_accuracy: f64,
}

/// Default quest requirements per tier. Courses may override per skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirements {
    pub bronze: TierRequirement,
    pub silver: TierRequirement,
    pub gold: TierRequirement,
}

impl Default for TierRequirements {
    fn default() -> Self {
        Self {
            bronze: TierRequirement {
                required_problems: 6,
                required_accuracy: 0.70,
            },
            silver: TierRequirement {
                required_problems: 10,
                required_accuracy: 0.80,
            },
            gold: TierRequirement {
                required_problems: 12,
                required_accuracy: 0.90,
            },
        }
    }
}

impl TierRequirements {
    pub fn for_tier(&self, tier: MasteryTier) -> Option<TierRequirement> {
        match tier {
            MasteryTier::Bronze => Some(self.bronze),
            MasteryTier::Silver => Some(self.silver),
            MasteryTier::Gold => Some(self.gold),
            MasteryTier::None => None,
        }
    }
}

/// Fallback fluency envelopes per answer type, used when a problem carries
/// no envelope of its own. Seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluencyDefaults {
    pub numeric: FluencyEnvelope,
    pub expression: FluencyEnvelope,
    pub multiple_choice: FluencyEnvelope,
    pub text: FluencyEnvelope,
}

impl Default for FluencyDefaults {
    fn default() -> Self {
        Self {
            // Reflex-style answers get a tight tolerance, worked answers a
            // loose one.
            numeric: FluencyEnvelope::from_expected(20.0, 2.0),
            expression: FluencyEnvelope::from_expected(45.0, 2.5),
            multiple_choice: FluencyEnvelope::from_expected(15.0, 2.0),
            text: FluencyEnvelope::from_expected(60.0, 3.0),
        }
    }
}

impl FluencyDefaults {
    pub fn for_answer_type(&self, answer_type: AnswerType) -> FluencyEnvelope {
        match answer_type {
            AnswerType::Numeric => self.numeric,
            AnswerType::Expression => self.expression,
            AnswerType::MultipleChoice => self.multiple_choice,
            AnswerType::Text => self.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Fixed learning rate k in the incremental theta update.
    pub learning_rate: f64,
    /// Initial standard error; SE = se0 / sqrt(attempts + 1).
    pub se0: f64,
    /// Sliding window of recently seen problems excluded from selection.
    pub exclusion_window: usize,
    /// Wall-clock budget for the timed placement screener, seconds.
    pub screener_budget_seconds: u64,
    /// Minimum per-band accuracy for a band to count as sustained.
    pub screener_sustain_accuracy: f64,
    /// Consecutive correct answers that step the ladder up one band.
    pub screener_step_up_streak: u32,
    /// Consecutive correct answers on a gap-fill target that resolve the
    /// excursion.
    pub gap_fill_streak: u32,
    /// Tier a prerequisite must have reached to count as met.
    pub prerequisite_tier: MasteryTier,
    /// XP awarded when a badge tier completes.
    pub badge_xp_bonus: u32,
    pub band_midpoints: BandMidpoints,
    pub tier_requirements: TierRequirements,
    pub fluency_defaults: FluencyDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.4,
            se0: 1.2,
            exclusion_window: 5,
            screener_budget_seconds: 60,
            screener_sustain_accuracy: 0.5,
            screener_step_up_streak: 2,
            gap_fill_streak: 2,
            prerequisite_tier: MasteryTier::Bronze,
            badge_xp_bonus: 500,
            band_midpoints: BandMidpoints::default(),
            tier_requirements: TierRequirements::default(),
            fluency_defaults: FluencyDefaults::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ENGINE_LEARNING_RATE") {
            if let Ok(parsed) = val.parse::<f64>() {
                config.learning_rate = parsed.clamp(0.01, 2.0);
            }
        }
        if let Ok(val) = std::env::var("ENGINE_EXCLUSION_WINDOW") {
            if let Ok(parsed) = val.parse::<usize>() {
                config.exclusion_window = parsed.min(50);
            }
        }
        if let Ok(val) = std::env::var("ENGINE_SCREENER_BUDGET_SECONDS") {
            if let Ok(parsed) = val.parse::<u64>() {
                config.screener_budget_seconds = parsed.clamp(10, 600);
            }
        }
        if let Ok(val) = std::env::var("ENGINE_PREREQUISITE_TIER") {
            match val.to_lowercase().as_str() {
                "bronze" => config.prerequisite_tier = MasteryTier::Bronze,
                "silver" => config.prerequisite_tier = MasteryTier::Silver,
                "gold" => config.prerequisite_tier = MasteryTier::Gold,
                _ => {}
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_midpoints_are_ordered() {
        let midpoints = BandMidpoints::default();
        let mut prev = f64::NEG_INFINITY;
        for band in GradeBand::ALL {
            let mid = midpoints.midpoint(band);
            assert!(mid > prev, "{band:?} midpoint out of order");
            prev = mid;
        }
    }

    #[test]
    fn test_tier_requirements_tighten_upward() {
        let reqs = TierRequirements::default();
        assert!(reqs.bronze.required_problems < reqs.silver.required_problems);
        assert!(reqs.silver.required_accuracy < reqs.gold.required_accuracy);
        assert!(reqs.for_tier(MasteryTier::None).is_none());
    }
}
