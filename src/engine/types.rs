#![allow(dead_code)]

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const THETA_MIN: f64 = -3.0;
pub const THETA_MAX: f64 = 3.0;
pub const DEFAULT_DISCRIMINATION: f64 = 1.0;
const RESPONSE_TIME_WINDOW: usize = 20;

/// Ordered grade bands, lowest to highest. The ordering drives the
/// placement ladder and the one-band-up extension excursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeBand {
    PreK,
    Elementary,
    MiddleSchool,
    HighSchool,
    Calculus,
    MultivariableCalculus,
}

impl GradeBand {
    pub const ALL: [GradeBand; 6] = [
        Self::PreK,
        Self::Elementary,
        Self::MiddleSchool,
        Self::HighSchool,
        Self::Calculus,
        Self::MultivariableCalculus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreK => "pre-k",
            Self::Elementary => "elementary",
            Self::MiddleSchool => "middle-school",
            Self::HighSchool => "high-school",
            Self::Calculus => "calculus",
            Self::MultivariableCalculus => "multivariable-calculus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pre-k" | "prek" => Some(Self::PreK),
            "elementary" | "k-5" => Some(Self::Elementary),
            "middle-school" | "5-8" => Some(Self::MiddleSchool),
            "high-school" | "8-12" | "algebra-1" => Some(Self::HighSchool),
            "calculus" => Some(Self::Calculus),
            "multivariable-calculus" | "calc-3" => Some(Self::MultivariableCalculus),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|b| b == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

/// Badge tiers in completion order. `None` means the skill has never
/// completed a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum MasteryTier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
}

impl MasteryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Bronze),
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Gold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum AnswerType {
    #[default]
    Numeric,
    Expression,
    MultipleChoice,
    Text,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Expression => "expression",
            Self::MultipleChoice => "multiple-choice",
            Self::Text => "text",
        }
    }
}

/// A node in the skill graph. `unlocks` is derived at load time as the
/// exact inverse of `prerequisites` and must never be authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub skill_id: String,
    pub display_name: String,
    pub grade_band: GradeBand,
    pub category: String,
    /// IRT location parameter b.
    pub difficulty: f64,
    /// IRT discrimination a; absent means 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrimination: Option<f64>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub unlocks: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Skill {
    pub fn discrimination_or_default(&self) -> f64 {
        self.discrimination.unwrap_or(DEFAULT_DISCRIMINATION)
    }
}

fn default_true() -> bool {
    true
}

/// Response-time thresholds for one answer type. Advisory only: fluency
/// classification never gates mastery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluencyEnvelope {
    pub expected_time: f64,
    pub warning_threshold: f64,
    pub ghost_limit: f64,
}

impl FluencyEnvelope {
    pub fn from_expected(expected_time: f64, tolerance_factor: f64) -> Self {
        let ghost_limit = expected_time * tolerance_factor;
        // Warning sits 75% of the way from expected to the ghost limit.
        let warning_threshold = expected_time + (ghost_limit - expected_time) * 0.75;
        Self {
            expected_time,
            warning_threshold,
            ghost_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub problem_id: String,
    pub skill_id: String,
    #[serde(default)]
    pub secondary_skill_ids: Vec<String>,
    pub difficulty: f64,
    #[serde(default)]
    pub answer_type: AnswerType,
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluency: Option<FluencyEnvelope>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Per-(student, skill) learning state. Created lazily on first attempt,
/// mutated only by the mastery state machine, cleared only by an explicit
/// remediation reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSkillState {
    pub skill_id: String,
    pub theta: f64,
    pub standard_error: f64,
    pub attempts_count: u32,
    pub correct_count: u32,
    pub consecutive_correct: u32,
    pub recent_response_times: VecDeque<f64>,
    pub mastery_tier: MasteryTier,
    pub last_practiced_at: Option<i64>,
}

impl StudentSkillState {
    pub fn new(skill_id: &str, initial_theta: f64, se0: f64) -> Self {
        Self {
            skill_id: skill_id.to_string(),
            theta: initial_theta.clamp(THETA_MIN, THETA_MAX),
            standard_error: se0,
            attempts_count: 0,
            correct_count: 0,
            consecutive_correct: 0,
            recent_response_times: VecDeque::new(),
            mastery_tier: MasteryTier::None,
            last_practiced_at: None,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts_count == 0 {
            return 0.0;
        }
        self.correct_count as f64 / self.attempts_count as f64
    }

    pub fn push_response_time(&mut self, seconds: f64) {
        self.recent_response_times.push_back(seconds);
        while self.recent_response_times.len() > RESPONSE_TIME_WINDOW {
            self.recent_response_times.pop_front();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
}

/// One badge-tier quest for a (student, skill). Tiers run strictly
/// bronze -> silver -> gold; a tier cannot start before its predecessor
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryQuest {
    pub skill_id: String,
    pub tier: MasteryTier,
    pub required_problems: u32,
    pub required_accuracy: f64,
    pub problems_completed: u32,
    pub problems_correct: u32,
    pub status: QuestStatus,
}

impl MasteryQuest {
    pub fn new(skill_id: &str, tier: MasteryTier, required_problems: u32, required_accuracy: f64) -> Self {
        Self {
            skill_id: skill_id.to_string(),
            tier,
            required_problems,
            required_accuracy,
            problems_completed: 0,
            problems_correct: 0,
            status: QuestStatus::Active,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.problems_completed == 0 {
            return 0.0;
        }
        self.problems_correct as f64 / self.problems_completed as f64
    }

    /// Both legs must hold simultaneously: count alone never completes.
    pub fn meets_requirements(&self) -> bool {
        self.problems_completed >= self.required_problems
            && self.accuracy() >= self.required_accuracy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcursionKind {
    GapFill,
    Extension,
}

impl ExcursionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GapFill => "gap_fill",
            Self::Extension => "extension",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Excursion {
    pub kind: ExcursionKind,
    pub target_skill_id: String,
    pub return_skill_id: String,
}

/// Where a student sits on a course pathway. At most one excursion is
/// active; further gap-fill requests queue in FIFO order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayPosition {
    pub course_id: String,
    pub frontier_skill_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excursion: Option<Excursion>,
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    pub queued_gap_fills: VecDeque<String>,
}

/// Append-only log entry. Immutable once written; the sole input to all
/// derived-state updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub attempt_id: String,
    pub problem_id: String,
    pub skill_id: String,
    pub correct: bool,
    pub response_time_seconds: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluencyLevel {
    Fluent,
    Proficient,
    Developing,
    Struggling,
}

impl FluencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fluent => "fluent",
            Self::Proficient => "proficient",
            Self::Developing => "developing",
            Self::Struggling => "struggling",
        }
    }
}

/// An ordered course pathway: the main line a student walks after
/// placement. `skill_sequence` is ordered easiest to hardest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: String,
    pub display_name: String,
    pub grade_band: GradeBand,
    pub skill_sequence: Vec<String>,
    /// Accuracy over the two most recent skills required to trigger an
    /// extension excursion.
    #[serde(default = "default_extension_threshold")]
    pub extension_threshold: f64,
}

fn default_extension_threshold() -> f64 {
    0.85
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_band_ordering() {
        assert!(GradeBand::PreK < GradeBand::Elementary);
        assert!(GradeBand::HighSchool < GradeBand::Calculus);
        assert_eq!(GradeBand::Elementary.next(), Some(GradeBand::MiddleSchool));
        assert_eq!(GradeBand::PreK.previous(), None);
        assert_eq!(GradeBand::MultivariableCalculus.next(), None);
    }

    #[test]
    fn test_tier_progression() {
        assert_eq!(MasteryTier::None.next(), Some(MasteryTier::Bronze));
        assert_eq!(MasteryTier::Silver.next(), Some(MasteryTier::Gold));
        assert_eq!(MasteryTier::Gold.next(), None);
        assert!(MasteryTier::Gold.is_terminal());
        assert!(!MasteryTier::Bronze.is_terminal());
    }

    #[test]
    fn test_quest_requires_conjunction() {
        let mut quest = MasteryQuest::new("two-step-equations", MasteryTier::Bronze, 10, 0.80);
        quest.problems_completed = 10;
        quest.problems_correct = 7;
        assert!((quest.accuracy() - 0.70).abs() < 1e-9);
        assert!(!quest.meets_requirements());

        quest.problems_correct = 8;
        assert!(quest.meets_requirements());
    }

    #[test]
    fn test_response_time_window_caps() {
        let mut state = StudentSkillState::new("s", 0.0, 1.2);
        for i in 0..40 {
            state.push_response_time(i as f64);
        }
        assert_eq!(state.recent_response_times.len(), RESPONSE_TIME_WINDOW);
        assert_eq!(state.recent_response_times.front(), Some(&20.0));
    }
}
