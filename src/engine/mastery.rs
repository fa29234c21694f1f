//! Badge-tier mastery state machine.
//!
//! One active quest per (student, skill); tiers complete strictly in
//! bronze -> silver -> gold order. Completion requires the conjunction of
//! problem count and accuracy. Response-time classification is advisory:
//! it feeds a fluency bonus flag and UI encouragement, never the mastery
//! decision.

use serde::Serialize;

use crate::engine::config::EngineConfig;
use crate::engine::graph::KnowledgeGraph;
use crate::engine::types::{
    FluencyEnvelope, FluencyLevel, MasteryQuest, MasteryTier, Problem, QuestStatus,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FluencyVerdict {
    pub level: FluencyLevel,
    pub bonus: bool,
    pub response_time_seconds: f64,
    pub expected_time: f64,
    pub ghost_limit: f64,
}

/// Classifies a response time against the envelope. The strict limit for
/// the fluency bonus sits halfway between expected and ghost.
pub fn classify_response_time(seconds: f64, envelope: &FluencyEnvelope) -> FluencyVerdict {
    let strict_limit =
        envelope.expected_time + (envelope.ghost_limit - envelope.expected_time) * 0.5;

    let level = if seconds <= strict_limit {
        FluencyLevel::Fluent
    } else if seconds <= envelope.warning_threshold {
        FluencyLevel::Proficient
    } else if seconds <= envelope.ghost_limit {
        FluencyLevel::Developing
    } else {
        FluencyLevel::Struggling
    };

    FluencyVerdict {
        level,
        bonus: matches!(level, FluencyLevel::Fluent),
        response_time_seconds: seconds,
        expected_time: envelope.expected_time,
        ghost_limit: envelope.ghost_limit,
    }
}

pub fn envelope_for(problem: &Problem, config: &EngineConfig) -> FluencyEnvelope {
    problem
        .fluency
        .unwrap_or_else(|| config.fluency_defaults.for_answer_type(problem.answer_type))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub skill_id: String,
    pub tier: MasteryTier,
    pub status: QuestStatus,
    pub problems_completed: u32,
    pub problems_correct: u32,
    pub required_problems: u32,
    pub required_accuracy: f64,
    pub accuracy: f64,
    pub meets_requirements: bool,
}

impl QuestProgress {
    pub fn of(quest: &MasteryQuest) -> Self {
        Self {
            skill_id: quest.skill_id.clone(),
            tier: quest.tier,
            status: quest.status,
            problems_completed: quest.problems_completed,
            problems_correct: quest.problems_correct,
            required_problems: quest.required_problems,
            required_accuracy: quest.required_accuracy,
            accuracy: quest.accuracy(),
            meets_requirements: quest.meets_requirements(),
        }
    }
}

/// Outcome of recording one attempt against a quest.
#[derive(Debug, Clone)]
pub struct QuestUpdate {
    pub progress: QuestProgress,
    /// Tier that just reached completed, if any.
    pub completed_tier: Option<MasteryTier>,
    /// Attempt landed on an already-completed quest: counters frozen.
    pub free_practice: bool,
}

/// Applies one attempt to the active quest. An attempt against a quest
/// that already reached completed is accepted as free practice and
/// mutates nothing; counters freeze at the values that earned the tier.
pub fn record_quest_attempt(quest: &mut MasteryQuest, correct: bool) -> QuestUpdate {
    if quest.status == QuestStatus::Completed {
        return QuestUpdate {
            progress: QuestProgress::of(quest),
            completed_tier: None,
            free_practice: true,
        };
    }

    quest.problems_completed += 1;
    if correct {
        quest.problems_correct += 1;
    }

    let completed_tier = if quest.status == QuestStatus::Active && quest.meets_requirements() {
        quest.status = QuestStatus::Completed;
        Some(quest.tier)
    } else {
        None
    };

    QuestUpdate {
        progress: QuestProgress::of(quest),
        completed_tier,
        free_practice: false,
    }
}

/// The quest for the tier after `completed`, from the configured
/// requirements. Gold is terminal.
pub fn next_tier_quest(
    skill_id: &str,
    completed: MasteryTier,
    config: &EngineConfig,
) -> Option<MasteryQuest> {
    let next = completed.next()?;
    let requirement = config.tier_requirements.for_tier(next)?;
    Some(MasteryQuest::new(
        skill_id,
        next,
        requirement.required_problems,
        requirement.required_accuracy,
    ))
}

pub fn initial_quest(skill_id: &str, config: &EngineConfig) -> MasteryQuest {
    let requirement = config.tier_requirements.bronze;
    MasteryQuest::new(
        skill_id,
        MasteryTier::Bronze,
        requirement.required_problems,
        requirement.required_accuracy,
    )
}

/// Skills whose prerequisites may now be satisfied, collected when the
/// terminal tier completes.
pub fn unlock_candidates(graph: &KnowledgeGraph, skill_id: &str) -> Vec<String> {
    graph.downstream_of(skill_id)
}

pub fn tier_upgrade_message(from: MasteryTier, to: MasteryTier) -> &'static str {
    match (from, to) {
        (MasteryTier::None, MasteryTier::Bronze) => {
            "You're getting the hang of this! Keep practicing with support."
        }
        (MasteryTier::Bronze, MasteryTier::Silver) => {
            "You can do this independently now. Let's add some variety."
        }
        (MasteryTier::Silver, MasteryTier::Gold) => {
            "This skill is now reliable. You'll see it again — don't panic."
        }
        _ => "Skill upgraded!",
    }
}

/// Boundary to the external lesson-context generator. The engine calls
/// this when a quest activates; the default does nothing.
pub trait LessonContextSource: Send + Sync {
    fn on_quest_active(&self, skill_id: &str, progress: &QuestProgress);
}

#[derive(Debug, Default)]
pub struct NoopLessonContext;

impl LessonContextSource for NoopLessonContext {
    fn on_quest_active(&self, _skill_id: &str, _progress: &QuestProgress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_alone_does_not_complete() {
        // Integer Operations - Bronze: 10 problems at 80%.
        let mut quest = MasteryQuest::new("integer-all-operations", MasteryTier::Bronze, 10, 0.80);
        for i in 0..10 {
            record_quest_attempt(&mut quest, i < 7);
        }
        assert_eq!(quest.problems_completed, 10);
        assert!((quest.accuracy() - 0.70).abs() < 1e-9);
        assert!(!quest.meets_requirements());
        assert_eq!(quest.status, QuestStatus::Active);
    }

    #[test]
    fn test_conjunction_completes() {
        let mut quest = MasteryQuest::new("integer-all-operations", MasteryTier::Bronze, 5, 0.80);
        let mut completed = None;
        for _ in 0..5 {
            let update = record_quest_attempt(&mut quest, true);
            if update.completed_tier.is_some() {
                completed = update.completed_tier;
            }
        }
        assert_eq!(completed, Some(MasteryTier::Bronze));
        assert_eq!(quest.status, QuestStatus::Completed);
    }

    #[test]
    fn test_completion_can_arrive_late() {
        // Count reached first with accuracy short; a later streak closes
        // the accuracy leg and completes past the required count.
        let mut quest = MasteryQuest::new("s", MasteryTier::Bronze, 4, 0.80);
        for outcome in [true, false, true, true] {
            record_quest_attempt(&mut quest, outcome);
        }
        assert!(!quest.meets_requirements());

        let update = record_quest_attempt(&mut quest, true);
        assert_eq!(update.completed_tier, Some(MasteryTier::Bronze));
    }

    #[test]
    fn test_gold_over_completion_is_noop() {
        let mut quest = MasteryQuest::new("s", MasteryTier::Gold, 1, 0.0);
        record_quest_attempt(&mut quest, true);
        assert_eq!(quest.status, QuestStatus::Completed);

        let before = (quest.problems_completed, quest.problems_correct);
        let update = record_quest_attempt(&mut quest, true);
        assert!(update.free_practice);
        assert_eq!((quest.problems_completed, quest.problems_correct), before);
    }

    #[test]
    fn test_tier_chain_ends_at_gold() {
        let config = EngineConfig::default();
        let silver = next_tier_quest("s", MasteryTier::Bronze, &config).unwrap();
        assert_eq!(silver.tier, MasteryTier::Silver);
        assert_eq!(silver.required_problems, 10);

        let gold = next_tier_quest("s", MasteryTier::Silver, &config).unwrap();
        assert_eq!(gold.tier, MasteryTier::Gold);
        assert!(next_tier_quest("s", MasteryTier::Gold, &config).is_none());
    }

    #[test]
    fn test_fluency_levels() {
        let envelope = FluencyEnvelope::from_expected(20.0, 2.0);
        // expected 20, strict 30, warning 35, ghost 40
        assert_eq!(classify_response_time(10.0, &envelope).level, FluencyLevel::Fluent);
        assert!(classify_response_time(10.0, &envelope).bonus);
        assert_eq!(
            classify_response_time(32.0, &envelope).level,
            FluencyLevel::Proficient
        );
        assert_eq!(
            classify_response_time(38.0, &envelope).level,
            FluencyLevel::Developing
        );
        let slow = classify_response_time(55.0, &envelope);
        assert_eq!(slow.level, FluencyLevel::Struggling);
        assert!(!slow.bonus);
    }
}
