//! Pathway routing: frontier placement, gap-fill and extension excursions.
//!
//! The router never touches student state directly. It inspects the
//! position plus the attempt outcome and returns route changes; the engine
//! applies any tier promotions those changes imply.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::config::EngineConfig;
use crate::engine::graph::KnowledgeGraph;
use crate::engine::item_bank::ItemBank;
use crate::engine::types::{
    Course, Excursion, ExcursionKind, MasteryTier, PathwayPosition,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum RouteChange {
    EnteredGapFill {
        target_skill_id: String,
        return_skill_id: String,
    },
    QueuedGapFill {
        target_skill_id: String,
    },
    /// Gap-fill target held for the configured streak; the engine promotes
    /// it to at least bronze.
    ResolvedGapFill {
        target_skill_id: String,
        return_skill_id: String,
    },
    EnteredExtension {
        target_skill_id: String,
    },
    /// Extension attempt missed; back to the pathway with no penalty.
    ReturnedFromExtension {
        completed: bool,
    },
    FrontierAdvanced {
        from_skill_id: String,
        to_skill_id: String,
    },
    /// Frontier skill skipped because it has no practice content.
    SkippedContentGap {
        skill_id: String,
    },
}

/// Everything the router needs to know about one recorded attempt.
#[derive(Debug, Clone)]
pub struct AttemptOutcome<'a> {
    pub skill_id: &'a str,
    pub correct: bool,
    /// Streak on the practiced skill after this attempt.
    pub consecutive_correct: u32,
    pub tiers: &'a HashMap<String, MasteryTier>,
    /// The frontier skill's gold tier completed on this attempt.
    pub frontier_gold_completed: bool,
    /// Accuracy across the two most recently practiced skills.
    pub recent_two_skill_accuracy: f64,
}

/// Maps a finalized placement theta onto a course: the frontier is the
/// first pathway skill whose difficulty exceeds theta, skipping content
/// gaps. Falls back to the last practicable skill.
pub fn place(
    course: &Course,
    graph: &KnowledgeGraph,
    bank: &ItemBank,
    theta: f64,
) -> Option<PathwayPosition> {
    let practicable: Vec<&str> = course
        .skill_sequence
        .iter()
        .map(String::as_str)
        .filter(|id| graph.contains(id) && bank.has_content(id))
        .collect();

    let frontier = practicable
        .iter()
        .find(|id| {
            graph
                .skill(id)
                .map(|s| s.difficulty > theta)
                .unwrap_or(false)
        })
        .or_else(|| practicable.last())
        .copied()?;

    Some(PathwayPosition {
        course_id: course.course_id.clone(),
        frontier_skill_id: frontier.to_string(),
        excursion: None,
        queued_gap_fills: Default::default(),
    })
}

/// The skill the student should be practicing right now.
pub fn current_practice_skill(position: &PathwayPosition) -> &str {
    position
        .excursion
        .as_ref()
        .map(|e| e.target_skill_id.as_str())
        .unwrap_or(position.frontier_skill_id.as_str())
}

/// Routes after one recorded attempt, mutating the position in place.
pub fn after_attempt(
    position: &mut PathwayPosition,
    course: &Course,
    graph: &KnowledgeGraph,
    bank: &ItemBank,
    config: &EngineConfig,
    outcome: &AttemptOutcome<'_>,
) -> Vec<RouteChange> {
    let mut changes = Vec::new();

    match position.excursion.clone() {
        None => {
            on_pathway(position, course, graph, bank, config, outcome, &mut changes);
        }
        Some(excursion) => match excursion.kind {
            ExcursionKind::GapFill => {
                in_gap_fill(position, graph, config, outcome, &excursion, &mut changes);
            }
            ExcursionKind::Extension => {
                in_extension(position, outcome, &excursion, &mut changes);
            }
        },
    }

    changes
}

fn on_pathway(
    position: &mut PathwayPosition,
    course: &Course,
    graph: &KnowledgeGraph,
    bank: &ItemBank,
    config: &EngineConfig,
    outcome: &AttemptOutcome<'_>,
    changes: &mut Vec<RouteChange>,
) {
    if outcome.skill_id != position.frontier_skill_id {
        return;
    }

    if !outcome.correct {
        if let Some(target) = graph.first_unmet_prerequisite(
            outcome.skill_id,
            outcome.tiers,
            config.prerequisite_tier,
        ) {
            if bank.has_content(target) {
                position.excursion = Some(Excursion {
                    kind: ExcursionKind::GapFill,
                    target_skill_id: target.to_string(),
                    return_skill_id: position.frontier_skill_id.clone(),
                });
                changes.push(RouteChange::EnteredGapFill {
                    target_skill_id: target.to_string(),
                    return_skill_id: position.frontier_skill_id.clone(),
                });
            } else {
                changes.push(RouteChange::SkippedContentGap {
                    skill_id: target.to_string(),
                });
            }
        }
        return;
    }

    if outcome.frontier_gold_completed {
        if outcome.recent_two_skill_accuracy > course.extension_threshold {
            if let Some(target) = extension_target(course, graph, bank) {
                position.excursion = Some(Excursion {
                    kind: ExcursionKind::Extension,
                    target_skill_id: target.clone(),
                    return_skill_id: position.frontier_skill_id.clone(),
                });
                changes.push(RouteChange::EnteredExtension {
                    target_skill_id: target,
                });
                return;
            }
        }
        advance_frontier(position, course, graph, bank, config, outcome.tiers, changes);
    }
}

fn in_gap_fill(
    position: &mut PathwayPosition,
    graph: &KnowledgeGraph,
    config: &EngineConfig,
    outcome: &AttemptOutcome<'_>,
    excursion: &Excursion,
    changes: &mut Vec<RouteChange>,
) {
    if outcome.skill_id != excursion.target_skill_id {
        return;
    }

    if outcome.correct && outcome.consecutive_correct >= config.gap_fill_streak {
        position.excursion = None;
        changes.push(RouteChange::ResolvedGapFill {
            target_skill_id: excursion.target_skill_id.clone(),
            return_skill_id: excursion.return_skill_id.clone(),
        });
        // The frontier is unchanged on return; a deferred gap fill starts
        // immediately if one is queued.
        if let Some(next_target) = position.queued_gap_fills.pop_front() {
            position.excursion = Some(Excursion {
                kind: ExcursionKind::GapFill,
                target_skill_id: next_target.clone(),
                return_skill_id: position.frontier_skill_id.clone(),
            });
            changes.push(RouteChange::EnteredGapFill {
                target_skill_id: next_target,
                return_skill_id: position.frontier_skill_id.clone(),
            });
        }
        return;
    }

    if !outcome.correct {
        // The gap itself has a gap: queue it rather than stacking
        // excursions.
        if let Some(deeper) = graph.first_unmet_prerequisite(
            outcome.skill_id,
            outcome.tiers,
            config.prerequisite_tier,
        ) {
            let deeper = deeper.to_string();
            if deeper != excursion.target_skill_id
                && !position.queued_gap_fills.contains(&deeper)
            {
                position.queued_gap_fills.push_back(deeper.clone());
                changes.push(RouteChange::QueuedGapFill {
                    target_skill_id: deeper,
                });
            }
        }
    }
}

fn in_extension(
    position: &mut PathwayPosition,
    outcome: &AttemptOutcome<'_>,
    excursion: &Excursion,
    changes: &mut Vec<RouteChange>,
) {
    if outcome.skill_id != excursion.target_skill_id {
        return;
    }

    if !outcome.correct {
        position.excursion = None;
        changes.push(RouteChange::ReturnedFromExtension { completed: false });
        return;
    }

    // Enrichment complete once the target reaches bronze.
    let tier = outcome
        .tiers
        .get(&excursion.target_skill_id)
        .copied()
        .unwrap_or(MasteryTier::None);
    if tier >= MasteryTier::Bronze {
        position.excursion = None;
        changes.push(RouteChange::ReturnedFromExtension { completed: true });
    }
}

/// Lowest-difficulty practicable skill one grade band above the course.
fn extension_target(
    course: &Course,
    graph: &KnowledgeGraph,
    bank: &ItemBank,
) -> Option<String> {
    let band = course.grade_band.next()?;
    graph
        .skills_in_band(band)
        .into_iter()
        .filter(|s| bank.has_content(&s.skill_id))
        .min_by(|a, b| a.difficulty.total_cmp(&b.difficulty))
        .map(|s| s.skill_id.clone())
}

fn advance_frontier(
    position: &mut PathwayPosition,
    course: &Course,
    graph: &KnowledgeGraph,
    bank: &ItemBank,
    config: &EngineConfig,
    tiers: &HashMap<String, MasteryTier>,
    changes: &mut Vec<RouteChange>,
) {
    let current_idx = course
        .skill_sequence
        .iter()
        .position(|id| *id == position.frontier_skill_id);
    let Some(current_idx) = current_idx else {
        return;
    };

    for candidate in course.skill_sequence.iter().skip(current_idx + 1) {
        if !graph.contains(candidate) {
            continue;
        }
        if !bank.has_content(candidate) {
            changes.push(RouteChange::SkippedContentGap {
                skill_id: candidate.clone(),
            });
            continue;
        }
        if !graph.prerequisites_met(candidate, tiers, config.prerequisite_tier) {
            continue;
        }
        let from = std::mem::replace(&mut position.frontier_skill_id, candidate.clone());
        changes.push(RouteChange::FrontierAdvanced {
            from_skill_id: from,
            to_skill_id: candidate.clone(),
        });
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{AnswerType, GradeBand, Problem, Skill};

    fn skill(id: &str, band: GradeBand, difficulty: f64, prereqs: &[&str]) -> Skill {
        Skill {
            skill_id: id.to_string(),
            display_name: id.to_string(),
            grade_band: band,
            category: "equations".to_string(),
            difficulty,
            discrimination: None,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
            unlocks: Vec::new(),
            is_active: true,
        }
    }

    fn problem(id: &str, skill_id: &str) -> Problem {
        Problem {
            problem_id: id.to_string(),
            skill_id: skill_id.to_string(),
            secondary_skill_ids: Vec::new(),
            difficulty: 0.0,
            answer_type: AnswerType::Numeric,
            prompt: id.to_string(),
            answer: "1".to_string(),
            accepted_answers: Vec::new(),
            tags: Vec::new(),
            fluency: None,
            is_active: true,
        }
    }

    fn fixture() -> (KnowledgeGraph, ItemBank, Course) {
        let graph = KnowledgeGraph::load(vec![
            skill("adding-integers", GradeBand::MiddleSchool, -0.5, &[]),
            skill(
                "one-step-equations",
                GradeBand::MiddleSchool,
                0.0,
                &["adding-integers"],
            ),
            skill(
                "two-step-equations",
                GradeBand::MiddleSchool,
                0.5,
                &["one-step-equations"],
            ),
            skill("linear-functions", GradeBand::HighSchool, 1.1, &[]),
        ])
        .unwrap();
        let bank = ItemBank::load(
            vec![
                problem("p-add", "adding-integers"),
                problem("p-one", "one-step-equations"),
                problem("p-two", "two-step-equations"),
                problem("p-lin", "linear-functions"),
            ],
            &graph,
        )
        .unwrap();
        let course = Course {
            course_id: "pre-algebra".to_string(),
            display_name: "Pre-Algebra".to_string(),
            grade_band: GradeBand::MiddleSchool,
            skill_sequence: vec![
                "adding-integers".to_string(),
                "one-step-equations".to_string(),
                "two-step-equations".to_string(),
            ],
            extension_threshold: 0.85,
        };
        (graph, bank, course)
    }

    #[test]
    fn test_place_at_first_skill_above_theta() {
        let (graph, bank, course) = fixture();
        let position = place(&course, &graph, &bank, 0.2).unwrap();
        assert_eq!(position.frontier_skill_id, "two-step-equations");

        let low = place(&course, &graph, &bank, -2.0).unwrap();
        assert_eq!(low.frontier_skill_id, "adding-integers");

        // Above every skill: frontier lands on the last practicable one.
        let high = place(&course, &graph, &bank, 2.5).unwrap();
        assert_eq!(high.frontier_skill_id, "two-step-equations");
    }

    #[test]
    fn test_gap_fill_round_trip_returns_to_frontier() {
        let (graph, bank, course) = fixture();
        let config = EngineConfig::default();
        let mut position = place(&course, &graph, &bank, 0.2).unwrap();
        let mut tiers = HashMap::new();
        tiers.insert("adding-integers".to_string(), MasteryTier::Bronze);

        // Frontier failure with an unmastered prerequisite opens the
        // excursion.
        let changes = after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "two-step-equations",
                correct: false,
                consecutive_correct: 0,
                tiers: &tiers,
                frontier_gold_completed: false,
                recent_two_skill_accuracy: 0.0,
            },
        );
        assert_eq!(
            changes,
            vec![RouteChange::EnteredGapFill {
                target_skill_id: "one-step-equations".to_string(),
                return_skill_id: "two-step-equations".to_string(),
            }]
        );
        assert_eq!(current_practice_skill(&position), "one-step-equations");

        // Two consecutive correct on the target resolve it.
        for streak in 1..=2u32 {
            let changes = after_attempt(
                &mut position,
                &course,
                &graph,
                &bank,
                &config,
                &AttemptOutcome {
                    skill_id: "one-step-equations",
                    correct: true,
                    consecutive_correct: streak,
                    tiers: &tiers,
                    frontier_gold_completed: false,
                    recent_two_skill_accuracy: 0.0,
                },
            );
            if streak == 2 {
                assert!(matches!(
                    changes[0],
                    RouteChange::ResolvedGapFill { .. }
                ));
            }
        }
        assert!(position.excursion.is_none());
        assert_eq!(position.frontier_skill_id, "two-step-equations");
    }

    #[test]
    fn test_gap_fill_request_queues_while_in_excursion() {
        let (graph, bank, course) = fixture();
        let config = EngineConfig::default();
        let mut position = place(&course, &graph, &bank, 0.2).unwrap();
        let tiers = HashMap::new(); // nothing mastered

        after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "two-step-equations",
                correct: false,
                consecutive_correct: 0,
                tiers: &tiers,
                frontier_gold_completed: false,
                recent_two_skill_accuracy: 0.0,
            },
        );
        assert_eq!(current_practice_skill(&position), "one-step-equations");

        // Failing the target with its own unmet prerequisite queues, never
        // stacks.
        let changes = after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "one-step-equations",
                correct: false,
                consecutive_correct: 0,
                tiers: &tiers,
                frontier_gold_completed: false,
                recent_two_skill_accuracy: 0.0,
            },
        );
        assert_eq!(
            changes,
            vec![RouteChange::QueuedGapFill {
                target_skill_id: "adding-integers".to_string(),
            }]
        );
        assert_eq!(position.queued_gap_fills.len(), 1);
        assert_eq!(current_practice_skill(&position), "one-step-equations");

        // Resolving the current excursion drains the queue.
        for streak in 1..=2u32 {
            after_attempt(
                &mut position,
                &course,
                &graph,
                &bank,
                &config,
                &AttemptOutcome {
                    skill_id: "one-step-equations",
                    correct: true,
                    consecutive_correct: streak,
                    tiers: &tiers,
                    frontier_gold_completed: false,
                    recent_two_skill_accuracy: 0.0,
                },
            );
        }
        assert_eq!(current_practice_skill(&position), "adding-integers");
        assert!(position.queued_gap_fills.is_empty());
    }

    #[test]
    fn test_extension_entered_and_failure_returns_without_penalty() {
        let (graph, bank, course) = fixture();
        let config = EngineConfig::default();
        let mut position = place(&course, &graph, &bank, 0.2).unwrap();
        let mut tiers = HashMap::new();
        tiers.insert("two-step-equations".to_string(), MasteryTier::Gold);

        let changes = after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "two-step-equations",
                correct: true,
                consecutive_correct: 3,
                tiers: &tiers,
                frontier_gold_completed: true,
                recent_two_skill_accuracy: 0.92,
            },
        );
        assert_eq!(
            changes,
            vec![RouteChange::EnteredExtension {
                target_skill_id: "linear-functions".to_string(),
            }]
        );

        let changes = after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "linear-functions",
                correct: false,
                consecutive_correct: 0,
                tiers: &tiers,
                frontier_gold_completed: false,
                recent_two_skill_accuracy: 0.0,
            },
        );
        assert_eq!(
            changes,
            vec![RouteChange::ReturnedFromExtension { completed: false }]
        );
        assert_eq!(position.frontier_skill_id, "two-step-equations");
        assert!(position.excursion.is_none());
    }

    #[test]
    fn test_gold_without_extension_accuracy_advances_frontier() {
        let (graph, bank, course) = fixture();
        let config = EngineConfig::default();
        let mut position = place(&course, &graph, &bank, -2.0).unwrap();
        assert_eq!(position.frontier_skill_id, "adding-integers");

        let mut tiers = HashMap::new();
        tiers.insert("adding-integers".to_string(), MasteryTier::Gold);

        let changes = after_attempt(
            &mut position,
            &course,
            &graph,
            &bank,
            &config,
            &AttemptOutcome {
                skill_id: "adding-integers",
                correct: true,
                consecutive_correct: 4,
                tiers: &tiers,
                frontier_gold_completed: true,
                recent_two_skill_accuracy: 0.6,
            },
        );
        assert_eq!(
            changes,
            vec![RouteChange::FrontierAdvanced {
                from_skill_id: "adding-integers".to_string(),
                to_skill_id: "one-step-equations".to_string(),
            }]
        );
    }
}
