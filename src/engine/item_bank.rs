//! Problem bank: per-skill indexes over the active problem set.
//!
//! Problems referencing unknown or inactive skills are dropped at load and
//! logged; a skill left with zero problems is a content gap the router
//! skips, never a runtime error.

use std::collections::{HashMap, HashSet};

use crate::engine::error::EngineError;
use crate::engine::graph::KnowledgeGraph;
use crate::engine::types::Problem;

#[derive(Debug, Clone)]
pub struct ItemBank {
    problems: HashMap<String, Problem>,
    by_skill: HashMap<String, Vec<String>>,
    /// Active skills with no usable problems, detected at load.
    content_gaps: Vec<String>,
}

impl ItemBank {
    pub fn load(problems: Vec<Problem>, graph: &KnowledgeGraph) -> Result<Self, EngineError> {
        let mut seen: HashSet<String> = HashSet::with_capacity(problems.len());
        for problem in &problems {
            if !seen.insert(problem.problem_id.clone()) {
                return Err(EngineError::DuplicateProblem(problem.problem_id.clone()));
            }
        }

        let mut kept: HashMap<String, Problem> = HashMap::new();
        let mut by_skill: HashMap<String, Vec<String>> = HashMap::new();
        for problem in problems {
            if !problem.is_active {
                continue;
            }
            let skill_active = graph
                .skill(&problem.skill_id)
                .map(|s| s.is_active)
                .unwrap_or(false);
            if !skill_active {
                tracing::warn!(
                    problem_id = %problem.problem_id,
                    skill_id = %problem.skill_id,
                    "dropping problem for unknown or inactive skill"
                );
                continue;
            }
            by_skill
                .entry(problem.skill_id.clone())
                .or_default()
                .push(problem.problem_id.clone());
            kept.insert(problem.problem_id.clone(), problem);
        }

        let content_gaps: Vec<String> = graph
            .active_skills()
            .filter(|s| !by_skill.contains_key(&s.skill_id))
            .map(|s| s.skill_id.clone())
            .collect();
        for skill_id in &content_gaps {
            tracing::warn!(%skill_id, "skill has no active problems, flagged for content review");
        }

        Ok(Self {
            problems: kept,
            by_skill,
            content_gaps,
        })
    }

    pub fn problem(&self, problem_id: &str) -> Option<&Problem> {
        self.problems.get(problem_id)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn has_content(&self, skill_id: &str) -> bool {
        self.by_skill
            .get(skill_id)
            .map(|ids| !ids.is_empty())
            .unwrap_or(false)
    }

    pub fn content_gaps(&self) -> &[String] {
        &self.content_gaps
    }

    /// Active problems for a skill minus the exclusion window. Falls back
    /// to the full set when exclusion would empty the pool, so selection
    /// never blocks progress.
    pub fn problems_for(&self, skill_id: &str, excluding: &HashSet<String>) -> Vec<&Problem> {
        let Some(ids) = self.by_skill.get(skill_id) else {
            return Vec::new();
        };
        let fresh: Vec<&Problem> = ids
            .iter()
            .filter(|id| !excluding.contains(id.as_str()))
            .filter_map(|id| self.problems.get(id))
            .collect();
        if !fresh.is_empty() {
            return fresh;
        }
        ids.iter().filter_map(|id| self.problems.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{AnswerType, GradeBand, Skill};

    fn skill(id: &str, active: bool) -> Skill {
        Skill {
            skill_id: id.to_string(),
            display_name: id.to_string(),
            grade_band: GradeBand::MiddleSchool,
            category: "equations".to_string(),
            difficulty: 0.0,
            discrimination: None,
            prerequisites: Vec::new(),
            unlocks: Vec::new(),
            is_active: active,
        }
    }

    fn problem(id: &str, skill_id: &str) -> Problem {
        Problem {
            problem_id: id.to_string(),
            skill_id: skill_id.to_string(),
            secondary_skill_ids: Vec::new(),
            difficulty: 0.0,
            answer_type: AnswerType::Numeric,
            prompt: format!("solve {id}"),
            answer: "4".to_string(),
            accepted_answers: Vec::new(),
            tags: Vec::new(),
            fluency: None,
            is_active: true,
        }
    }

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::load(vec![
            skill("live", true),
            skill("dormant", false),
            skill("empty", true),
        ])
        .unwrap()
    }

    #[test]
    fn test_inactive_skill_problems_dropped() {
        let bank = ItemBank::load(
            vec![problem("p1", "live"), problem("p2", "dormant"), problem("p3", "ghost")],
            &graph(),
        )
        .unwrap();

        assert!(bank.has_content("live"));
        assert!(!bank.has_content("dormant"));
        assert!(!bank.has_content("ghost"));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_content_gap_flagged_not_fatal() {
        let bank = ItemBank::load(vec![problem("p1", "live")], &graph()).unwrap();
        assert_eq!(bank.content_gaps(), &["empty".to_string()]);
    }

    #[test]
    fn test_exclusion_window_with_fallback() {
        let bank = ItemBank::load(
            vec![problem("p1", "live"), problem("p2", "live")],
            &graph(),
        )
        .unwrap();

        let mut excluding = HashSet::new();
        excluding.insert("p1".to_string());
        let fresh = bank.problems_for("live", &excluding);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].problem_id, "p2");

        // Exhausted window falls back to the full pool rather than
        // stalling the student.
        excluding.insert("p2".to_string());
        let fallback = bank.problems_for("live", &excluding);
        assert_eq!(fallback.len(), 2);
    }

    #[test]
    fn test_duplicate_problem_rejected() {
        let err = ItemBank::load(vec![problem("p1", "live"), problem("p1", "live")], &graph())
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateProblem(id) if id == "p1"));
    }
}
