//! Skill graph: prerequisite DAG validation and traversal.
//!
//! Loaded once per content snapshot and shared read-only. Cycles and
//! dangling prerequisite references are load-time fatal; everything here
//! after `load` is infallible lookup.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::error::EngineError;
use crate::engine::types::{GradeBand, MasteryTier, Skill};

#[derive(Debug, Clone)]
pub struct KnowledgeGraph {
    skills: HashMap<String, Skill>,
    /// Insertion order of active skills, for deterministic iteration.
    order: Vec<String>,
}

impl KnowledgeGraph {
    /// Validates the skill set and builds the `unlocks` inverse index.
    pub fn load(mut skills: Vec<Skill>) -> Result<Self, EngineError> {
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(skills.len());
        for (idx, skill) in skills.iter().enumerate() {
            if by_id.insert(skill.skill_id.clone(), idx).is_some() {
                return Err(EngineError::DuplicateSkill(skill.skill_id.clone()));
            }
        }

        for skill in &skills {
            for prereq in &skill.prerequisites {
                if !by_id.contains_key(prereq) {
                    return Err(EngineError::OrphanedSkill {
                        skill_id: skill.skill_id.clone(),
                        missing: prereq.clone(),
                    });
                }
            }
        }

        // unlocks is always derived, never trusted from the documents.
        for skill in skills.iter_mut() {
            skill.unlocks.clear();
        }
        let mut unlocks: HashMap<String, Vec<String>> = HashMap::new();
        for skill in &skills {
            for prereq in &skill.prerequisites {
                unlocks
                    .entry(prereq.clone())
                    .or_default()
                    .push(skill.skill_id.clone());
            }
        }
        for skill in skills.iter_mut() {
            if let Some(mut dependents) = unlocks.remove(&skill.skill_id) {
                dependents.sort();
                skill.unlocks = dependents;
            }
        }

        let graph = Self {
            order: skills.iter().map(|s| s.skill_id.clone()).collect(),
            skills: skills
                .into_iter()
                .map(|s| (s.skill_id.clone(), s))
                .collect(),
        };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// DFS over prerequisites with an explicit path so the offending cycle
    /// can be named in the error.
    fn check_acyclic(&self) -> Result<(), EngineError> {
        let mut done: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();

        for start in &self.order {
            if done.contains(start.as_str()) {
                continue;
            }
            self.visit(start, &mut done, &mut path, &mut on_path)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        skill_id: &'a str,
        done: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        on_path: &mut HashSet<&'a str>,
    ) -> Result<(), EngineError> {
        if on_path.contains(skill_id) {
            let start = path.iter().position(|s| *s == skill_id).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(skill_id.to_string());
            return Err(EngineError::GraphCycle { cycle });
        }
        if done.contains(skill_id) {
            return Ok(());
        }

        path.push(skill_id);
        on_path.insert(skill_id);
        if let Some(skill) = self.skills.get(skill_id) {
            for prereq in &skill.prerequisites {
                self.visit(prereq, done, path, on_path)?;
            }
        }
        path.pop();
        on_path.remove(skill_id);
        done.insert(skill_id);
        Ok(())
    }

    pub fn skill(&self, skill_id: &str) -> Option<&Skill> {
        self.skills.get(skill_id)
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.skills.contains_key(skill_id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn active_skills(&self) -> impl Iterator<Item = &Skill> {
        self.order
            .iter()
            .filter_map(|id| self.skills.get(id))
            .filter(|s| s.is_active)
    }

    pub fn skills_in_band(&self, band: GradeBand) -> Vec<&Skill> {
        self.active_skills()
            .filter(|s| s.grade_band == band)
            .collect()
    }

    pub fn skills_in_category(&self, category: &str) -> Vec<&Skill> {
        self.active_skills()
            .filter(|s| s.category == category)
            .collect()
    }

    /// True iff every prerequisite has reached `required_tier`.
    pub fn prerequisites_met(
        &self,
        skill_id: &str,
        tiers: &HashMap<String, MasteryTier>,
        required_tier: MasteryTier,
    ) -> bool {
        let Some(skill) = self.skills.get(skill_id) else {
            return false;
        };
        skill.prerequisites.iter().all(|prereq| {
            tiers
                .get(prereq)
                .map(|tier| *tier >= required_tier)
                .unwrap_or(false)
        })
    }

    /// First prerequisite of `skill_id` below `required_tier`, in authored
    /// order. Drives gap-fill target selection.
    pub fn first_unmet_prerequisite(
        &self,
        skill_id: &str,
        tiers: &HashMap<String, MasteryTier>,
        required_tier: MasteryTier,
    ) -> Option<&str> {
        let skill = self.skills.get(skill_id)?;
        skill
            .prerequisites
            .iter()
            .find(|prereq| {
                tiers
                    .get(prereq.as_str())
                    .map(|tier| *tier < required_tier)
                    .unwrap_or(true)
            })
            .map(|s| s.as_str())
    }

    /// Reachable closure via `unlocks`, excluding the start skill. Used to
    /// propagate unlock notifications when a gold tier completes.
    pub fn downstream_of(&self, skill_id: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut out: Vec<String> = Vec::new();

        queue.push_back(skill_id);
        seen.insert(skill_id);
        while let Some(current) = queue.pop_front() {
            if let Some(skill) = self.skills.get(current) {
                for next in &skill.unlocks {
                    if seen.insert(next.as_str()) {
                        out.push(next.clone());
                        queue.push_back(next.as_str());
                    }
                }
            }
        }
        out
    }
}
