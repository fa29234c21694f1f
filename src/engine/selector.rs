//! Problem selection: maximal Fisher information with tag-variety
//! tie-breaking. Pure — the caller records the resulting attempt.

use std::collections::HashSet;

use crate::engine::estimator::fisher_information;
use crate::engine::item_bank::ItemBank;
use crate::engine::types::Problem;

const INFO_TIE_EPSILON: f64 = 1e-6;

/// Recently seen problems and tags, newest last. The engine keeps one per
/// student; selection only reads it.
#[derive(Debug, Clone, Default)]
pub struct SelectionHistory {
    recent_problems: Vec<String>,
    recent_tags: Vec<String>,
    window: usize,
}

impl SelectionHistory {
    pub fn new(window: usize) -> Self {
        Self {
            recent_problems: Vec::new(),
            recent_tags: Vec::new(),
            window,
        }
    }

    pub fn record(&mut self, problem: &Problem) {
        self.recent_problems.push(problem.problem_id.clone());
        while self.recent_problems.len() > self.window {
            self.recent_problems.remove(0);
        }
        for tag in &problem.tags {
            self.recent_tags.retain(|t| t != tag);
            self.recent_tags.push(tag.clone());
        }
    }

    pub fn exclusion_set(&self) -> HashSet<String> {
        self.recent_problems.iter().cloned().collect()
    }

    /// Steps since a tag was last seen; tags never seen rank oldest.
    fn tag_staleness(&self, tag: &str) -> usize {
        match self.recent_tags.iter().rposition(|t| t == tag) {
            Some(pos) => self.recent_tags.len() - pos,
            None => usize::MAX,
        }
    }

    /// A problem's variety rank: the staleness of its freshest tag.
    /// Untagged problems rank between stale and fresh tags.
    fn variety_rank(&self, problem: &Problem) -> usize {
        problem
            .tags
            .iter()
            .map(|t| self.tag_staleness(t))
            .min()
            .unwrap_or(self.recent_tags.len() + 1)
    }
}

/// Picks the candidate whose difficulty maximizes information at the
/// current theta (at 1PL: b closest to theta), breaking near-ties toward
/// the least-recently-used tag. Honors the exclusion window via the bank's
/// fallback semantics.
pub fn next_problem<'a>(
    bank: &'a ItemBank,
    skill_id: &str,
    theta: f64,
    history: &SelectionHistory,
) -> Option<&'a Problem> {
    let excluding = history.exclusion_set();
    let candidates = bank.problems_for(skill_id, &excluding);

    let mut best: Option<(&Problem, f64, usize)> = None;
    for problem in candidates {
        let info = fisher_information(theta, problem.difficulty, 1.0);
        let variety = history.variety_rank(problem);
        let better = match best {
            None => true,
            Some((_, best_info, best_variety)) => {
                if (info - best_info).abs() <= INFO_TIE_EPSILON {
                    variety > best_variety
                } else {
                    info > best_info
                }
            }
        };
        if better {
            best = Some((problem, info, variety));
        }
    }
    best.map(|(problem, _, _)| problem)
}
