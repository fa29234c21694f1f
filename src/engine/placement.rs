//! Timed placement screener.
//!
//! One ephemeral session per (student, domain) running a grade-band
//! ladder against a fixed wall-clock budget. The budget is a pure cutoff
//! checked when an answer arrives — nothing blocks on a timer. Abandoned
//! sessions are dropped wholesale; only finalization writes any student
//! state.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::config::EngineConfig;
use crate::engine::estimator::theta_to_percentile;
use crate::engine::graph::KnowledgeGraph;
use crate::engine::item_bank::ItemBank;
use crate::engine::selector::{self, SelectionHistory};
use crate::engine::types::{GradeBand, Problem};

const START_BAND: GradeBand = GradeBand::MiddleSchool;

#[derive(Debug, Clone, Copy, Default)]
struct BandTally {
    attempted: u32,
    correct: u32,
}

impl BandTally {
    fn accuracy(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempted as f64
    }
}

#[derive(Debug, Clone)]
pub struct PlacementAttempt {
    pub problem_id: String,
    pub skill_id: String,
    pub band: GradeBand,
    pub correct: bool,
    pub response_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub theta: f64,
    pub band: GradeBand,
    pub percentile: u32,
    pub attempted: u32,
    pub correct: u32,
}

#[derive(Debug)]
pub struct PlacementSession {
    pub session_id: String,
    pub student_id: String,
    pub domain: String,
    started_at_ms: i64,
    budget_ms: i64,
    band: GradeBand,
    streak: u32,
    tallies: HashMap<GradeBand, BandTally>,
    attempts: Vec<PlacementAttempt>,
    history: SelectionHistory,
    /// Round-robin cursor over the domain's skills per band.
    rotation: usize,
    pub finalized: bool,
}

impl PlacementSession {
    pub fn new(
        session_id: String,
        student_id: String,
        domain: String,
        now_ms: i64,
        config: &EngineConfig,
    ) -> Self {
        Self {
            session_id,
            student_id,
            domain,
            started_at_ms: now_ms,
            budget_ms: config.screener_budget_seconds as i64 * 1000,
            band: START_BAND,
            streak: 0,
            tallies: HashMap::new(),
            attempts: Vec::new(),
            history: SelectionHistory::new(config.exclusion_window),
            rotation: 0,
            finalized: false,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.started_at_ms >= self.budget_ms
    }

    pub fn remaining_seconds(&self, now_ms: i64) -> u64 {
        let remaining = self.budget_ms - (now_ms - self.started_at_ms);
        (remaining.max(0) / 1000) as u64
    }

    pub fn attempts(&self) -> &[PlacementAttempt] {
        &self.attempts
    }

    pub fn current_band(&self) -> GradeBand {
        self.band
    }

    /// Picks the next screener problem: domain skills in the current band
    /// (falling back to any band if the domain has none there), rotated
    /// for coverage, with the item picked at the band midpoint theta.
    pub fn next_problem<'a>(
        &mut self,
        graph: &'a KnowledgeGraph,
        bank: &'a ItemBank,
        config: &EngineConfig,
    ) -> Option<&'a Problem> {
        let mut skills: Vec<&str> = graph
            .skills_in_category(&self.domain)
            .into_iter()
            .filter(|s| s.grade_band == self.band && bank.has_content(&s.skill_id))
            .map(|s| s.skill_id.as_str())
            .collect();
        if skills.is_empty() {
            skills = graph
                .skills_in_category(&self.domain)
                .into_iter()
                .filter(|s| bank.has_content(&s.skill_id))
                .map(|s| s.skill_id.as_str())
                .collect();
        }
        if skills.is_empty() {
            return None;
        }

        let skill_id = skills[self.rotation % skills.len()];
        self.rotation += 1;

        let theta = config.band_midpoints.midpoint(self.band);
        let problem = selector::next_problem(bank, skill_id, theta, &self.history)?;
        Some(problem)
    }

    /// Records an answer and walks the ladder: two consecutive correct
    /// step the band up, one incorrect steps it down.
    pub fn record_answer(
        &mut self,
        problem: &Problem,
        band: GradeBand,
        correct: bool,
        response_time_seconds: f64,
        config: &EngineConfig,
    ) {
        self.history.record(problem);
        self.attempts.push(PlacementAttempt {
            problem_id: problem.problem_id.clone(),
            skill_id: problem.skill_id.clone(),
            band,
            correct,
            response_time_seconds,
        });

        let tally = self.tallies.entry(band).or_default();
        tally.attempted += 1;
        if correct {
            tally.correct += 1;
            self.streak += 1;
            if self.streak >= config.screener_step_up_streak {
                if let Some(next) = self.band.next() {
                    self.band = next;
                }
                self.streak = 0;
            }
        } else {
            self.streak = 0;
            if let Some(previous) = self.band.previous() {
                self.band = previous;
            }
        }
    }

    /// Theta from the highest band sustained at or above the configured
    /// accuracy floor; absent any sustained band, the lowest band's
    /// midpoint.
    pub fn finalize(&mut self, config: &EngineConfig) -> PlacementResult {
        self.finalized = true;

        let sustained = GradeBand::ALL
            .iter()
            .rev()
            .find(|band| {
                self.tallies
                    .get(*band)
                    .map(|t| t.attempted > 0 && t.accuracy() >= config.screener_sustain_accuracy)
                    .unwrap_or(false)
            })
            .copied()
            .unwrap_or(GradeBand::PreK);

        let theta = config.band_midpoints.midpoint(sustained);
        let attempted = self.attempts.len() as u32;
        let correct = self.attempts.iter().filter(|a| a.correct).count() as u32;

        PlacementResult {
            theta,
            band: sustained,
            percentile: theta_to_percentile(theta),
            attempted,
            correct,
        }
    }
}
