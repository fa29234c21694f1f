//! Engine facade: owns per-student state, placement sessions and the
//! append-only attempt log, and exposes the public operations.
//!
//! Write protocol: validate first, append the attempt to the log, then
//! compute the derived mutation against a cloned record and commit it only
//! if the record version is unchanged. A stale commit is retried once from
//! fresh state before surfacing a conflict. Derived state can always be
//! rebuilt by replaying the log.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::content::{ContentSnapshot, ContentStore};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::estimator;
use crate::engine::mastery::{
    self, FluencyVerdict, LessonContextSource, NoopLessonContext, QuestProgress,
};
use crate::engine::pathway::{self, AttemptOutcome, RouteChange};
use crate::engine::placement::{PlacementResult, PlacementSession};
use crate::engine::selector::{self, SelectionHistory};
use crate::engine::types::{
    Attempt, MasteryQuest, MasteryTier, PathwayPosition, Problem, QuestStatus, StudentSkillState,
};

const RECENT_SKILL_WINDOW: usize = 5;

/// Everything the engine tracks for one student. Cloneable so derived
/// mutations can be computed off to the side and committed atomically.
#[derive(Debug, Clone, Default)]
struct StudentRecord {
    version: u64,
    skills: HashMap<String, StudentSkillState>,
    quests: HashMap<String, MasteryQuest>,
    badges: Vec<EarnedBadge>,
    pathway: Option<PathwayPosition>,
    history: SelectionHistory,
    /// Finalized placement theta per domain.
    placement_thetas: HashMap<String, f64>,
    /// Distinct recently practiced skills, most recent last.
    recent_skills: VecDeque<String>,
}

impl StudentRecord {
    fn tier_map(&self) -> HashMap<String, MasteryTier> {
        self.skills
            .iter()
            .map(|(id, state)| (id.clone(), state.mastery_tier))
            .collect()
    }

    fn touch_recent_skill(&mut self, skill_id: &str) {
        self.recent_skills.retain(|s| s != skill_id);
        self.recent_skills.push_back(skill_id.to_string());
        while self.recent_skills.len() > RECENT_SKILL_WINDOW {
            self.recent_skills.pop_front();
        }
    }

    /// Mean accuracy over the two most recently practiced skills.
    fn recent_two_skill_accuracy(&self) -> f64 {
        let recent: Vec<f64> = self
            .recent_skills
            .iter()
            .rev()
            .take(2)
            .filter_map(|id| self.skills.get(id))
            .map(|s| s.accuracy())
            .collect();
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().sum::<f64>() / recent.len() as f64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub skill_id: String,
    pub tier: MasteryTier,
    pub earned_at: i64,
}

/// Problem as handed to a learner: no answer key attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCard {
    pub problem_id: String,
    pub skill_id: String,
    pub prompt: String,
    pub answer_type: String,
    pub difficulty: f64,
    pub tags: Vec<String>,
}

impl ProblemCard {
    fn of(problem: &Problem) -> Self {
        Self {
            problem_id: problem.problem_id.clone(),
            skill_id: problem.skill_id.clone(),
            prompt: problem.prompt.clone(),
            answer_type: problem.answer_type.as_str().to_string(),
            difficulty: problem.difficulty,
            tags: problem.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStart {
    pub session_id: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<ProblemCard>,
    pub remaining_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum PlacementStep {
    #[serde(rename = "continue")]
    Continue {
        correct: bool,
        problem: ProblemCard,
        remaining_seconds: u64,
    },
    #[serde(rename = "finalized")]
    Finalized {
        correct: bool,
        result: PlacementResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        pathway: Option<PathwayPosition>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeOutcome {
    pub correct: bool,
    pub theta: f64,
    pub standard_error: f64,
    pub quest: QuestProgress,
    pub fluency: FluencyVerdict,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route_changes: Vec<RouteChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_problem: Option<ProblemCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub badge: EarnedBadge,
    pub xp_bonus: u32,
    pub message: String,
    pub unlocked_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_quest: Option<QuestProgress>,
}

pub struct MasteryEngine {
    config: EngineConfig,
    content: Arc<ContentStore>,
    students: RwLock<HashMap<String, StudentRecord>>,
    sessions: RwLock<HashMap<String, PlacementSession>>,
    attempt_log: RwLock<HashMap<String, Vec<Attempt>>>,
    lesson_context: Arc<dyn LessonContextSource>,
}

impl MasteryEngine {
    pub fn new(config: EngineConfig, content: Arc<ContentStore>) -> Self {
        Self::with_lesson_context(config, content, Arc::new(NoopLessonContext))
    }

    pub fn with_lesson_context(
        config: EngineConfig,
        content: Arc<ContentStore>,
        lesson_context: Arc<dyn LessonContextSource>,
    ) -> Self {
        Self {
            config,
            content,
            students: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            attempt_log: RwLock::new(HashMap::new()),
            lesson_context,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn new_record(&self) -> StudentRecord {
        StudentRecord {
            history: SelectionHistory::new(self.config.exclusion_window),
            ..StudentRecord::default()
        }
    }

    pub fn content(&self) -> Arc<ContentSnapshot> {
        self.content.current()
    }

    pub async fn attempt_count(&self, student_id: &str) -> usize {
        self.attempt_log
            .read()
            .await
            .get(student_id)
            .map(|log| log.len())
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    pub async fn start_placement(
        &self,
        student_id: &str,
        domain: &str,
    ) -> Result<PlacementStart, EngineError> {
        validate_id(student_id, "studentId")?;
        validate_id(domain, "domain")?;

        let snapshot = self.content.current();
        if snapshot.graph.skills_in_category(domain).is_empty() {
            return Err(EngineError::Validation(format!(
                "domain has no active skills: {domain}"
            )));
        }

        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut session = PlacementSession::new(
            Uuid::new_v4().to_string(),
            student_id.to_string(),
            domain.to_string(),
            now_ms,
            &self.config,
        );
        let problem = session
            .next_problem(&snapshot.graph, &snapshot.bank, &self.config)
            .map(ProblemCard::of);

        let start = PlacementStart {
            session_id: session.session_id.clone(),
            domain: domain.to_string(),
            problem,
            remaining_seconds: session.remaining_seconds(now_ms),
        };

        let mut sessions = self.sessions.write().await;
        // One live session per (student, domain); restarting replaces it.
        sessions.retain(|_, s| !(s.student_id == student_id && s.domain == domain));
        sessions.insert(session.session_id.clone(), session);

        tracing::info!(%student_id, %domain, session_id = %start.session_id, "placement started");
        Ok(start)
    }

    pub async fn submit_placement_answer(
        &self,
        session_id: &str,
        problem_id: &str,
        answer: &str,
        response_time_seconds: f64,
    ) -> Result<PlacementStep, EngineError> {
        validate_answer(answer)?;
        validate_response_time(response_time_seconds)?;

        let snapshot = self.content.current();
        let problem = snapshot
            .bank
            .problem(problem_id)
            .ok_or_else(|| EngineError::UnknownProblem(problem_id.to_string()))?;
        let correct = check_answer(problem, answer);
        let now_ms = chrono::Utc::now().timestamp_millis();

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        if session.finalized {
            return Err(EngineError::SessionFinalized(session_id.to_string()));
        }

        let band = session.current_band();
        session.record_answer(problem, band, correct, response_time_seconds, &self.config);
        self.append_attempt(&session.student_id.clone(), problem, correct, response_time_seconds)
            .await;

        let expired = session.is_expired(now_ms);
        let next = if expired {
            None
        } else {
            session
                .next_problem(&snapshot.graph, &snapshot.bank, &self.config)
                .map(ProblemCard::of)
        };

        match next {
            Some(problem) => Ok(PlacementStep::Continue {
                correct,
                problem,
                remaining_seconds: session.remaining_seconds(now_ms),
            }),
            None => {
                // Budget spent (or the domain pool ran dry): finalize and
                // commit theta into student state in one step.
                let result = session.finalize(&self.config);
                let session = sessions.remove(session_id).expect("session present");
                drop(sessions);

                let pathway = self
                    .commit_placement(&session, &result, &snapshot)
                    .await?;
                tracing::info!(
                    student_id = %session.student_id,
                    domain = %session.domain,
                    theta = result.theta,
                    band = result.band.as_str(),
                    "placement finalized"
                );
                Ok(PlacementStep::Finalized {
                    correct,
                    result,
                    pathway,
                })
            }
        }
    }

    /// Drops an unfinished session without touching student state.
    pub async fn abandon_placement(&self, session_id: &str) -> Result<(), EngineError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }

    /// Writes the finalized theta into every attempted skill plus the
    /// domain default, then maps the student onto a course pathway.
    async fn commit_placement(
        &self,
        session: &PlacementSession,
        result: &PlacementResult,
        snapshot: &ContentSnapshot,
    ) -> Result<Option<PathwayPosition>, EngineError> {
        let mut students = self.students.write().await;
        let record = students
            .entry(session.student_id.clone())
            .or_insert_with(|| self.new_record());

        record
            .placement_thetas
            .insert(session.domain.clone(), result.theta);
        for attempt in session.attempts() {
            let state = record
                .skills
                .entry(attempt.skill_id.clone())
                .or_insert_with(|| {
                    StudentSkillState::new(&attempt.skill_id, result.theta, self.config.se0)
                });
            state.theta = result.theta;
            state.standard_error = estimator::standard_error(self.config.se0, state.attempts_count);
        }

        let pathway = snapshot.course_for_domain(&session.domain).and_then(|course| {
            pathway::place(course, &snapshot.graph, &snapshot.bank, result.theta)
        });
        if let Some(position) = &pathway {
            record.pathway = Some(position.clone());
        }
        record.version += 1;
        Ok(pathway)
    }

    // ------------------------------------------------------------------
    // Practice
    // ------------------------------------------------------------------

    pub async fn submit_practice_attempt(
        &self,
        student_id: &str,
        problem_id: &str,
        answer: &str,
        response_time_seconds: f64,
    ) -> Result<PracticeOutcome, EngineError> {
        validate_id(student_id, "studentId")?;
        validate_answer(answer)?;
        validate_response_time(response_time_seconds)?;

        let snapshot = self.content.current();
        let problem = snapshot
            .bank
            .problem(problem_id)
            .ok_or_else(|| EngineError::UnknownProblem(problem_id.to_string()))?;
        let correct = check_answer(problem, answer);

        // The log entry is durable before any derived state moves.
        self.append_attempt(student_id, problem, correct, response_time_seconds)
            .await;

        // Optimistic commit with one retry from fresh state.
        for _ in 0..2 {
            let (base_version, working) = {
                let students = self.students.read().await;
                let record = students
                    .get(student_id)
                    .cloned()
                    .unwrap_or_else(|| self.new_record());
                (record.version, record)
            };

            let (mutated, outcome) =
                self.apply_practice(working, problem, correct, response_time_seconds, &snapshot);

            let mut students = self.students.write().await;
            let entry = students.entry(student_id.to_string()).or_default();
            if entry.version != base_version {
                tracing::warn!(%student_id, "stale practice write, retrying");
                continue;
            }
            let mut committed = mutated;
            committed.version = base_version + 1;
            *entry = committed;
            return Ok(outcome);
        }

        Err(EngineError::StateConflict)
    }

    /// Pure derived-state transition for one practice attempt. Operates on
    /// a cloned record; the caller commits it.
    fn apply_practice(
        &self,
        mut record: StudentRecord,
        problem: &Problem,
        correct: bool,
        response_time_seconds: f64,
        snapshot: &ContentSnapshot,
    ) -> (StudentRecord, PracticeOutcome) {
        let skill = snapshot
            .graph
            .skill(&problem.skill_id)
            .expect("bank only holds problems for known skills");
        let now_ms = chrono::Utc::now().timestamp_millis();

        // Skill state, created lazily from the fallback theta chain.
        let placement_theta = record.placement_thetas.get(&skill.category).copied();
        let band_midpoint = self.config.band_midpoints.midpoint(skill.grade_band);
        let state = record
            .skills
            .entry(problem.skill_id.clone())
            .or_insert_with(|| {
                StudentSkillState::new(
                    &problem.skill_id,
                    estimator::initial_theta(placement_theta, band_midpoint),
                    self.config.se0,
                )
            });

        let update = estimator::apply_attempt(
            state,
            correct,
            problem.difficulty,
            skill.discrimination_or_default(),
            &self.config,
        );
        state.push_response_time(response_time_seconds);
        state.last_practiced_at = Some(now_ms);
        let consecutive_correct = state.consecutive_correct;
        let skill_tier_before = state.mastery_tier;

        // Quest bookkeeping: one active quest per skill, created on first
        // practice at the tier after current mastery.
        let quest = record
            .quests
            .entry(problem.skill_id.clone())
            .or_insert_with(|| {
                let tier = skill_tier_before.next().unwrap_or(MasteryTier::Gold);
                let requirement = self
                    .config
                    .tier_requirements
                    .for_tier(tier)
                    .unwrap_or(self.config.tier_requirements.gold);
                let quest = MasteryQuest::new(
                    &problem.skill_id,
                    tier,
                    requirement.required_problems,
                    requirement.required_accuracy,
                );
                self.lesson_context
                    .on_quest_active(&problem.skill_id, &QuestProgress::of(&quest));
                quest
            });
        let quest_update = mastery::record_quest_attempt(quest, correct);
        let frontier_gold_completed = quest_update.completed_tier == Some(MasteryTier::Gold)
            || (quest.tier == MasteryTier::Gold && quest.status == QuestStatus::Completed);

        record.touch_recent_skill(&problem.skill_id);

        // Fluency is advisory; it never feeds the mastery decision.
        let envelope = mastery::envelope_for(problem, &self.config);
        let fluency = mastery::classify_response_time(response_time_seconds, &envelope);

        // Route, then promote whatever the route changes imply.
        let mut route_changes = Vec::new();
        if let Some(mut position) = record.pathway.take() {
            let tiers = record.tier_map();
            let course = snapshot.course(&position.course_id);
            if let Some(course) = course {
                let outcome = AttemptOutcome {
                    skill_id: &problem.skill_id,
                    correct,
                    consecutive_correct,
                    tiers: &tiers,
                    frontier_gold_completed: frontier_gold_completed
                        && position.frontier_skill_id == problem.skill_id,
                    recent_two_skill_accuracy: record.recent_two_skill_accuracy(),
                };
                route_changes = pathway::after_attempt(
                    &mut position,
                    course,
                    &snapshot.graph,
                    &snapshot.bank,
                    &self.config,
                    &outcome,
                );
            }
            record.pathway = Some(position);

            for change in &route_changes {
                if let RouteChange::ResolvedGapFill {
                    target_skill_id, ..
                } = change
                {
                    // Gap filled: the target counts as mastered at least
                    // bronze.
                    if let Some(target) = record.skills.get_mut(target_skill_id) {
                        if target.mastery_tier < MasteryTier::Bronze {
                            target.mastery_tier = MasteryTier::Bronze;
                        }
                    }
                }
            }
        }

        record.history.record(problem);

        // Next item for whatever skill the student should practice now.
        let practice_skill = record
            .pathway
            .as_ref()
            .map(|p| pathway::current_practice_skill(p).to_string())
            .unwrap_or_else(|| problem.skill_id.clone());
        let practice_theta = record
            .skills
            .get(&practice_skill)
            .map(|s| s.theta)
            .unwrap_or(update.theta_after);
        let next_problem = selector::next_problem(
            &snapshot.bank,
            &practice_skill,
            practice_theta,
            &record.history,
        )
        .map(ProblemCard::of);

        let outcome = PracticeOutcome {
            correct,
            theta: update.theta_after,
            standard_error: update.standard_error,
            quest: quest_update.progress,
            fluency,
            route_changes,
            next_problem,
        };
        (record, outcome)
    }

    // ------------------------------------------------------------------
    // Quests & pathway queries
    // ------------------------------------------------------------------

    pub async fn get_active_quest(
        &self,
        student_id: &str,
    ) -> Result<Option<QuestProgress>, EngineError> {
        validate_id(student_id, "studentId")?;
        let students = self.students.read().await;
        let Some(record) = students.get(student_id) else {
            return Ok(None);
        };

        // Prefer the quest on the skill currently being practiced.
        if let Some(position) = &record.pathway {
            let skill_id = pathway::current_practice_skill(position);
            if let Some(quest) = record.quests.get(skill_id) {
                return Ok(Some(QuestProgress::of(quest)));
            }
        }
        Ok(record
            .quests
            .values()
            .find(|q| q.status == QuestStatus::Active)
            .map(QuestProgress::of))
    }

    /// Claims a completed quest: requirements are verified server-side
    /// regardless of what any client displayed.
    pub async fn complete_quest(
        &self,
        student_id: &str,
        skill_id: &str,
    ) -> Result<QuestCompletion, EngineError> {
        validate_id(student_id, "studentId")?;
        validate_id(skill_id, "skillId")?;
        let snapshot = self.content.current();
        if !snapshot.graph.contains(skill_id) {
            return Err(EngineError::UnknownSkill(skill_id.to_string()));
        }

        let mut students = self.students.write().await;
        let record = students
            .get_mut(student_id)
            .ok_or_else(|| EngineError::NoActiveQuest(student_id.to_string()))?;
        let quest = record
            .quests
            .get(skill_id)
            .ok_or_else(|| EngineError::NoActiveQuest(student_id.to_string()))?
            .clone();
        if !quest.meets_requirements() {
            return Err(EngineError::RequirementsNotMet(skill_id.to_string()));
        }

        let earned_tier = quest.tier;
        let previous_tier = record
            .skills
            .get(skill_id)
            .map(|s| s.mastery_tier)
            .unwrap_or(MasteryTier::None);
        let now_ms = chrono::Utc::now().timestamp_millis();

        let state = record
            .skills
            .entry(skill_id.to_string())
            .or_insert_with(|| {
                StudentSkillState::new(
                    skill_id,
                    self.config.band_midpoints.midpoint(
                        snapshot
                            .graph
                            .skill(skill_id)
                            .map(|s| s.grade_band)
                            .unwrap_or(crate::engine::types::GradeBand::MiddleSchool),
                    ),
                    self.config.se0,
                )
            });
        if state.mastery_tier < earned_tier {
            state.mastery_tier = earned_tier;
        }

        let badge = EarnedBadge {
            skill_id: skill_id.to_string(),
            tier: earned_tier,
            earned_at: now_ms,
        };
        record.badges.push(badge.clone());

        // Next tier opens immediately; gold is terminal and instead
        // propagates unlock eligibility downstream.
        let next_quest = mastery::next_tier_quest(skill_id, earned_tier, &self.config);
        let unlocked_skills = if earned_tier.is_terminal() {
            let tiers = record.tier_map();
            mastery::unlock_candidates(&snapshot.graph, skill_id)
                .into_iter()
                .filter(|candidate| {
                    snapshot.graph.prerequisites_met(
                        candidate,
                        &tiers,
                        self.config.prerequisite_tier,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        let next_progress = next_quest.as_ref().map(QuestProgress::of);
        match next_quest {
            Some(quest) => {
                self.lesson_context
                    .on_quest_active(skill_id, &QuestProgress::of(&quest));
                record.quests.insert(skill_id.to_string(), quest);
            }
            None => {
                // Gold stays in place, completed: further attempts are
                // free practice.
                record.quests.insert(skill_id.to_string(), quest);
            }
        }
        record.version += 1;

        tracing::info!(
            %student_id,
            %skill_id,
            tier = earned_tier.as_str(),
            unlocked = unlocked_skills.len(),
            "badge earned"
        );

        Ok(QuestCompletion {
            badge,
            xp_bonus: self.config.badge_xp_bonus,
            message: mastery::tier_upgrade_message(previous_tier, earned_tier).to_string(),
            unlocked_skills,
            next_quest: next_progress,
        })
    }

    pub async fn get_pathway_position(
        &self,
        student_id: &str,
    ) -> Result<PathwayPosition, EngineError> {
        validate_id(student_id, "studentId")?;
        let students = self.students.read().await;
        students
            .get(student_id)
            .and_then(|r| r.pathway.clone())
            .ok_or_else(|| EngineError::NoPathwayPosition(student_id.to_string()))
    }

    /// Explicit remediation reset: the only path that clears a
    /// StudentSkillState.
    pub async fn reset_skill(&self, student_id: &str, skill_id: &str) -> Result<(), EngineError> {
        validate_id(student_id, "studentId")?;
        validate_id(skill_id, "skillId")?;
        let mut students = self.students.write().await;
        let record = students
            .get_mut(student_id)
            .ok_or_else(|| EngineError::UnknownSkill(skill_id.to_string()))?;
        record.skills.remove(skill_id);
        record.quests.remove(skill_id);
        record.version += 1;
        tracing::info!(%student_id, %skill_id, "skill state reset for remediation");
        Ok(())
    }

    async fn append_attempt(
        &self,
        student_id: &str,
        problem: &Problem,
        correct: bool,
        response_time_seconds: f64,
    ) {
        let attempt = Attempt {
            attempt_id: Uuid::new_v4().to_string(),
            problem_id: problem.problem_id.clone(),
            skill_id: problem.skill_id.clone(),
            correct,
            response_time_seconds,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.attempt_log
            .write()
            .await
            .entry(student_id.to_string())
            .or_default()
            .push(attempt);
    }
}

// ----------------------------------------------------------------------
// Validation & answer checking
// ----------------------------------------------------------------------

fn validate_id(value: &str, field: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_answer(answer: &str) -> Result<(), EngineError> {
    if answer.trim().is_empty() {
        return Err(EngineError::Validation("answer must not be empty".to_string()));
    }
    Ok(())
}

fn validate_response_time(seconds: f64) -> Result<(), EngineError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(EngineError::Validation(
            "responseTimeSeconds must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "")
}

/// Canonical answer plus accepted equivalents; numeric answers compare by
/// value so "2.0" matches "2".
pub fn check_answer(problem: &Problem, submitted: &str) -> bool {
    let submitted_norm = normalize_answer(submitted);
    let mut candidates = Vec::with_capacity(1 + problem.accepted_answers.len());
    candidates.push(problem.answer.as_str());
    candidates.extend(problem.accepted_answers.iter().map(String::as_str));

    if let Ok(submitted_value) = submitted_norm.parse::<f64>() {
        for candidate in &candidates {
            if let Ok(value) = normalize_answer(candidate).parse::<f64>() {
                if (value - submitted_value).abs() < 1e-9 {
                    return true;
                }
            }
        }
    }

    candidates
        .iter()
        .any(|candidate| normalize_answer(candidate) == submitted_norm)
}
