use thiserror::Error;

/// Engine error taxonomy. Content errors are fatal at load time and never
/// reach a learner mid-session; the rest are operational and map onto
/// 4xx responses at the route layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("skill graph contains a prerequisite cycle: {}", cycle.join(" -> "))]
    GraphCycle { cycle: Vec<String> },

    #[error("skill {skill_id} references unknown prerequisite {missing}")]
    OrphanedSkill { skill_id: String, missing: String },

    #[error("duplicate skill id: {0}")]
    DuplicateSkill(String),

    #[error("duplicate problem id: {0}")]
    DuplicateProblem(String),

    #[error("course {course_id} references unknown skill {skill_id}")]
    UnknownCourseSkill { course_id: String, skill_id: String },

    #[error("stale write: student state changed since read")]
    StateConflict,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("unknown problem: {0}")]
    UnknownProblem(String),

    #[error("placement session not found: {0}")]
    SessionNotFound(String),

    #[error("placement session already finalized: {0}")]
    SessionFinalized(String),

    #[error("no active quest for student {0}")]
    NoActiveQuest(String),

    #[error("quest requirements not met for skill {0}")]
    RequirementsNotMet(String),

    #[error("no pathway position for student {0}")]
    NoPathwayPosition(String),

    #[error("content error: {0}")]
    Content(String),
}

impl EngineError {
    /// Content errors abort startup; everything else is operational.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::GraphCycle { .. }
                | Self::OrphanedSkill { .. }
                | Self::DuplicateSkill(_)
                | Self::DuplicateProblem(_)
                | Self::UnknownCourseSkill { .. }
                | Self::Content(_)
        )
    }
}
