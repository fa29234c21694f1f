//! Content pipeline: versioned skill/problem/course documents loaded into
//! an immutable snapshot shared read-only across requests.
//!
//! The snapshot is the single caching construct: `current()` hands out the
//! live `Arc`, and a wholesale `refresh()` replaces it when the TTL lapses.
//! Load failures at startup are fatal; a failed mid-run refresh keeps the
//! previous snapshot serving.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::graph::KnowledgeGraph;
use crate::engine::item_bank::ItemBank;
use crate::engine::types::{Course, Problem, Skill};

const TTL_JITTER_RATIO: f64 = 0.1;

#[derive(Debug, Deserialize)]
struct SkillsDocument {
    #[serde(default)]
    version: u64,
    skills: Vec<Skill>,
}

#[derive(Debug, Deserialize)]
struct ProblemsDocument {
    #[serde(default)]
    version: u64,
    problems: Vec<Problem>,
}

#[derive(Debug, Deserialize)]
struct CoursesDocument {
    #[serde(default)]
    version: u64,
    courses: Vec<Course>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    pub skills: u64,
    pub problems: u64,
    pub courses: u64,
}

#[derive(Debug)]
pub struct ContentSnapshot {
    pub graph: KnowledgeGraph,
    pub bank: ItemBank,
    pub courses: Vec<Course>,
    pub version: ContentVersion,
    pub loaded_at_ms: i64,
}

impl ContentSnapshot {
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    /// The course whose pathway carries a skill of the given category;
    /// used to map a placement domain onto a course.
    pub fn course_for_domain(&self, domain: &str) -> Option<&Course> {
        if let Some(course) = self.course(domain) {
            return Some(course);
        }
        self.courses.iter().find(|course| {
            course.skill_sequence.iter().any(|skill_id| {
                self.graph
                    .skill(skill_id)
                    .map(|s| s.category == domain)
                    .unwrap_or(false)
            })
        })
    }
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| EngineError::Content(format!("read {}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| EngineError::Content(format!("parse {}: {err}", path.display())))
}

/// Loads and validates the three content documents from a directory.
pub fn load_snapshot(dir: &Path) -> Result<ContentSnapshot, EngineError> {
    let skills_doc: SkillsDocument = read_document(&dir.join("skills.json"))?;
    let problems_doc: ProblemsDocument = read_document(&dir.join("problems.json"))?;
    let courses_doc: CoursesDocument = read_document(&dir.join("courses.json"))?;

    let graph = KnowledgeGraph::load(skills_doc.skills)?;
    let bank = ItemBank::load(problems_doc.problems, &graph)?;

    for course in &courses_doc.courses {
        for skill_id in &course.skill_sequence {
            if !graph.contains(skill_id) {
                return Err(EngineError::UnknownCourseSkill {
                    course_id: course.course_id.clone(),
                    skill_id: skill_id.clone(),
                });
            }
        }
    }

    Ok(ContentSnapshot {
        graph,
        bank,
        courses: courses_doc.courses,
        version: ContentVersion {
            skills: skills_doc.version,
            problems: problems_doc.version,
            courses: courses_doc.version,
        },
        loaded_at_ms: chrono::Utc::now().timestamp_millis(),
    })
}

struct StoreInner {
    snapshot: Arc<ContentSnapshot>,
    expires_at: Instant,
}

pub struct ContentStore {
    dir: PathBuf,
    ttl: Duration,
    inner: RwLock<StoreInner>,
}

impl ContentStore {
    /// Loads the initial snapshot; content errors here abort startup.
    pub fn open(dir: PathBuf, ttl: Duration) -> Result<Self, EngineError> {
        let snapshot = Arc::new(load_snapshot(&dir)?);
        tracing::info!(
            skills = snapshot.graph.len(),
            problems = snapshot.bank.len(),
            courses = snapshot.courses.len(),
            gaps = snapshot.bank.content_gaps().len(),
            "content snapshot loaded"
        );
        let expires_at = Instant::now() + jittered(ttl);
        Ok(Self {
            dir,
            ttl,
            inner: RwLock::new(StoreInner {
                snapshot,
                expires_at,
            }),
        })
    }

    /// The live snapshot, refreshed wholesale if the TTL has lapsed. A
    /// failed refresh keeps the old snapshot serving.
    pub fn current(&self) -> Arc<ContentSnapshot> {
        {
            let inner = self.inner.read();
            if Instant::now() < inner.expires_at {
                return Arc::clone(&inner.snapshot);
            }
        }

        match self.refresh() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "content refresh failed, serving previous snapshot");
                let mut inner = self.inner.write();
                inner.expires_at = Instant::now() + jittered(self.ttl);
                Arc::clone(&inner.snapshot)
            }
        }
    }

    pub fn refresh(&self) -> Result<Arc<ContentSnapshot>, EngineError> {
        let snapshot = Arc::new(load_snapshot(&self.dir)?);
        tracing::info!(
            skills = snapshot.graph.len(),
            problems = snapshot.bank.len(),
            "content snapshot refreshed"
        );
        let mut inner = self.inner.write();
        inner.snapshot = Arc::clone(&snapshot);
        inner.expires_at = Instant::now() + jittered(self.ttl);
        Ok(snapshot)
    }
}

fn jittered(ttl: Duration) -> Duration {
    if ttl.is_zero() {
        return ttl;
    }
    let base_ms = ttl.as_millis() as f64;
    let mut rng = rand::rng();
    let factor = rng.random_range(1.0 - TTL_JITTER_RATIO..=1.0 + TTL_JITTER_RATIO);
    Duration::from_millis((base_ms * factor).round().max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::GradeBand;

    fn write_content(dir: &Path) {
        let skills = serde_json::json!({
            "version": 1,
            "skills": [
                {
                    "skillId": "adding-integers",
                    "displayName": "Adding Integers",
                    "gradeBand": "middle-school",
                    "category": "equations",
                    "difficulty": -0.5
                },
                {
                    "skillId": "one-step-equations",
                    "displayName": "One-Step Equations",
                    "gradeBand": "middle-school",
                    "category": "equations",
                    "difficulty": 0.0,
                    "prerequisites": ["adding-integers"]
                }
            ]
        });
        let problems = serde_json::json!({
            "version": 2,
            "problems": [
                {
                    "problemId": "p1",
                    "skillId": "adding-integers",
                    "difficulty": -0.5,
                    "prompt": "-3 + 5 = ?",
                    "answer": "2"
                }
            ]
        });
        let courses = serde_json::json!({
            "version": 1,
            "courses": [
                {
                    "courseId": "pre-algebra",
                    "displayName": "Pre-Algebra",
                    "gradeBand": "middle-school",
                    "skillSequence": ["adding-integers", "one-step-equations"]
                }
            ]
        });
        std::fs::write(dir.join("skills.json"), skills.to_string()).unwrap();
        std::fs::write(dir.join("problems.json"), problems.to_string()).unwrap();
        std::fs::write(dir.join("courses.json"), courses.to_string()).unwrap();
    }

    #[test]
    fn test_load_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());

        let snapshot = load_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.graph.len(), 2);
        assert_eq!(snapshot.bank.len(), 1);
        assert_eq!(snapshot.version.problems, 2);
        assert_eq!(
            snapshot.bank.content_gaps(),
            &["one-step-equations".to_string()]
        );
        assert_eq!(
            snapshot.graph.skill("adding-integers").unwrap().grade_band,
            GradeBand::MiddleSchool
        );
        assert_eq!(
            snapshot.course_for_domain("equations").unwrap().course_id,
            "pre-algebra"
        );
    }

    #[test]
    fn test_course_with_unknown_skill_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());
        let courses = serde_json::json!({
            "courses": [{
                "courseId": "broken",
                "displayName": "Broken",
                "gradeBand": "middle-school",
                "skillSequence": ["ghost-skill"]
            }]
        });
        std::fs::write(dir.path().join("courses.json"), courses.to_string()).unwrap();

        let err = load_snapshot(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCourseSkill { .. }));
    }

    #[test]
    fn test_store_serves_previous_snapshot_on_broken_refresh() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());

        let store = ContentStore::open(dir.path().to_path_buf(), Duration::from_secs(0)).unwrap();
        std::fs::write(dir.path().join("skills.json"), "{ not json").unwrap();

        // TTL of zero forces a refresh attempt, which fails; the old
        // snapshot keeps serving.
        let snapshot = store.current();
        assert_eq!(snapshot.graph.len(), 2);
    }
}
