//! Demo content seed.
//!
//! Writes a small self-consistent skill graph, problem bank and course set
//! so the server can boot without authored content. Real deployments point
//! CONTENT_DIR at documents produced by the authoring tooling; existing
//! files are never overwritten.

use std::path::Path;

use serde_json::json;

use crate::engine::error::EngineError;

pub fn ensure_content(dir: &Path) -> Result<(), EngineError> {
    let skills_path = dir.join("skills.json");
    let problems_path = dir.join("problems.json");
    let courses_path = dir.join("courses.json");
    if skills_path.exists() && problems_path.exists() && courses_path.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .map_err(|err| EngineError::Content(format!("create {}: {err}", dir.display())))?;
    write_json(&skills_path, &skills_document())?;
    write_json(&problems_path, &problems_document())?;
    write_json(&courses_path, &courses_document())?;
    tracing::info!(dir = %dir.display(), "seeded demo content");
    Ok(())
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), EngineError> {
    if path.exists() {
        return Ok(());
    }
    let pretty = serde_json::to_string_pretty(value)
        .map_err(|err| EngineError::Content(format!("serialize {}: {err}", path.display())))?;
    std::fs::write(path, pretty)
        .map_err(|err| EngineError::Content(format!("write {}: {err}", path.display())))
}

fn skills_document() -> serde_json::Value {
    json!({
        "version": 1,
        "skills": [
            {
                "skillId": "adding-integers",
                "displayName": "Adding Integers",
                "gradeBand": "elementary",
                "category": "number-operations",
                "difficulty": -1.2
            },
            {
                "skillId": "integer-all-operations",
                "displayName": "Integer Operations",
                "gradeBand": "middle-school",
                "category": "number-operations",
                "difficulty": -0.6,
                "prerequisites": ["adding-integers"]
            },
            {
                "skillId": "fraction-operations",
                "displayName": "Fraction Operations",
                "gradeBand": "middle-school",
                "category": "number-operations",
                "difficulty": -0.3,
                "prerequisites": ["adding-integers"]
            },
            {
                "skillId": "order-of-operations",
                "displayName": "Order of Operations",
                "gradeBand": "middle-school",
                "category": "equations",
                "difficulty": -0.1,
                "prerequisites": ["integer-all-operations"]
            },
            {
                "skillId": "combining-like-terms",
                "displayName": "Combining Like Terms",
                "gradeBand": "middle-school",
                "category": "equations",
                "difficulty": 0.2,
                "prerequisites": ["integer-all-operations"]
            },
            {
                "skillId": "one-step-equations",
                "displayName": "One-Step Equations",
                "gradeBand": "middle-school",
                "category": "equations",
                "difficulty": 0.3,
                "prerequisites": ["integer-all-operations"]
            },
            {
                "skillId": "two-step-equations",
                "displayName": "Two-Step Equations",
                "gradeBand": "middle-school",
                "category": "equations",
                "difficulty": 0.5,
                "discrimination": 1.0,
                "prerequisites": ["one-step-equations", "order-of-operations"]
            },
            {
                "skillId": "multi-step-equations",
                "displayName": "Multi-Step Equations",
                "gradeBand": "high-school",
                "category": "equations",
                "difficulty": 0.9,
                "prerequisites": ["two-step-equations", "combining-like-terms"]
            },
            {
                "skillId": "linear-functions",
                "displayName": "Linear Functions",
                "gradeBand": "high-school",
                "category": "functions",
                "difficulty": 1.2,
                "prerequisites": ["two-step-equations"]
            },
            {
                "skillId": "quadratic-equations",
                "displayName": "Quadratic Equations",
                "gradeBand": "high-school",
                "category": "equations",
                "difficulty": 1.6,
                "prerequisites": ["multi-step-equations"]
            }
        ]
    })
}

fn problems_document() -> serde_json::Value {
    json!({
        "version": 1,
        "problems": [
            {
                "problemId": "add-int-1",
                "skillId": "adding-integers",
                "difficulty": -1.4,
                "prompt": "-3 + 5 = ?",
                "answer": "2",
                "tags": ["integers"]
            },
            {
                "problemId": "add-int-2",
                "skillId": "adding-integers",
                "difficulty": -1.0,
                "prompt": "-7 + (-4) = ?",
                "answer": "-11",
                "tags": ["integers", "negatives"]
            },
            {
                "problemId": "int-ops-1",
                "skillId": "integer-all-operations",
                "difficulty": -0.8,
                "prompt": "-6 x 3 = ?",
                "answer": "-18",
                "tags": ["integers", "multiplication"]
            },
            {
                "problemId": "int-ops-2",
                "skillId": "integer-all-operations",
                "difficulty": -0.4,
                "prompt": "-24 / (-6) = ?",
                "answer": "4",
                "tags": ["integers", "division"]
            },
            {
                "problemId": "frac-1",
                "skillId": "fraction-operations",
                "difficulty": -0.4,
                "prompt": "1/4 + 1/4 = ?",
                "answer": "1/2",
                "acceptedAnswers": ["0.5", "2/4"],
                "tags": ["fractions"]
            },
            {
                "problemId": "frac-2",
                "skillId": "fraction-operations",
                "difficulty": -0.1,
                "prompt": "2/3 x 3/4 = ?",
                "answer": "1/2",
                "acceptedAnswers": ["0.5", "6/12"],
                "tags": ["fractions", "multiplication"]
            },
            {
                "problemId": "order-1",
                "skillId": "order-of-operations",
                "difficulty": -0.2,
                "prompt": "6 + 3 x (8 - 2) = ?",
                "answer": "24",
                "tags": ["pemdas"]
            },
            {
                "problemId": "order-2",
                "skillId": "order-of-operations",
                "difficulty": 0.1,
                "prompt": "(6 + 3) x 8 - 2 = ?",
                "answer": "70",
                "tags": ["pemdas", "parentheses"]
            },
            {
                "problemId": "terms-1",
                "skillId": "combining-like-terms",
                "difficulty": 0.1,
                "prompt": "Simplify: 4x + 7 - 2x + 3",
                "answerType": "expression",
                "answer": "2x+10",
                "acceptedAnswers": ["10+2x"],
                "tags": ["expressions"]
            },
            {
                "problemId": "terms-2",
                "skillId": "combining-like-terms",
                "difficulty": 0.4,
                "prompt": "Simplify: 3a + 5b - a + 2b",
                "answerType": "expression",
                "answer": "2a+7b",
                "acceptedAnswers": ["7b+2a"],
                "tags": ["expressions", "two-variables"]
            },
            {
                "problemId": "one-step-1",
                "skillId": "one-step-equations",
                "difficulty": 0.2,
                "prompt": "Solve: x + 5 = 12",
                "answer": "7",
                "acceptedAnswers": ["x=7"],
                "tags": ["equations", "addition"]
            },
            {
                "problemId": "one-step-2",
                "skillId": "one-step-equations",
                "difficulty": 0.4,
                "prompt": "Solve: 3x = 15",
                "answer": "5",
                "acceptedAnswers": ["x=5"],
                "tags": ["equations", "multiplication"]
            },
            {
                "problemId": "two-step-1",
                "skillId": "two-step-equations",
                "difficulty": 0.4,
                "prompt": "Solve: 2x + 3 = 11",
                "answer": "4",
                "acceptedAnswers": ["x=4"],
                "tags": ["equations"]
            },
            {
                "problemId": "two-step-2",
                "skillId": "two-step-equations",
                "difficulty": 0.6,
                "prompt": "Solve: 3x + 7 = 22",
                "answer": "5",
                "acceptedAnswers": ["x=5"],
                "tags": ["equations"]
            },
            {
                "problemId": "two-step-3",
                "skillId": "two-step-equations",
                "difficulty": 0.7,
                "prompt": "Solve: -2x + 5 = 13",
                "answer": "-4",
                "acceptedAnswers": ["x=-4"],
                "tags": ["equations", "negatives"]
            },
            {
                "problemId": "multi-step-1",
                "skillId": "multi-step-equations",
                "difficulty": 0.8,
                "prompt": "Solve: 2(x + 3) = 16",
                "answer": "5",
                "acceptedAnswers": ["x=5"],
                "tags": ["equations", "distribution"]
            },
            {
                "problemId": "multi-step-2",
                "skillId": "multi-step-equations",
                "difficulty": 1.1,
                "prompt": "Solve: 4x - 3 = 2x + 9",
                "answer": "6",
                "acceptedAnswers": ["x=6"],
                "tags": ["equations", "variables-both-sides"]
            },
            {
                "problemId": "linear-1",
                "skillId": "linear-functions",
                "difficulty": 1.1,
                "prompt": "What is the slope of y = 3x - 2?",
                "answer": "3",
                "tags": ["functions", "slope"]
            },
            {
                "problemId": "linear-2",
                "skillId": "linear-functions",
                "difficulty": 1.3,
                "prompt": "f(x) = 2x + 1. What is f(4)?",
                "answer": "9",
                "tags": ["functions", "evaluation"]
            },
            {
                "problemId": "quadratic-1",
                "skillId": "quadratic-equations",
                "difficulty": 1.5,
                "prompt": "Solve for the positive root: x^2 - 9 = 0",
                "answer": "3",
                "acceptedAnswers": ["x=3"],
                "tags": ["quadratics"]
            },
            {
                "problemId": "quadratic-2",
                "skillId": "quadratic-equations",
                "difficulty": 1.7,
                "prompt": "Factor: x^2 + 5x + 6 = (x + 2)(x + ?)",
                "answer": "3",
                "tags": ["quadratics", "factoring"]
            }
        ]
    })
}

fn courses_document() -> serde_json::Value {
    json!({
        "version": 1,
        "courses": [
            {
                "courseId": "pre-algebra",
                "displayName": "Pre-Algebra",
                "gradeBand": "middle-school",
                "skillSequence": [
                    "adding-integers",
                    "integer-all-operations",
                    "fraction-operations",
                    "order-of-operations",
                    "combining-like-terms",
                    "one-step-equations",
                    "two-step-equations"
                ],
                "extensionThreshold": 0.85
            },
            {
                "courseId": "algebra-1",
                "displayName": "Algebra 1",
                "gradeBand": "high-school",
                "skillSequence": [
                    "multi-step-equations",
                    "linear-functions",
                    "quadratic-equations"
                ],
                "extensionThreshold": 0.88
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content;

    #[test]
    fn test_seeded_content_loads_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        ensure_content(dir.path()).unwrap();

        let snapshot = content::load_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.graph.len(), 10);
        assert!(snapshot.bank.content_gaps().is_empty());
        assert!(snapshot.course_for_domain("equations").is_some());
    }

    #[test]
    fn test_existing_files_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.json");
        std::fs::write(&path, "{\"skills\": []}").unwrap();

        ensure_content(dir.path()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\"skills\": []}");
    }
}
