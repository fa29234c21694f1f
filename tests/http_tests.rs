//! Router smoke tests: envelope shapes, auth header handling, and the
//! placement/practice surface over seeded demo content.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

const STUDENT_HEADER: &str = "x-student-id";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_content_status_reports_snapshot() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/content/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["skills"], 10);
    assert_eq!(json["data"]["contentGaps"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_placement_start_requires_student_header() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/placement/start")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"domain":"equations"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_placement_start_issues_problem() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/placement/start")
                .header(header::CONTENT_TYPE, "application/json")
                .header(STUDENT_HEADER, "student-http-1")
                .body(Body::from(r#"{"domain":"equations"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"]["sessionId"].is_string());
    // The learner-facing card never carries the answer key.
    let problem = &json["data"]["problem"];
    assert!(problem["problemId"].is_string());
    assert!(problem.get("answer").is_none());
}

#[tokio::test]
async fn test_unknown_domain_is_validation_error() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/placement/start")
                .header(header::CONTENT_TYPE, "application/json")
                .header(STUDENT_HEADER, "student-http-2")
                .body(Body::from(r#"{"domain":"underwater-basket-weaving"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_practice_attempt_round_trip() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/mastery/attempt")
                .header(header::CONTENT_TYPE, "application/json")
                .header(STUDENT_HEADER, "student-http-3")
                .body(Body::from(
                    r#"{"problemId":"two-step-2","answer":"5","responseTimeSeconds":14.5}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["correct"], true);
    assert_eq!(json["data"]["quest"]["tier"], "bronze");
    assert!(json["data"]["fluency"]["level"].is_string());
}

#[tokio::test]
async fn test_active_quest_empty_for_new_student() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/mastery/active-quest")
                .header(STUDENT_HEADER, "student-http-4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_pathway_position_missing_is_404() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/pathway/position")
                .header(STUDENT_HEADER, "student-http-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_route_falls_back() {
    let (app, _dir) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
