// Integration tests for the HTTP control API
//
// The router is driven in-process with `oneshot`, backed by the scripted
// interview service, an in-memory status feed and an in-memory result store.

mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{FakeApi, CANDIDATE, JOB_ROLE, OPENING};
use interview_room::{
    create_router, AppState, ChannelStatusFeed, MemoryResultStore, ScoreRecord, StatusUpdate,
};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    api: Arc<FakeApi>,
    feed: Arc<ChannelStatusFeed>,
    store: Arc<MemoryResultStore>,
}

fn app(api: FakeApi) -> TestApp {
    let api = Arc::new(api);
    let feed = Arc::new(ChannelStatusFeed::default());
    let store = Arc::new(MemoryResultStore::new());
    let state = AppState::new(api.clone(), feed.clone(), store.clone());
    let router = create_router(state.clone());

    TestApp {
        router,
        state,
        api,
        feed,
        store,
    }
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn wait_for_subscribers(feed: &ChannelStatusFeed, expected: usize) {
    for _ in 0..100 {
        if feed.subscriber_count() == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(feed.subscriber_count(), expected);
}

async fn start(router: &Router) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/interviews/start",
        Some(json!({"email": CANDIDATE, "jobRole": JOB_ROLE})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app(FakeApi::with_questions(&[]));
    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_start_presents_opening() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let (status, body) = send(
        &app.router,
        "POST",
        "/interviews/start",
        Some(json!({"email": CANDIDATE, "jobRole": JOB_ROLE})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "session-1");
    assert_eq!(body["state"], "awaiting_answer");
    assert_eq!(body["opening"]["content"], OPENING);
    assert_eq!(body["opening"]["role"], "ai");
}

#[tokio::test]
async fn test_start_failure_is_bad_gateway() {
    let api = FakeApi::with_questions(&[]);
    api.fail_start.store(true, Ordering::SeqCst);
    let app = app(api);

    let (status, body) = send(
        &app.router,
        "POST",
        "/interviews/start",
        Some(json!({"email": CANDIDATE, "jobRole": JOB_ROLE})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["recoverable"], false);
    assert_eq!(app.feed.subscriber_count(), 0);
}

#[tokio::test]
async fn test_answer_turns_until_completion() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let uri = format!("/interviews/{}/answer", session_id);
    let (status, body) = send(&app.router, "POST", &uri, Some(json!({"answer": "a0"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
    assert_eq!(body["question"]["content"], "Q1");
    assert_eq!(body["state"], "awaiting_answer");

    let (status, body) = send(&app.router, "POST", &uri, Some(json!({"answer": "a1"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);
    assert_eq!(body["state"], "ended");
    assert!(body["question"].is_null());

    assert_eq!(app.api.submitted(), vec!["a0", "a1"]);
    wait_for_subscribers(&app.feed, 0).await;

    // The ended call rejects further answers
    let (status, body) = send(&app.router, "POST", &uri, Some(json!({"answer": "a2"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["recoverable"], true);
}

#[tokio::test]
async fn test_blank_answer_is_bad_request() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let uri = format!("/interviews/{}/answer", session_id);
    let (status, _) = send(&app.router, "POST", &uri, Some(json!({"answer": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.api.submitted().is_empty());
}

#[tokio::test]
async fn test_status_and_transcript() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/status", session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidate"], CANDIDATE);
    assert_eq!(body["jobRole"], JOB_ROLE);
    assert_eq!(body["state"], "awaiting_answer");
    assert_eq!(body["messages"], 1);

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/transcript", session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], OPENING);
}

#[tokio::test]
async fn test_end_returns_transcript_and_drops_call() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let uri = format!("/interviews/{}/end", session_id);
    let (status, body) = send(&app.router, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ended");
    assert_eq!(body["endReason"], "user_ended");
    assert_eq!(body["transcript"].as_array().unwrap().len(), 1);
    assert!(app.state.calls.read().await.is_empty());

    let (status, _) = send(&app.router, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pushed_completion_ends_hosted_call() {
    let app = app(FakeApi::with_questions(&["Q1", "Q2"]));
    let session_id = start(&app.router).await;
    let status_uri = format!("/interviews/{}/status", session_id);

    app.feed.publish(CANDIDATE, StatusUpdate::completed());

    let mut state = Value::Null;
    for _ in 0..100 {
        let (_, body) = send(&app.router, "GET", &status_uri, None).await;
        state = body["state"].clone();
        if state == "ended" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state, "ended");

    let (_, body) = send(&app.router, "GET", &status_uri, None).await;
    assert_eq!(body["endReason"], "service_completed");

    // The watcher moves the call out of the live map
    for _ in 0..100 {
        if app.state.calls.read().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(app.state.calls.read().await.is_empty());
    wait_for_subscribers(&app.feed, 0).await;
}

#[tokio::test]
async fn test_completed_call_leaves_live_map() {
    let app = app(FakeApi::with_questions(&[]));
    let session_id = start(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/interviews/{}/answer", session_id),
        Some(json!({"answer": "only answer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    assert!(app.state.calls.read().await.is_empty());
    assert!(app.state.finished_call(&session_id).await.is_some());

    // Opening, answer and closing line stay readable after the call is gone
    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/status", session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ended");
    assert_eq!(body["endReason"], "service_completed");
    assert_eq!(body["messages"], 3);

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/transcript", session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_reused_session_id_is_refused() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/interviews/start",
        Some(json!({"email": CANDIDATE, "jobRole": JOB_ROLE})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(&session_id));

    // The first call is untouched and still watched
    assert_eq!(app.state.calls.read().await.len(), 1);
    assert_eq!(app.api.end_calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.feed.subscriber_count(), 1);

    let (_, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/status", session_id),
        None,
    )
    .await;
    assert_eq!(body["state"], "awaiting_answer");
}

#[tokio::test]
async fn test_interview_report() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/interviews/{}/report", session_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], session_id);
    assert_eq!(body["email"], CANDIDATE);

    let (status, _) = send(&app.router, "GET", "/interviews/nope/report", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_call_is_not_found() {
    let app = app(FakeApi::with_questions(&[]));

    let (status, body) = send(
        &app.router,
        "POST",
        "/interviews/nope/answer",
        Some(json!({"answer": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let (status, _) = send(&app.router, "GET", "/interviews/nope/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_behavior_scores() {
    let app = app(FakeApi::with_questions(&["Q1"]));
    let session_id = start(&app.router).await;
    let uri = format!("/interviews/{}/behavior", session_id);

    let (status, _) = send(
        &app.router,
        "POST",
        &uri,
        Some(json!({"posture": 7, "eye": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        *app.api.behavior.lock().unwrap(),
        vec![("posture", 7), ("eye", 9)]
    );

    let (status, _) = send(&app.router, "POST", &uri, Some(json!({"eye": 11}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.api.behavior.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_results() -> Result<()> {
    let app = app(FakeApi::with_questions(&[]));

    let (status, _) = send(&app.router, "GET", "/results/ada@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.store
        .put_score(
            CANDIDATE,
            ScoreRecord {
                technical_score: 90.0,
                posture_score: 8.0,
                eye_score: 6.0,
                role: JOB_ROLE.to_string(),
            },
        )
        .await;

    let (status, body) = send(&app.router, "GET", "/results/ada@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall"], 65);
    assert_eq!(body["tier"], "Good");
    assert_eq!(body["role"], JOB_ROLE);
    Ok(())
}
