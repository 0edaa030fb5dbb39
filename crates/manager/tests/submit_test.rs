mod harness;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use harness::fake_probe::FakeProbe;
use jobgraph_core::{HttpScheme, JobNode, SearchMode};
use jobgraph_graph::InMemoryGraphStore;
use jobgraph_manager::{build_router, AppState};
use tower::ServiceExt;

fn state_with(graph: InMemoryGraphStore, probe: FakeProbe) -> Arc<AppState> {
    Arc::new(AppState {
        graph: Arc::new(graph),
        probe: Arc::new(probe),
        probe_timeout_secs: 5,
    })
}

fn submit_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn accepts_valid_submission() {
    let state = state_with(InMemoryGraphStore::new(), FakeProbe::new());
    let app = build_router(state);

    let response = app
        .oneshot(submit_request(
            r#"{"url":"https://example.com","depth":3,"mode":"normal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["Success"], "Job started");
}

#[tokio::test]
async fn rejects_invalid_depth() {
    let state = state_with(InMemoryGraphStore::new(), FakeProbe::new());
    let app = build_router(state);

    let response = app
        .oneshot(submit_request(
            r#"{"url":"https://example.com","depth":0,"mode":"normal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_private_target() {
    let state = state_with(InMemoryGraphStore::new(), FakeProbe::new());
    let app = build_router(state);

    let response = app
        .oneshot(submit_request(
            r#"{"url":"https://127.0.0.1","depth":2,"mode":"normal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reports_duplicate_as_already_searched() {
    let graph = InMemoryGraphStore::new();
    let root = JobNode::root("EXAMPLE.COM".into(), HttpScheme::Https, 3, SearchMode::Normal, None, None).unwrap();
    graph.seed(root);

    let state = state_with(graph, FakeProbe::new());
    let app = build_router(state);

    let response = app
        .oneshot(submit_request(
            r#"{"url":"https://example.com","depth":3,"mode":"normal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["Info"], "requested url was already searched");
}

#[tokio::test]
async fn unreachable_target_returns_not_found() {
    let probe = FakeProbe::new().unreachable("EXAMPLE.COM");
    let state = state_with(InMemoryGraphStore::new(), probe);
    let app = build_router(state);

    let response = app
        .oneshot(submit_request(
            r#"{"url":"https://example.com","depth":3,"mode":"normal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
