mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use common::{test_config, TestApp};
use contacts_service::repository::InMemoryContactStore;
use contacts_service::startup::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

#[tokio::test]
async fn liveness_on_empty_collection_is_ok() {
    let app = TestApp::spawn().await;
    assert!(app.store.is_empty());

    let response = app
        .client
        .get(format!("{}/healthz/liveness", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["type"], "liveness");
    assert_eq!(body["id"], "0");
    assert_eq!(body["attributes"]["mongodb"], "ok");
    assert!(body["attributes"]["mongodbFindOneDurationMicros"].is_u64());
}

#[tokio::test]
async fn readiness_reports_ping_duration() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/healthz/readiness", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["type"], "readiness");
    assert_eq!(body["id"], "0");
    assert_eq!(body["attributes"]["mongodb"], "ok");
    assert!(body["attributes"]["mongodbPingDurationMicros"].is_u64());
}

#[tokio::test]
async fn ping_returns_build_metadata_during_outage() {
    let app = TestApp::spawn().await;
    app.store.set_available(false);

    let response = app
        .client
        .get(format!("{}/healthz/ping", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["type"], "ping");
    assert_eq!(body["id"], "0");
    assert_eq!(body["attributes"]["serviceName"], "contacts-service");
    assert_eq!(
        body["attributes"]["serviceVersion"],
        env!("CARGO_PKG_VERSION")
    );
    for key in ["repoName", "commitHash", "serviceType", "buildDate", "buildEpochSec"] {
        assert!(!body["attributes"][key].is_null(), "missing {}", key);
    }
}

#[tokio::test]
async fn probes_return_503_when_datastore_unreachable() {
    let store = Arc::new(InMemoryContactStore::new("memory://down"));
    store.set_available(false);
    let router = build_router(AppState::new(test_config(), store));

    for uri in ["/healthz/liveness", "/healthz/readiness"] {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["retry-after"], "30");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["details"].as_str().unwrap().contains("memory://down"));
    }
}

#[tokio::test]
async fn responses_carry_request_id() {
    let router = build_router(AppState::new(
        test_config(),
        Arc::new(InMemoryContactStore::default()),
    ));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/healthz/ping")
                .header("x-request-id", "probe-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "probe-1");
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");
    assert!(content_type.starts_with("text/plain"));
}
