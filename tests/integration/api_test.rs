// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::mock_provider::{MockAdapter, MockBehavior};
use crate::helpers::{pacing_settings, seed_lead, Harness};
use axum::http::StatusCode;
use axum::Extension;
use axum_test::TestServer;
use dialrs::dispositions::processor::DispositionProcessor;
use dialrs::domain::models::call_attempt::{CallAttemptRecord, CallStatus, ContactChannel};
use dialrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn server(h: &Harness) -> TestServer {
    let processor = Arc::new(DispositionProcessor::new(
        h.lead_repo.clone(),
        h.queue_repo.clone(),
        h.dnc_repo.clone(),
        h.workflow_repo.clone(),
        h.pipeline_repo.clone(),
        h.disposition_repo.clone(),
        h.attempt_repo.clone(),
        h.audit_repo.clone(),
    ));
    let app = routes::routes()
        .layer(Extension(h.dialing_queue.clone()))
        .layer(Extension(h.attempt_repo.clone()))
        .layer(Extension(processor));
    TestServer::new(app).expect("test server should start")
}

#[tokio::test]
async fn test_pause_endpoint_toggles_account_dispatch() {
    let h = Harness::new().await;
    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter, pacing_settings());

    let app = routes::routes()
        .layer(Extension(h.dialing_queue.clone()))
        .layer(Extension(h.attempt_repo.clone()))
        .layer(Extension(dispatcher.clone()));
    let server = TestServer::new(app).expect("test server should start");

    let account_id = Uuid::new_v4();
    let response = server
        .post(&format!("/v1/accounts/{account_id}/dispatch/pause"))
        .await;
    response.assert_status_ok();
    assert!(dispatcher.is_paused(account_id));

    let response = server
        .post(&format!("/v1/accounts/{account_id}/dispatch/resume"))
        .await;
    response.assert_status_ok();
    assert!(!dispatcher.is_paused(account_id));
}

#[tokio::test]
async fn test_health_check() {
    let h = Harness::new().await;
    let server = server(&h);

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_enqueue_accepts_and_normalizes_phone() {
    let h = Harness::new().await;
    let server = server(&h);

    let response = server
        .post("/v1/queue")
        .json(&json!({
            "account_id": Uuid::new_v4(),
            "campaign_id": Uuid::new_v4(),
            "lead_id": Uuid::new_v4(),
            "phone_number": "(415) 555-0101",
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = h.queue_repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.phone_number, "+14155550101");
}

#[tokio::test]
async fn test_enqueue_duplicate_returns_conflict() {
    let h = Harness::new().await;
    let server = server(&h);

    let payload = json!({
        "account_id": Uuid::new_v4(),
        "campaign_id": Uuid::new_v4(),
        "lead_id": Uuid::new_v4(),
        "phone_number": "+14155550101",
    });

    server.post("/v1/queue").json(&payload).await.assert_status_ok();

    let response = server.post("/v1/queue").json(&payload).await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_event_updates_attempt_and_applies_disposition() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let mut record = CallAttemptRecord::new(
        account_id,
        None,
        lead.id,
        "mock".to_string(),
        "+12125550199".to_string(),
        "+14155550101".to_string(),
        ContactChannel::Call,
    );
    record.provider_call_id = Some("mock_call_77".to_string());
    h.attempt_repo.create(&record).await.unwrap();

    let server = server(&h);
    let response = server
        .post("/v1/events")
        .json(&json!({
            "provider_call_id": "mock_call_77",
            "status": "completed",
            "outcome": "answered",
            "disposition": { "name": "dnc", "set_by": "ai", "confidence": 0.9 },
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["disposition_applied"], json!(true));

    let attempt = h.attempt_repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(attempt.status, CallStatus::Completed);
    assert_eq!(attempt.outcome.as_deref(), Some("answered"));
    assert!(attempt.ended_at.is_some());

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert!(lead.do_not_contact);
}

#[tokio::test]
async fn test_event_for_unknown_call_is_not_found() {
    let h = Harness::new().await;
    let server = server(&h);

    let response = server
        .post("/v1/events")
        .json(&json!({
            "provider_call_id": "no_such_call",
            "status": "completed",
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
