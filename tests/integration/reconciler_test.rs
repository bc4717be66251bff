// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{make_entry, Harness};
use chrono::Utc;
use dialrs::dispatch::reconciler::Reconciler;
use dialrs::domain::models::call_attempt::{CallAttemptRecord, CallStatus, ContactChannel};
use dialrs::domain::models::queue_entry::QueueStatus;
use std::sync::Arc;
use uuid::Uuid;

fn reconciler(h: &Harness) -> Reconciler {
    Reconciler::new(
        h.queue_repo.clone(),
        h.attempt_repo.clone(),
        chrono::Duration::minutes(2),
        chrono::Duration::minutes(5),
    )
}

#[tokio::test]
async fn test_stuck_claimed_entry_is_reset_to_pending() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let entry = make_entry(account_id, "+14155550101");
    h.queue_repo.create(&entry).await.unwrap();
    h.queue_repo.claim_due(account_id, 1).await.unwrap();

    // Backdate the claim past the timeout window
    let mut stuck = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    stuck.claimed_at = Some((Utc::now() - chrono::Duration::minutes(10)).into());
    h.queue_repo.update(&stuck).await.unwrap();

    let outcome = reconciler(&h).run_once().await.unwrap();
    assert_eq!(outcome.entries_reset, 1);
    assert_eq!(outcome.entries_demoted, 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
}

#[tokio::test]
async fn test_exhausted_stuck_entry_is_demoted_to_failed() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut entry = make_entry(account_id, "+14155550101");
    entry.max_attempts = 1;
    h.queue_repo.create(&entry).await.unwrap();
    h.queue_repo.claim_due(account_id, 1).await.unwrap();

    let mut stuck = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    stuck.claimed_at = Some((Utc::now() - chrono::Duration::minutes(10)).into());
    h.queue_repo.update(&stuck).await.unwrap();

    let outcome = reconciler(&h).run_once().await.unwrap();
    assert_eq!(outcome.entries_demoted, 1);
    assert_eq!(outcome.entries_reset, 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Failed);
}

#[tokio::test]
async fn test_recent_claim_is_left_alone() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let entry = make_entry(account_id, "+14155550101");
    h.queue_repo.create(&entry).await.unwrap();
    h.queue_repo.claim_due(account_id, 1).await.unwrap();

    let outcome = reconciler(&h).run_once().await.unwrap();
    assert_eq!(outcome.entries_reset, 0);
    assert_eq!(outcome.entries_demoted, 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Claimed);
}

#[tokio::test]
async fn test_stale_in_flight_attempt_is_forced_closed() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut record = CallAttemptRecord::new(
        account_id,
        None,
        Uuid::new_v4(),
        "mock".to_string(),
        "+12125550199".to_string(),
        "+14155550101".to_string(),
        ContactChannel::Call,
    );
    record.started_at = Some((Utc::now() - chrono::Duration::minutes(30)).into());
    h.attempt_repo.create(&record).await.unwrap();

    // A fresh attempt should survive the sweep
    let fresh = CallAttemptRecord::new(
        account_id,
        None,
        Uuid::new_v4(),
        "mock".to_string(),
        "+12125550199".to_string(),
        "+14155550102".to_string(),
        ContactChannel::Call,
    );
    h.attempt_repo.create(&fresh).await.unwrap();

    let outcome = reconciler(&h).run_once().await.unwrap();
    assert_eq!(outcome.attempts_closed, 1);

    let closed = h.attempt_repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(closed.status, CallStatus::NoAnswer);
    assert!(closed.ended_at.is_some());

    let alive = h.attempt_repo.find_by_id(fresh.id).await.unwrap().unwrap();
    assert_eq!(alive.status, CallStatus::Initiated);
}

#[tokio::test]
async fn test_force_close_keeps_existing_metadata() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut record = CallAttemptRecord::new(
        account_id,
        None,
        Uuid::new_v4(),
        "mock".to_string(),
        "+12125550199".to_string(),
        "+14155550101".to_string(),
        ContactChannel::Call,
    );
    record.started_at = Some((Utc::now() - chrono::Duration::minutes(30)).into());
    record.metadata = serde_json::json!({ "routing_reason": "capability match, local presence" });
    h.attempt_repo.create(&record).await.unwrap();

    let outcome = reconciler(&h).run_once().await.unwrap();
    assert_eq!(outcome.attempts_closed, 1);

    let closed = h.attempt_repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(
        closed.metadata["routing_reason"],
        "capability match, local presence"
    );
    assert!(closed.metadata["force_closed"].is_string());
}

#[tokio::test]
async fn test_reset_entry_can_be_claimed_again() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let entry = make_entry(account_id, "+14155550101");
    h.queue_repo.create(&entry).await.unwrap();
    h.queue_repo.claim_due(account_id, 1).await.unwrap();

    let mut stuck = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    stuck.claimed_at = Some((Utc::now() - chrono::Duration::minutes(10)).into());
    h.queue_repo.update(&stuck).await.unwrap();

    reconciler(&h).run_once().await.unwrap();

    let reclaimed = h.queue_repo.claim_due(account_id, 1).await.unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].id, entry.id);
    assert_eq!(reclaimed[0].attempts, 2);
}
