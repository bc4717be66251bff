// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::mock_provider::{MockAdapter, MockBehavior};
use crate::helpers::{make_entry, pacing_settings, seed_lead, seed_number, Harness};
use chrono::Utc;
use dialrs::domain::models::call_attempt::{CallAttemptRecord, CallStatus, ContactChannel};
use dialrs::domain::models::queue_entry::QueueStatus;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_dispatch_submits_and_completes_entry() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 1);
    assert_eq!(outcome.remaining, 0);
    assert_eq!(adapter.call_count(), 1);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Completed);

    // The submitted request carries the attempt id for event correlation
    let request = &adapter.calls()[0];
    assert_eq!(request.to_number, "+14155550101");
    assert_eq!(request.from_number, "+12125550199");
    let attempt_id: Uuid = request.metadata["attempt_id"].parse().unwrap();
    let attempt = h.attempt_repo.find_by_id(attempt_id).await.unwrap().unwrap();
    assert_eq!(attempt.status, CallStatus::Initiated);
    assert!(attempt.provider_call_id.as_deref().unwrap().starts_with("mock_call_"));
}

#[tokio::test]
async fn test_governor_denial_leaves_queue_untouched() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    // Saturate the account concurrency budget with one in-flight attempt
    let in_flight = CallAttemptRecord::new(
        account_id,
        None,
        lead.id,
        "mock".to_string(),
        "+12125550199".to_string(),
        "+14155550101".to_string(),
        ContactChannel::Call,
    );
    h.attempt_repo.create(&in_flight).await.unwrap();

    let mut pacing = pacing_settings();
    pacing.max_concurrent_per_account = 1;

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing);

    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(outcome.remaining, 1);
    assert_eq!(adapter.call_count(), 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
    assert_eq!(stored.attempts, 0);
}

#[tokio::test]
async fn test_paused_account_claims_nothing_until_resumed() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    dispatcher.pause_account(account_id);
    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(outcome.remaining, 1);
    assert_eq!(adapter.call_count(), 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
    assert_eq!(stored.attempts, 0);

    dispatcher.resume_account(account_id);
    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 1);
    assert_eq!(adapter.call_count(), 1);
}

#[tokio::test]
async fn test_dnc_lead_is_removed_before_submission() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let mut lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    lead.do_not_contact = true;
    h.lead_repo.update(&lead).await.unwrap();
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(adapter.call_count(), 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Removed);
}

#[tokio::test]
async fn test_no_eligible_provider_releases_entry() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    // No numbers seeded, routing cannot succeed

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 0);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
    assert!(stored.scheduled_at.unwrap() > Utc::now());
}

#[tokio::test]
async fn test_rate_limited_provider_cools_down_and_entry_retries() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::RateLimited));
    let (dispatcher, router, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    let outcome = dispatcher.run_once(account_id, 5).await.unwrap();
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(adapter.call_count(), 1);
    assert!(router.is_cooling_down("mock"));

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
    assert!(stored.scheduled_at.unwrap() > Utc::now());
}

#[tokio::test]
async fn test_rejected_submission_exhausts_single_attempt_entry() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    entry.max_attempts = 1;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Reject));
    let (dispatcher, _, _) = h.dispatcher_with(adapter.clone(), pacing_settings());

    dispatcher.run_once(account_id, 5).await.unwrap();

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Failed);
}
