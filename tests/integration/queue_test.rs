// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{make_entry, Harness};
use chrono::Utc;
use dialrs::domain::models::queue_entry::{QueueEntry, QueueStatus, CALLBACK_PRIORITY_BAND};
use std::collections::HashSet;
use uuid::Uuid;

#[tokio::test]
async fn test_claim_is_exclusive_across_workers() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    for i in 0..10 {
        let entry = make_entry(account_id, &format!("+1415555010{}", i));
        h.queue_repo.create(&entry).await.unwrap();
    }

    let (a, b) = tokio::join!(
        h.queue_repo.claim_due(account_id, 10),
        h.queue_repo.claim_due(account_id, 10)
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let mut seen = HashSet::new();
    for entry in a.iter().chain(b.iter()) {
        assert!(seen.insert(entry.id), "entry {} claimed twice", entry.id);
        assert_eq!(entry.status, QueueStatus::Claimed);
    }
    assert_eq!(seen.len(), 10);
}

#[tokio::test]
async fn test_claim_orders_by_priority_desc() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut low = make_entry(account_id, "+14155550101");
    low.priority = 0;
    let mut high = make_entry(account_id, "+14155550102");
    high.priority = 5;
    let mut mid = make_entry(account_id, "+14155550103");
    mid.priority = 2;

    for e in [&low, &high, &mid] {
        h.queue_repo.create(e).await.unwrap();
    }

    let claimed = h.queue_repo.claim_due(account_id, 2).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert_eq!(claimed[0].id, high.id);
    assert_eq!(claimed[1].id, mid.id);
}

#[tokio::test]
async fn test_claim_skips_future_scheduled_entries() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut future = make_entry(account_id, "+14155550101");
    future.scheduled_at = Some((Utc::now() + chrono::Duration::hours(1)).into());
    h.queue_repo.create(&future).await.unwrap();

    let due = make_entry(account_id, "+14155550102");
    h.queue_repo.create(&due).await.unwrap();

    let claimed = h.queue_repo.claim_due(account_id, 10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, due.id);
}

#[tokio::test]
async fn test_claim_increments_attempts() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let entry = make_entry(account_id, "+14155550101");
    h.queue_repo.create(&entry).await.unwrap();

    let claimed = h.queue_repo.claim_due(account_id, 1).await.unwrap();
    assert_eq!(claimed[0].attempts, 1);

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Claimed);
    assert_eq!(stored.attempts, 1);
    assert!(stored.claimed_at.is_some());
}

#[tokio::test]
async fn test_enqueue_rejects_duplicate_non_terminal() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();
    let lead_id = Uuid::new_v4();

    let first = QueueEntry::new(
        account_id,
        campaign_id,
        lead_id,
        "+14155550101".to_string(),
        0,
        None,
    );
    h.dialing_queue.enqueue(first.clone()).await.unwrap();

    let second = QueueEntry::new(
        account_id,
        campaign_id,
        lead_id,
        "+14155550101".to_string(),
        0,
        None,
    );
    let err = h.dialing_queue.enqueue(second).await.unwrap_err();
    match err {
        dialrs::queue::dialing_queue::QueueError::DuplicateEntry { existing } => {
            assert_eq!(existing, first.id);
        }
        other => panic!("expected DuplicateEntry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_submissions_back_off_then_exhaust() {
    use dialrs::queue::dialing_queue::SubmissionResult;

    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let mut entry = make_entry(account_id, "+14155550101");
    entry.max_attempts = 2;
    h.queue_repo.create(&entry).await.unwrap();

    // First failure: attempts=1 < max, entry backs off to pending
    let claimed = h.queue_repo.claim_due(account_id, 1).await.unwrap();
    assert_eq!(claimed.len(), 1);
    h.dialing_queue
        .mark_result(entry.id, SubmissionResult::Failed)
        .await
        .unwrap();

    let mut stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Pending);
    assert!(stored.scheduled_at.unwrap() > Utc::now());

    // Pull the retry forward so it can be claimed again
    stored.scheduled_at = Some((Utc::now() - chrono::Duration::seconds(1)).into());
    h.queue_repo.update(&stored).await.unwrap();

    // Second failure: attempts=2 == max, entry goes terminal
    let claimed = h.queue_repo.claim_due(account_id, 1).await.unwrap();
    assert_eq!(claimed.len(), 1);
    h.dialing_queue
        .mark_result(entry.id, SubmissionResult::Failed)
        .await
        .unwrap();

    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Failed);
}

#[tokio::test]
async fn test_requeue_callback_promotes_existing_entry() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();
    let lead_id = Uuid::new_v4();

    let entry = QueueEntry::new(
        account_id,
        campaign_id,
        lead_id,
        "+14155550101".to_string(),
        0,
        None,
    );
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let at = Utc::now() + chrono::Duration::minutes(30);
    let promoted = h
        .dialing_queue
        .requeue_callback(account_id, campaign_id, lead_id, "+14155550101".to_string(), at)
        .await
        .unwrap();

    assert_eq!(promoted.id, entry.id);
    assert!(promoted.priority >= CALLBACK_PRIORITY_BAND);
    assert!(promoted.is_callback());
}

#[tokio::test]
async fn test_requeue_callback_creates_when_absent() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let at = Utc::now() + chrono::Duration::minutes(30);
    let created = h
        .dialing_queue
        .requeue_callback(
            account_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "+14155550101".to_string(),
            at,
        )
        .await
        .unwrap();

    assert_eq!(created.priority, CALLBACK_PRIORITY_BAND);
    assert_eq!(created.status, QueueStatus::Pending);
}

#[tokio::test]
async fn test_remove_for_lead_preserves_callbacks() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead_id = Uuid::new_v4();

    let mut ordinary = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead_id,
        "+14155550101".to_string(),
        0,
        None,
    );
    ordinary.priority = 0;
    h.queue_repo.create(&ordinary).await.unwrap();

    let mut callback = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead_id,
        "+14155550101".to_string(),
        CALLBACK_PRIORITY_BAND,
        None,
    );
    callback.priority = CALLBACK_PRIORITY_BAND;
    h.queue_repo.create(&callback).await.unwrap();

    let removed = h
        .queue_repo
        .remove_for_lead(lead_id, CALLBACK_PRIORITY_BAND)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let ordinary = h.queue_repo.find_by_id(ordinary.id).await.unwrap().unwrap();
    assert_eq!(ordinary.status, QueueStatus::Removed);

    let callback = h.queue_repo.find_by_id(callback.id).await.unwrap().unwrap();
    assert_eq!(callback.status, QueueStatus::Pending);
}
