// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{seed_lead, Harness};
use dialrs::dispositions::processor::{DispositionError, DispositionProcessor};
use dialrs::domain::models::disposition::{DispositionEvent, SetBy};
use dialrs::domain::models::queue_entry::{QueueEntry, QueueStatus, CALLBACK_PRIORITY_BAND};
use dialrs::domain::models::workflow::{WorkflowProgress, WorkflowStatus};
use std::sync::Arc;
use uuid::Uuid;

fn processor(h: &Harness) -> Arc<DispositionProcessor> {
    Arc::new(DispositionProcessor::new(
        h.lead_repo.clone(),
        h.queue_repo.clone(),
        h.dnc_repo.clone(),
        h.workflow_repo.clone(),
        h.pipeline_repo.clone(),
        h.disposition_repo.clone(),
        h.attempt_repo.clone(),
        h.audit_repo.clone(),
    ))
}

fn event(account_id: Uuid, lead_id: Uuid, name: &str) -> DispositionEvent {
    DispositionEvent {
        lead_id,
        account_id,
        disposition_name: name.to_string(),
        disposition_id: None,
        call_id: None,
        set_by: SetBy::Ai,
        confidence: Some(0.95),
    }
}

#[tokio::test]
async fn test_dnc_disposition_runs_full_saga() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let mut progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, Uuid::new_v4());
    progress.status = WorkflowStatus::Active;
    h.workflow_repo.create(&progress).await.unwrap();

    let entry = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead.id,
        "+14155550101".to_string(),
        0,
        None,
    );
    h.queue_repo.create(&entry).await.unwrap();

    let report = processor(&h)
        .process(&event(account_id, lead.id, "Do Not Call"))
        .await
        .unwrap();

    assert!(report.classes.dnc);
    assert!(report.classes.remove_from_sequence);
    assert!(!report.had_failures);
    assert_eq!(report.lead_status, "dnc");

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert!(lead.do_not_contact);
    assert_eq!(lead.status, "dnc");

    assert!(h.dnc_repo.contains(account_id, "+14155550101").await.unwrap());

    let entry = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, QueueStatus::Removed);

    let active = h.workflow_repo.find_active_by_lead(lead.id).await.unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn test_dnc_disposition_is_idempotent() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let p = processor(&h);
    let first = p.process(&event(account_id, lead.id, "dnc")).await.unwrap();
    let second = p.process(&event(account_id, lead.id, "dnc")).await.unwrap();

    assert!(!first.had_failures);
    assert!(!second.had_failures);
    assert!(h.dnc_repo.contains(account_id, "+14155550101").await.unwrap());
    assert_eq!(h.audit_repo.count_errors(account_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_disposition_preserves_scheduled_callbacks() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let ordinary = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead.id,
        "+14155550101".to_string(),
        0,
        None,
    );
    h.queue_repo.create(&ordinary).await.unwrap();

    let callback = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead.id,
        "+14155550101".to_string(),
        CALLBACK_PRIORITY_BAND,
        None,
    );
    h.queue_repo.create(&callback).await.unwrap();

    let report = processor(&h)
        .process(&event(account_id, lead.id, "Not Interested"))
        .await
        .unwrap();

    assert!(report.classes.remove_from_sequence);
    assert!(!report.classes.dnc);

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert_eq!(lead.status, "not_interested");
    assert!(!lead.do_not_contact);

    let ordinary = h.queue_repo.find_by_id(ordinary.id).await.unwrap().unwrap();
    assert_eq!(ordinary.status, QueueStatus::Removed);
    let callback = h.queue_repo.find_by_id(callback.id).await.unwrap().unwrap();
    assert_eq!(callback.status, QueueStatus::Pending);
}

#[tokio::test]
async fn test_pause_disposition_pauses_workflows_and_moves_pipeline() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, Uuid::new_v4());
    h.workflow_repo.create(&progress).await.unwrap();

    let report = processor(&h)
        .process(&event(account_id, lead.id, "callback"))
        .await
        .unwrap();

    assert!(report.classes.pause);
    assert!(!report.classes.remove_from_sequence);
    assert_eq!(report.stage.as_deref(), Some("Callback Scheduled"));

    let active = h.workflow_repo.find_active_by_lead(lead.id).await.unwrap();
    assert!(active.is_empty());

    let position = h
        .pipeline_repo
        .find_position(account_id, lead.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(position.stage, "Callback Scheduled");
}

#[tokio::test]
async fn test_unknown_disposition_only_sets_lead_status() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    let entry = QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        lead.id,
        "+14155550101".to_string(),
        0,
        None,
    );
    h.queue_repo.create(&entry).await.unwrap();

    let report = processor(&h)
        .process(&event(account_id, lead.id, "Interested - Follow Up"))
        .await
        .unwrap();

    assert!(!report.classes.dnc && !report.classes.pause);
    assert_eq!(report.lead_status, "interested_follow_up");

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert_eq!(lead.status, "interested_follow_up");
    assert!(!lead.do_not_contact);

    // Queue untouched for a status-only disposition
    let entry = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(entry.status, QueueStatus::Pending);
}

#[tokio::test]
async fn test_missing_lead_is_an_error() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let missing = Uuid::new_v4();

    let err = processor(&h)
        .process(&event(account_id, missing, "dnc"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispositionError::LeadNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_pipeline_board_is_created_on_demand() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;

    processor(&h)
        .process(&event(account_id, lead.id, "sold"))
        .await
        .unwrap();

    let board = h
        .pipeline_repo
        .find_board_by_normalized_name(account_id, "closed won")
        .await
        .unwrap();
    assert!(board.is_some());
}
