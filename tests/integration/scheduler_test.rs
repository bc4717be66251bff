// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::mock_provider::{MockAdapter, MockBehavior};
use crate::helpers::{
    make_entry, pacing_settings, scheduler_settings, seed_lead, seed_number, Harness,
};
use chrono::Utc;
use dialrs::dispatch::reconciler::Reconciler;
use dialrs::dispositions::processor::DispositionProcessor;
use dialrs::domain::models::disposition::{DispositionEvent, SetBy};
use dialrs::domain::models::queue_entry::{QueueStatus, CALLBACK_PRIORITY_BAND};
use dialrs::domain::models::workflow::WorkflowProgress;
use dialrs::queue::scheduler::SchedulerLoop;
use std::sync::Arc;
use uuid::Uuid;

fn scheduler(h: &Harness, adapter: Arc<MockAdapter>) -> Arc<SchedulerLoop> {
    let (dispatcher, _, governor) = h.dispatcher_with(adapter, pacing_settings());
    let reconciler = Arc::new(Reconciler::new(
        h.queue_repo.clone(),
        h.attempt_repo.clone(),
        chrono::Duration::minutes(2),
        chrono::Duration::minutes(5),
    ));
    Arc::new(SchedulerLoop::new(
        reconciler,
        dispatcher,
        h.dialing_queue.clone(),
        h.queue_repo.clone(),
        h.lead_repo.clone(),
        h.workflow_repo.clone(),
        h.attempt_repo.clone(),
        governor,
        scheduler_settings(),
    ))
}

#[tokio::test]
async fn test_tick_picks_up_due_callback() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();

    let mut lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    lead.next_callback_at = Some((Utc::now() - chrono::Duration::minutes(1)).into());
    h.lead_repo.update(&lead).await.unwrap();

    let mut progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, campaign_id);
    progress.next_step_at = None;
    h.workflow_repo.create(&progress).await.unwrap();

    // No numbers seeded, the entry survives the dispatch stage as pending
    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    scheduler(&h, adapter).run_tick().await;

    // Callback landed in the reserved priority band under the workflow's campaign
    let entry = h
        .queue_repo
        .find_non_terminal(campaign_id, lead.id)
        .await
        .unwrap()
        .expect("callback should be enqueued");
    assert!(entry.priority >= CALLBACK_PRIORITY_BAND);

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert!(lead.next_callback_at.is_none());
}

#[tokio::test]
async fn test_tick_advances_due_workflow_step() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();

    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    let mut progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, campaign_id);
    progress.next_step_at = Some((Utc::now() - chrono::Duration::minutes(1)).into());
    h.workflow_repo.create(&progress).await.unwrap();

    // No numbers seeded, entries survive the dispatch stage as pending
    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    scheduler(&h, adapter).run_tick().await;

    let entry = h
        .queue_repo
        .find_non_terminal(campaign_id, lead.id)
        .await
        .unwrap()
        .expect("workflow step should enqueue an entry");
    assert_eq!(entry.status, QueueStatus::Pending);

    let due = h.workflow_repo.find_due_steps(Utc::now()).await.unwrap();
    assert!(due.is_empty(), "consumed step should not stay due");
}

#[tokio::test]
async fn test_tick_skips_workflow_step_for_dnc_lead() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();

    let mut lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    lead.do_not_contact = true;
    h.lead_repo.update(&lead).await.unwrap();

    let mut progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, campaign_id);
    progress.next_step_at = Some((Utc::now() - chrono::Duration::minutes(1)).into());
    h.workflow_repo.create(&progress).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    scheduler(&h, adapter).run_tick().await;

    let entry = h
        .queue_repo
        .find_non_terminal(campaign_id, lead.id)
        .await
        .unwrap();
    assert!(entry.is_none());
}

#[tokio::test]
async fn test_tick_dispatches_due_entries_end_to_end() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    scheduler(&h, adapter.clone()).run_tick().await;

    assert_eq!(adapter.call_count(), 1);
    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Completed);
}

#[tokio::test]
async fn test_dispatch_then_appointment_set_closes_out_the_lead() {
    let h = Harness::new().await;
    let account_id = Uuid::new_v4();

    let lead = seed_lead(&h.lead_repo, account_id, "+14155550101").await;
    seed_number(&h.number_repo, account_id, "mock", "+12125550199").await;

    let mut progress = WorkflowProgress::new(account_id, Uuid::new_v4(), lead.id, Uuid::new_v4());
    progress.next_step_at = None;
    h.workflow_repo.create(&progress).await.unwrap();

    let mut entry = make_entry(account_id, "+14155550101");
    entry.lead_id = lead.id;
    entry.priority = 1;
    h.dialing_queue.enqueue(entry.clone()).await.unwrap();

    let adapter = Arc::new(MockAdapter::new(MockBehavior::Accept));
    scheduler(&h, adapter.clone()).run_tick().await;

    // Exactly one attempt for the lead, entry consumed
    assert_eq!(adapter.call_count(), 1);
    let attempt_id: Uuid = adapter.calls()[0].metadata["attempt_id"].parse().unwrap();
    let attempt = h.attempt_repo.find_by_id(attempt_id).await.unwrap().unwrap();
    assert_eq!(attempt.lead_id, lead.id);
    let stored = h.queue_repo.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QueueStatus::Completed);

    let processor = DispositionProcessor::new(
        h.lead_repo.clone(),
        h.queue_repo.clone(),
        h.dnc_repo.clone(),
        h.workflow_repo.clone(),
        h.pipeline_repo.clone(),
        h.disposition_repo.clone(),
        h.attempt_repo.clone(),
        h.audit_repo.clone(),
    );
    let report = processor
        .process(&DispositionEvent {
            lead_id: lead.id,
            account_id,
            disposition_name: "appointment_set".to_string(),
            disposition_id: None,
            call_id: Some(attempt_id),
            set_by: SetBy::Ai,
            confidence: Some(0.9),
        })
        .await
        .unwrap();

    assert!(report.classes.remove_from_sequence);
    assert!(!report.classes.dnc);
    assert!(!report.had_failures);

    let active = h.workflow_repo.find_active_by_lead(lead.id).await.unwrap();
    assert!(active.is_empty(), "workflow should be removed");

    let position = h
        .pipeline_repo
        .find_position(account_id, lead.id)
        .await
        .unwrap()
        .expect("lead should land on a board");
    assert_eq!(position.stage, "Appointment Set");

    let lead = h.lead_repo.find_by_id(lead.id).await.unwrap().unwrap();
    assert_eq!(lead.status, "appointment_set");
    assert!(!lead.do_not_contact, "positive outcome must not register DNC");
}
