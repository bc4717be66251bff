// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_provider;

use dialrs::config::settings::{PacingSettings, SchedulerSettings};
use dialrs::dispatch::dispatcher::Dispatcher;
use dialrs::dispatch::governor::ConcurrencyGovernor;
use dialrs::domain::models::lead::Lead;
use dialrs::domain::models::provider_number::{Capability, ProviderNumber};
use dialrs::domain::models::queue_entry::QueueEntry;
use dialrs::domain::repositories::audit_repository::AuditRepository;
use dialrs::domain::repositories::call_attempt_repository::CallAttemptRepository;
use dialrs::domain::repositories::disposition_repository::DispositionRepository;
use dialrs::domain::repositories::dnc_repository::DncRepository;
use dialrs::domain::repositories::lead_repository::LeadRepository;
use dialrs::domain::repositories::pipeline_repository::PipelineRepository;
use dialrs::domain::repositories::provider_number_repository::ProviderNumberRepository;
use dialrs::domain::repositories::queue_repository::QueueRepository;
use dialrs::domain::repositories::workflow_repository::WorkflowRepository;
use dialrs::infrastructure::repositories::audit_repo_impl::AuditRepositoryImpl;
use dialrs::infrastructure::repositories::call_attempt_repo_impl::CallAttemptRepositoryImpl;
use dialrs::infrastructure::repositories::disposition_repo_impl::DispositionRepositoryImpl;
use dialrs::infrastructure::repositories::dnc_repo_impl::DncRepositoryImpl;
use dialrs::infrastructure::repositories::lead_repo_impl::LeadRepositoryImpl;
use dialrs::infrastructure::repositories::pipeline_repo_impl::PipelineRepositoryImpl;
use dialrs::infrastructure::repositories::provider_number_repo_impl::ProviderNumberRepositoryImpl;
use dialrs::infrastructure::repositories::queue_repo_impl::QueueRepositoryImpl;
use dialrs::infrastructure::repositories::workflow_repo_impl::WorkflowRepositoryImpl;
use dialrs::providers::router::ProviderRouter;
use dialrs::providers::traits::ProviderAdapter;
use dialrs::queue::dialing_queue::{DialingQueue, PostgresDialingQueue};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 测试环境：内存SQLite上的完整仓库集
pub struct Harness {
    pub db: Arc<DatabaseConnection>,
    pub queue_repo: Arc<dyn QueueRepository>,
    pub attempt_repo: Arc<dyn CallAttemptRepository>,
    pub lead_repo: Arc<dyn LeadRepository>,
    pub dnc_repo: Arc<dyn DncRepository>,
    pub workflow_repo: Arc<dyn WorkflowRepository>,
    pub pipeline_repo: Arc<dyn PipelineRepository>,
    pub disposition_repo: Arc<dyn DispositionRepository>,
    pub audit_repo: Arc<dyn AuditRepository>,
    pub number_repo: Arc<dyn ProviderNumberRepository>,
    pub dialing_queue: Arc<dyn DialingQueue>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should connect");
        Migrator::up(&db, None)
            .await
            .expect("migrations should apply");
        let db = Arc::new(db);

        Self {
            queue_repo: Arc::new(QueueRepositoryImpl::new(db.clone())),
            attempt_repo: Arc::new(CallAttemptRepositoryImpl::new(db.clone())),
            lead_repo: Arc::new(LeadRepositoryImpl::new(db.clone())),
            dnc_repo: Arc::new(DncRepositoryImpl::new(db.clone())),
            workflow_repo: Arc::new(WorkflowRepositoryImpl::new(db.clone())),
            pipeline_repo: Arc::new(PipelineRepositoryImpl::new(db.clone())),
            disposition_repo: Arc::new(DispositionRepositoryImpl::new(db.clone())),
            audit_repo: Arc::new(AuditRepositoryImpl::new(db.clone())),
            number_repo: Arc::new(ProviderNumberRepositoryImpl::new(db.clone())),
            dialing_queue: Arc::new(PostgresDialingQueue::new(Arc::new(
                QueueRepositoryImpl::new(db.clone()),
            ))),
            db,
        }
    }

    /// 用给定适配器和节奏配置构建派发器
    pub fn dispatcher_with(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        pacing: PacingSettings,
    ) -> (Arc<Dispatcher>, Arc<ProviderRouter>, Arc<ConcurrencyGovernor>) {
        let router = Arc::new(ProviderRouter::new(
            vec![adapter],
            self.number_repo.clone(),
            chrono::Duration::seconds(60),
        ));
        let governor = Arc::new(ConcurrencyGovernor::new(pacing));
        let dispatcher = Arc::new(Dispatcher::new(
            self.dialing_queue.clone(),
            self.attempt_repo.clone(),
            self.lead_repo.clone(),
            router.clone(),
            governor.clone(),
            Duration::from_secs(5),
        ));
        (dispatcher, router, governor)
    }
}

pub fn pacing_settings() -> PacingSettings {
    PacingSettings {
        max_concurrent_per_account: 5,
        max_concurrent_per_provider: 20,
        target_attempts_per_minute: 30,
        min_attempts_per_minute: 5,
        max_attempts_per_minute: 60,
        adaptive: false,
        error_rate_threshold: 0.3,
    }
}

pub fn scheduler_settings() -> SchedulerSettings {
    SchedulerSettings {
        tick_seconds: 60,
        bursts_per_tick: 2,
        burst_size: 10,
        worker_pool_size: 4,
        claim_timeout_seconds: 120,
        attempt_timeout_seconds: 300,
        submission_timeout_seconds: 5,
    }
}

pub fn make_entry(account_id: Uuid, phone: &str) -> QueueEntry {
    QueueEntry::new(
        account_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        phone.to_string(),
        0,
        None,
    )
}

pub async fn seed_lead(repo: &Arc<dyn LeadRepository>, account_id: Uuid, phone: &str) -> Lead {
    repo.create(&Lead::new(account_id, phone.to_string()))
        .await
        .expect("lead should insert")
}

pub async fn seed_number(
    repo: &Arc<dyn ProviderNumberRepository>,
    account_id: Uuid,
    provider: &str,
    number: &str,
) -> ProviderNumber {
    let mut caps = HashSet::new();
    caps.insert(Capability::Voice);
    caps.insert(Capability::SignedCalling);
    let mut n = ProviderNumber::new(account_id, provider.to_string(), number.to_string(), caps);
    n.verified = true;
    repo.create(&n).await.expect("number should insert")
}
