// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Extension;
use dialrs::config::settings::Settings;
use dialrs::dispatch::dispatcher::Dispatcher;
use dialrs::dispatch::governor::ConcurrencyGovernor;
use dialrs::dispatch::reconciler::Reconciler;
use dialrs::dispositions::processor::DispositionProcessor;
use dialrs::domain::repositories::audit_repository::AuditRepository;
use dialrs::domain::repositories::call_attempt_repository::CallAttemptRepository;
use dialrs::domain::repositories::disposition_repository::DispositionRepository;
use dialrs::domain::repositories::dnc_repository::DncRepository;
use dialrs::domain::repositories::lead_repository::LeadRepository;
use dialrs::domain::repositories::pipeline_repository::PipelineRepository;
use dialrs::domain::repositories::provider_number_repository::ProviderNumberRepository;
use dialrs::domain::repositories::queue_repository::QueueRepository;
use dialrs::domain::repositories::workflow_repository::WorkflowRepository;
use dialrs::infrastructure::database::connection;
use dialrs::infrastructure::repositories::audit_repo_impl::AuditRepositoryImpl;
use dialrs::infrastructure::repositories::call_attempt_repo_impl::CallAttemptRepositoryImpl;
use dialrs::infrastructure::repositories::disposition_repo_impl::DispositionRepositoryImpl;
use dialrs::infrastructure::repositories::dnc_repo_impl::DncRepositoryImpl;
use dialrs::infrastructure::repositories::lead_repo_impl::LeadRepositoryImpl;
use dialrs::infrastructure::repositories::pipeline_repo_impl::PipelineRepositoryImpl;
use dialrs::infrastructure::repositories::provider_number_repo_impl::ProviderNumberRepositoryImpl;
use dialrs::infrastructure::repositories::queue_repo_impl::QueueRepositoryImpl;
use dialrs::infrastructure::repositories::workflow_repo_impl::WorkflowRepositoryImpl;
use dialrs::presentation::routes;
use dialrs::providers::retell::RetellAdapter;
use dialrs::providers::router::ProviderRouter;
use dialrs::providers::telnyx::TelnyxAdapter;
use dialrs::providers::traits::ProviderAdapter;
use dialrs::providers::twilio::TwilioAdapter;
use dialrs::queue::dialing_queue::{DialingQueue, PostgresDialingQueue};
use dialrs::queue::scheduler::SchedulerLoop;
use dialrs::utils::telemetry;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting dialrs...");

    // Initialize Prometheus Metrics
    dialrs::infrastructure::observability::metrics::init_metrics();

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Repositories
    let queue_repo: Arc<dyn QueueRepository> = Arc::new(QueueRepositoryImpl::new(db.clone()));
    let attempt_repo: Arc<dyn CallAttemptRepository> =
        Arc::new(CallAttemptRepositoryImpl::new(db.clone()));
    let lead_repo: Arc<dyn LeadRepository> = Arc::new(LeadRepositoryImpl::new(db.clone()));
    let dnc_repo: Arc<dyn DncRepository> = Arc::new(DncRepositoryImpl::new(db.clone()));
    let workflow_repo: Arc<dyn WorkflowRepository> =
        Arc::new(WorkflowRepositoryImpl::new(db.clone()));
    let pipeline_repo: Arc<dyn PipelineRepository> =
        Arc::new(PipelineRepositoryImpl::new(db.clone()));
    let disposition_repo: Arc<dyn DispositionRepository> =
        Arc::new(DispositionRepositoryImpl::new(db.clone()));
    let audit_repo: Arc<dyn AuditRepository> = Arc::new(AuditRepositoryImpl::new(db.clone()));
    let number_repo: Arc<dyn ProviderNumberRepository> =
        Arc::new(ProviderNumberRepositoryImpl::new(db.clone()));

    // 5. Initialize Provider Adapters
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    if let Some(retell) = &settings.providers.retell {
        adapters.push(Arc::new(RetellAdapter::new(retell)));
    }
    if let Some(telnyx) = &settings.providers.telnyx {
        adapters.push(Arc::new(TelnyxAdapter::new(telnyx)));
    }
    if let Some(twilio) = &settings.providers.twilio {
        adapters.push(Arc::new(TwilioAdapter::new(twilio)));
    }
    info!(adapter_count = adapters.len(), "Provider adapters configured");

    let router = Arc::new(ProviderRouter::new(
        adapters,
        number_repo.clone(),
        chrono::Duration::seconds(settings.providers.rate_limit_cooldown_seconds as i64),
    ));

    // 6. Initialize Dispatch Components
    let governor = Arc::new(ConcurrencyGovernor::new(settings.pacing.clone()));
    let dialing_queue: Arc<dyn DialingQueue> =
        Arc::new(PostgresDialingQueue::new(Arc::new(QueueRepositoryImpl::new(
            db.clone(),
        ))));
    let dispatcher = Arc::new(Dispatcher::new(
        dialing_queue.clone(),
        attempt_repo.clone(),
        lead_repo.clone(),
        router.clone(),
        governor.clone(),
        Duration::from_secs(settings.scheduler.submission_timeout_seconds),
    ));
    let reconciler = Arc::new(Reconciler::new(
        queue_repo.clone(),
        attempt_repo.clone(),
        chrono::Duration::seconds(settings.scheduler.claim_timeout_seconds),
        chrono::Duration::seconds(settings.scheduler.attempt_timeout_seconds),
    ));

    let processor = Arc::new(DispositionProcessor::new(
        lead_repo.clone(),
        queue_repo.clone(),
        dnc_repo.clone(),
        workflow_repo.clone(),
        pipeline_repo.clone(),
        disposition_repo.clone(),
        attempt_repo.clone(),
        audit_repo.clone(),
    ));

    // 7. Start Scheduler Loop
    let scheduler = Arc::new(SchedulerLoop::new(
        reconciler,
        dispatcher.clone(),
        dialing_queue.clone(),
        queue_repo.clone(),
        lead_repo.clone(),
        workflow_repo.clone(),
        attempt_repo.clone(),
        governor.clone(),
        settings.scheduler.clone(),
    ));
    let _scheduler_handle = scheduler.start();

    // 8. Start HTTP server
    let app = routes::routes()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(dialing_queue))
        .layer(Extension(attempt_repo))
        .layer(Extension(processor))
        .layer(Extension(dispatcher))
        .layer(Extension(settings.clone()));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
