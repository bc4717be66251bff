// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SchedulerSettings;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::governor::ConcurrencyGovernor;
use crate::dispatch::reconciler::Reconciler;
use crate::domain::models::queue_entry::QueueEntry;
use crate::domain::repositories::call_attempt_repository::CallAttemptRepository;
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::domain::repositories::queue_repository::QueueRepository;
use crate::domain::repositories::workflow_repository::WorkflowRepository;
use crate::queue::dialing_queue::{DialingQueue, QueueError};
use crate::utils::errors::SchedulerError;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 自适应调速的观察窗口
const OUTCOME_WINDOW: chrono::Duration = chrono::Duration::minutes(10);

/// 调度循环
///
/// 进程内的周期ticker，替代外部cron。每tick按固定顺序执行
/// 四个阶段，每个阶段的错误单独捕获，不影响后续阶段：
/// 对账 → 回拨入队 → 到期工作流步骤 → 按账户派发突发
pub struct SchedulerLoop {
    /// 滞留对账器
    reconciler: Arc<Reconciler>,
    /// 派发器
    dispatcher: Arc<Dispatcher>,
    /// 拨号队列
    queue: Arc<dyn DialingQueue>,
    /// 队列条目仓库（账户枚举）
    queue_repo: Arc<dyn QueueRepository>,
    /// 线索仓库
    leads: Arc<dyn LeadRepository>,
    /// 工作流进度仓库
    workflows: Arc<dyn WorkflowRepository>,
    /// 呼叫尝试记录仓库（自适应调速输入）
    attempts: Arc<dyn CallAttemptRepository>,
    /// 并发治理器
    governor: Arc<ConcurrencyGovernor>,
    /// 调度配置
    settings: SchedulerSettings,
}

impl SchedulerLoop {
    /// 创建新的调度循环实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reconciler: Arc<Reconciler>,
        dispatcher: Arc<Dispatcher>,
        queue: Arc<dyn DialingQueue>,
        queue_repo: Arc<dyn QueueRepository>,
        leads: Arc<dyn LeadRepository>,
        workflows: Arc<dyn WorkflowRepository>,
        attempts: Arc<dyn CallAttemptRepository>,
        governor: Arc<ConcurrencyGovernor>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            reconciler,
            dispatcher,
            queue,
            queue_repo,
            leads,
            workflows,
            attempts,
            governor,
            settings,
        }
    }

    /// 启动调度循环后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let tick = TokioDuration::from_secs(self.settings.tick_seconds);

        tokio::spawn(async move {
            let mut interval = interval(tick);
            info!(tick_seconds = self.settings.tick_seconds, "Scheduler loop started");

            loop {
                interval.tick().await;
                self.run_tick().await;
            }
        })
    }

    /// 执行一个完整tick，每阶段错误隔离
    pub async fn run_tick(&self) {
        if let Err(e) = self.reconciler.run_once().await {
            error!(error = %e, "Reconciler stage failed");
        }

        if let Err(e) = self.pick_up_callbacks().await {
            error!(error = %e, "Callback pickup stage failed");
        }

        if let Err(e) = self.advance_workflow_steps().await {
            error!(error = %e, "Workflow step stage failed");
        }

        if let Err(e) = self.dispatch_accounts().await {
            error!(error = %e, "Dispatch stage failed");
        }

        debug!("Scheduler tick complete");
    }

    /// 阶段b：把回拨到期的线索upsert进队列回拨段
    async fn pick_up_callbacks(&self) -> Result<(), SchedulerError> {
        let due = self
            .leads
            .find_due_callbacks(Utc::now())
            .await
            .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?;

        for mut lead in due {
            // 回拨归属线索当前活动工作流的活动，没有工作流的
            // 孤立回拨挂在空活动下
            let campaign_id = self
                .workflows
                .find_active_by_lead(lead.id)
                .await
                .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?
                .first()
                .map(|w| w.campaign_id)
                .unwrap_or(Uuid::nil());

            let at = lead.next_callback_at.map(|t| t.to_utc()).unwrap_or_else(Utc::now);
            match self
                .queue
                .requeue_callback(lead.account_id, campaign_id, lead.id, lead.phone.clone(), at)
                .await
            {
                Ok(entry) => {
                    debug!(lead_id = %lead.id, entry_id = %entry.id, "Callback picked up");
                    lead.next_callback_at = None;
                    if let Err(e) = self.leads.update(&lead).await {
                        warn!(lead_id = %lead.id, error = %e, "Failed to clear callback time");
                    }
                }
                Err(e) => {
                    warn!(lead_id = %lead.id, error = %e, "Callback pickup failed");
                }
            }
        }

        Ok(())
    }

    /// 阶段c：到期工作流步骤推进，把线索的下一次尝试入队
    async fn advance_workflow_steps(&self) -> Result<(), SchedulerError> {
        let due = self
            .workflows
            .find_due_steps(Utc::now())
            .await
            .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?;

        for mut progress in due {
            let Some(lead) = self
                .leads
                .find_by_id(progress.lead_id)
                .await
                .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?
            else {
                warn!(lead_id = %progress.lead_id, "Workflow step for missing lead skipped");
                continue;
            };

            if lead.do_not_contact {
                continue;
            }

            let entry = QueueEntry::new(
                progress.account_id,
                progress.campaign_id,
                progress.lead_id,
                lead.phone.clone(),
                0,
                None,
            );
            match self.queue.enqueue(entry).await {
                Ok(_) | Err(QueueError::DuplicateEntry { .. }) => {
                    progress.next_step_at = None;
                    if let Err(e) = self.workflows.update(&progress).await {
                        warn!(progress_id = %progress.id, error = %e, "Failed to consume workflow step");
                    }
                }
                Err(e) => {
                    warn!(progress_id = %progress.id, error = %e, "Workflow step enqueue failed");
                }
            }
        }

        Ok(())
    }

    /// 阶段d：对每个有到期条目的账户跑派发突发
    async fn dispatch_accounts(&self) -> Result<(), SchedulerError> {
        let accounts = self
            .queue_repo
            .accounts_with_due_entries(Utc::now())
            .await
            .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?;

        if accounts.is_empty() {
            return Ok(());
        }

        futures::stream::iter(accounts)
            .for_each_concurrent(self.settings.worker_pool_size, |account_id| async move {
                self.dispatch_account(account_id).await;
            })
            .await;

        Ok(())
    }

    async fn dispatch_account(&self, account_id: Uuid) {
        match self
            .attempts
            .recent_outcome_rates(account_id, OUTCOME_WINDOW)
            .await
        {
            Ok(rates) => self.governor.adapt(&rates),
            Err(e) => warn!(account_id = %account_id, error = %e, "Outcome rate query failed"),
        }

        for burst in 0..self.settings.bursts_per_tick {
            match self
                .dispatcher
                .run_once(account_id, self.settings.burst_size)
                .await
            {
                Ok(outcome) => {
                    if outcome.dispatched == 0 || outcome.remaining == 0 {
                        break;
                    }
                }
                Err(e) => {
                    warn!(account_id = %account_id, burst, error = %e, "Dispatch burst failed");
                    break;
                }
            }
        }
    }
}
