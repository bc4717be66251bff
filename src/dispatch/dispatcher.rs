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

use crate::dispatch::governor::{Admission, ConcurrencyGovernor};
use crate::domain::models::call_attempt::{CallAttemptRecord, CallStatus, ContactChannel};
use crate::domain::models::queue_entry::QueueEntry;
use crate::domain::repositories::call_attempt_repository::CallAttemptRepository;
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::providers::router::{ProviderRouter, RouterError, RoutingRequirements};
use crate::providers::traits::CallRequest;
use crate::queue::dialing_queue::{DialingQueue, SubmissionResult};
use crate::utils::errors::DispatchError;
use chrono::Utc;
use dashmap::DashSet;
use metrics::{counter, gauge, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 一次派发突发的结果
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchOutcome {
    /// 本次成功提交的条目数
    pub dispatched: u64,
    /// 账户剩余到期条目数
    pub remaining: u64,
}

/// 派发器
///
/// 把认领到的队列条目转换为提供商呼叫。单条目错误互相隔离，
/// 暂停派发只停止新认领，从不取消在途呼叫
pub struct Dispatcher {
    /// 拨号队列
    queue: Arc<dyn DialingQueue>,
    /// 呼叫尝试记录仓库
    attempts: Arc<dyn CallAttemptRepository>,
    /// 线索仓库
    leads: Arc<dyn LeadRepository>,
    /// 提供商路由器
    router: Arc<ProviderRouter>,
    /// 并发治理器
    governor: Arc<ConcurrencyGovernor>,
    /// 单次提交超时
    submission_timeout: Duration,
    /// 暂停派发的账户集合，仅存内存
    paused_accounts: DashSet<Uuid>,
}

impl Dispatcher {
    /// 创建新的派发器实例
    ///
    /// # 参数
    ///
    /// * `queue` - 拨号队列
    /// * `attempts` - 呼叫尝试记录仓库
    /// * `leads` - 线索仓库
    /// * `router` - 提供商路由器
    /// * `governor` - 并发治理器
    /// * `submission_timeout` - 单次提交超时
    ///
    /// # 返回值
    ///
    /// 返回新的派发器实例
    pub fn new(
        queue: Arc<dyn DialingQueue>,
        attempts: Arc<dyn CallAttemptRepository>,
        leads: Arc<dyn LeadRepository>,
        router: Arc<ProviderRouter>,
        governor: Arc<ConcurrencyGovernor>,
        submission_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            attempts,
            leads,
            router,
            governor,
            submission_timeout,
            paused_accounts: DashSet::new(),
        }
    }

    /// 暂停账户的新认领，在途呼叫不受影响
    pub fn pause_account(&self, account_id: Uuid) {
        info!(account_id = %account_id, "Dispatch paused for account");
        self.paused_accounts.insert(account_id);
    }

    /// 恢复账户派发
    pub fn resume_account(&self, account_id: Uuid) {
        info!(account_id = %account_id, "Dispatch resumed for account");
        self.paused_accounts.remove(&account_id);
    }

    /// 账户是否处于派发暂停状态
    pub fn is_paused(&self, account_id: Uuid) -> bool {
        self.paused_accounts.contains(&account_id)
    }

    /// 执行一次派发突发
    ///
    /// # 参数
    ///
    /// * `account_id` - 账户ID
    /// * `burst_size` - 突发上限
    ///
    /// # 返回值
    ///
    /// * `Ok(DispatchOutcome)` - 本次派发的统计
    /// * `Err(DispatchError)` - 突发级别的错误（准入查询或认领失败）
    pub async fn run_once(
        &self,
        account_id: Uuid,
        burst_size: u64,
    ) -> Result<DispatchOutcome, DispatchError> {
        // 暂停只拦新认领，已提交的在途呼叫照常落账
        if self.is_paused(account_id) {
            debug!(account_id = %account_id, "Account paused, skipping claims");
            let remaining = self
                .queue
                .due_count(account_id)
                .await
                .map_err(|e| DispatchError::QueueError(e.to_string()))?;
            return Ok(DispatchOutcome {
                dispatched: 0,
                remaining,
            });
        }

        let in_flight = self
            .attempts
            .count_in_flight(account_id)
            .await
            .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;
        gauge!("dial_in_flight_attempts").set(in_flight as f64);

        let admission = self.governor.admit(in_flight, burst_size);
        let allowed = admission.allowed();
        if allowed == 0 {
            counter!("dial_governor_denials_total").increment(1);
            if let Admission::Deny { reason, .. } = admission {
                debug!(account_id = %account_id, ?reason, "Governor denied burst");
            }
            let remaining = self
                .queue
                .due_count(account_id)
                .await
                .map_err(|e| DispatchError::QueueError(e.to_string()))?;
            return Ok(DispatchOutcome {
                dispatched: 0,
                remaining,
            });
        }

        let claimed = self
            .queue
            .claim_due(account_id, allowed)
            .await
            .map_err(|e| DispatchError::QueueError(e.to_string()))?;

        let results = futures::future::join_all(
            claimed.iter().map(|entry| self.dispatch_entry(entry)),
        )
        .await;

        let mut dispatched = 0;
        for (entry, result) in claimed.iter().zip(results) {
            match result {
                Ok(true) => dispatched += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "Entry dispatch failed");
                    if let Err(mark_err) = self
                        .queue
                        .mark_result(entry.id, SubmissionResult::Failed)
                        .await
                    {
                        warn!(entry_id = %entry.id, error = %mark_err, "Failed to mark entry");
                    }
                }
            }
        }

        let remaining = self
            .queue
            .due_count(account_id)
            .await
            .map_err(|e| DispatchError::QueueError(e.to_string()))?;

        if dispatched > 0 {
            counter!("dial_attempts_dispatched_total").increment(dispatched);
            info!(
                account_id = %account_id,
                dispatched,
                remaining,
                "Dispatch burst complete"
            );
        }

        Ok(DispatchOutcome {
            dispatched,
            remaining,
        })
    }

    /// 派发单个已认领条目
    ///
    /// 返回Ok(true)表示提供商接受了提交，Ok(false)表示条目被
    /// 跳过或失败但已自行落账
    async fn dispatch_entry(&self, entry: &QueueEntry) -> Result<bool, DispatchError> {
        // 派发前复核禁止联络标志，处置与入队之间存在竞争窗口
        let lead = self
            .leads
            .find_by_id(entry.lead_id)
            .await
            .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;
        if lead.as_ref().is_some_and(|l| l.do_not_contact) {
            info!(entry_id = %entry.id, lead_id = %entry.lead_id, "Lead is DNC, entry removed");
            self.queue
                .mark_result(entry.id, SubmissionResult::Removed)
                .await
                .map_err(|e| DispatchError::QueueError(e.to_string()))?;
            return Ok(false);
        }

        let requirements = RoutingRequirements {
            channel: ContactChannel::Call,
            prefer_signed: true,
        };
        let decision = match self
            .router
            .select(entry.account_id, &requirements, &entry.phone_number)
            .await
        {
            Ok(decision) => decision,
            Err(RouterError::NoEligibleProvider) => {
                counter!("dial_no_eligible_provider_total").increment(1);
                warn!(entry_id = %entry.id, "No eligible provider, retrying next tick");
                self.queue
                    .release(entry.id, Utc::now() + chrono::Duration::seconds(60))
                    .await
                    .map_err(|e| DispatchError::QueueError(e.to_string()))?;
                return Ok(false);
            }
            Err(RouterError::Repository(e)) => {
                return Err(DispatchError::RoutingError(e.to_string()));
            }
        };

        let provider_in_flight = self
            .attempts
            .count_in_flight_by_provider(decision.adapter.name())
            .await
            .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;
        if self.governor.admit_provider(provider_in_flight).allowed() == 0 {
            counter!("dial_governor_denials_total").increment(1);
            self.queue
                .release(entry.id, Utc::now() + chrono::Duration::seconds(30))
                .await
                .map_err(|e| DispatchError::QueueError(e.to_string()))?;
            return Ok(false);
        }

        self.governor.pace(entry.account_id).await;

        let mut record = CallAttemptRecord::new(
            entry.account_id,
            Some(entry.id),
            entry.lead_id,
            decision.adapter.name().to_string(),
            decision.number.number.clone(),
            entry.phone_number.clone(),
            ContactChannel::Call,
        );
        record.metadata = serde_json::json!({ "routing_reason": decision.reason });
        self.attempts
            .create(&record)
            .await
            .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;

        let mut metadata = HashMap::new();
        metadata.insert("attempt_id".to_string(), record.id.to_string());
        metadata.insert("lead_id".to_string(), entry.lead_id.to_string());
        let request = CallRequest {
            account_id: entry.account_id,
            lead_id: entry.lead_id,
            from_number: decision.number.number.clone(),
            to_number: entry.phone_number.clone(),
            metadata,
        };

        let start = Instant::now();
        let submission =
            tokio::time::timeout(self.submission_timeout, decision.adapter.create_call(&request))
                .await;
        histogram!("dial_submission_duration_seconds").record(start.elapsed().as_secs_f64());

        match submission {
            Ok(Ok(response)) if response.success => {
                record.provider_call_id = response.provider_call_id;
                self.attempts
                    .update(&record)
                    .await
                    .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;
                self.queue
                    .mark_result(entry.id, SubmissionResult::Accepted)
                    .await
                    .map_err(|e| DispatchError::QueueError(e.to_string()))?;
                debug!(entry_id = %entry.id, attempt_id = %record.id, "Call submitted");
                Ok(true)
            }
            Ok(Ok(response)) => {
                self.close_failed_attempt(&record, response.message.as_deref().unwrap_or("rejected"))
                    .await?;
                self.queue
                    .mark_result(entry.id, SubmissionResult::Failed)
                    .await
                    .map_err(|e| DispatchError::QueueError(e.to_string()))?;
                Ok(false)
            }
            Ok(Err(e)) => {
                counter!("dial_submission_failures_total").increment(1);
                let result = if e.is_rate_limited() {
                    self.router.note_rate_limited(decision.adapter.name());
                    self.governor.nudge_down();
                    SubmissionResult::RateLimited
                } else {
                    SubmissionResult::Failed
                };
                self.close_failed_attempt(&record, &e.to_string()).await?;
                self.queue
                    .mark_result(entry.id, result)
                    .await
                    .map_err(|err| DispatchError::QueueError(err.to_string()))?;
                warn!(entry_id = %entry.id, error = %e, "Submission failed");
                Ok(false)
            }
            Err(_) => {
                counter!("dial_submission_failures_total").increment(1);
                self.close_failed_attempt(&record, "submission timeout")
                    .await?;
                self.queue
                    .mark_result(entry.id, SubmissionResult::Failed)
                    .await
                    .map_err(|e| DispatchError::QueueError(e.to_string()))?;
                warn!(entry_id = %entry.id, "Submission timed out");
                Ok(false)
            }
        }
    }

    async fn close_failed_attempt(
        &self,
        record: &CallAttemptRecord,
        outcome: &str,
    ) -> Result<(), DispatchError> {
        self.attempts
            .update_status(record.id, CallStatus::Failed, Some(outcome.to_string()))
            .await
            .map_err(|e| DispatchError::RepositoryError(e.to_string()))?;
        Ok(())
    }
}
