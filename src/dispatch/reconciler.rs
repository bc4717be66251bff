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

use crate::domain::repositories::call_attempt_repository::CallAttemptRepository;
use crate::domain::repositories::queue_repository::QueueRepository;
use crate::utils::errors::SchedulerError;
use metrics::counter;
use std::sync::Arc;
use tracing::info;

/// 对账结果
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileOutcome {
    /// 重置回pending的滞留条目数
    pub entries_reset: u64,
    /// 降级为failed的滞留条目数
    pub entries_demoted: u64,
    /// 强制关闭的在途呼叫记录数
    pub attempts_closed: u64,
}

/// 滞留对账器
///
/// 每tick清理两类滞留：认领后一直没有落账的队列条目，
/// 和发起后一直没有回执的在途呼叫记录
pub struct Reconciler {
    /// 队列条目仓库
    queue: Arc<dyn QueueRepository>,
    /// 呼叫尝试记录仓库
    attempts: Arc<dyn CallAttemptRepository>,
    /// 认领滞留超时
    claim_timeout: chrono::Duration,
    /// 呼叫在途超时
    attempt_timeout: chrono::Duration,
}

impl Reconciler {
    /// 创建新的对账器实例
    ///
    /// # 参数
    ///
    /// * `queue` - 队列条目仓库
    /// * `attempts` - 呼叫尝试记录仓库
    /// * `claim_timeout` - 认领滞留超时（参考值2分钟）
    /// * `attempt_timeout` - 在途滞留超时（参考值5分钟）
    ///
    /// # 返回值
    ///
    /// 返回新的对账器实例
    pub fn new(
        queue: Arc<dyn QueueRepository>,
        attempts: Arc<dyn CallAttemptRepository>,
        claim_timeout: chrono::Duration,
        attempt_timeout: chrono::Duration,
    ) -> Self {
        Self {
            queue,
            attempts,
            claim_timeout,
            attempt_timeout,
        }
    }

    /// 执行一次对账
    ///
    /// # 返回值
    ///
    /// * `Ok(ReconcileOutcome)` - 对账统计
    /// * `Err(SchedulerError)` - 对账失败
    pub async fn run_once(&self) -> Result<ReconcileOutcome, SchedulerError> {
        let sweep = self
            .queue
            .sweep_stuck(self.claim_timeout)
            .await
            .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?;

        let closed = self
            .attempts
            .force_close_stale(self.attempt_timeout, "reconciler timeout, no provider event")
            .await
            .map_err(|e| SchedulerError::RepositoryError(e.to_string()))?;

        if sweep.reset > 0 || sweep.demoted > 0 || closed > 0 {
            counter!("reconciler_stuck_entries_reset_total").increment(sweep.reset);
            counter!("reconciler_attempts_forced_closed_total").increment(closed);
            info!(
                reset = sweep.reset,
                demoted = sweep.demoted,
                closed,
                "Reconciler swept stuck work"
            );
        }

        Ok(ReconcileOutcome {
            entries_reset: sweep.reset,
            entries_demoted: sweep.demoted,
            attempts_closed: closed,
        })
    }
}
