// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::call_attempt::{CallAttemptRecord, CallStatus};
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 近期结局统计，自适应节奏的输入
#[derive(Debug, Default, Clone, Copy)]
pub struct OutcomeRates {
    /// 窗口内终态记录总数
    pub total: u64,
    /// 窗口内失败记录数
    pub failed: u64,
    /// 窗口内接通（completed）记录数
    pub answered: u64,
}

impl OutcomeRates {
    /// 失败率，无样本时为0
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

/// 呼叫尝试记录仓库特质
#[async_trait]
pub trait CallAttemptRepository: Send + Sync {
    /// 创建新记录
    async fn create(&self, record: &CallAttemptRecord)
        -> Result<CallAttemptRecord, RepositoryError>;
    /// 根据ID查找记录
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CallAttemptRecord>, RepositoryError>;
    /// 根据提供商呼叫ID查找记录（回执关联）
    async fn find_by_provider_call_id(
        &self,
        provider_call_id: &str,
    ) -> Result<Option<CallAttemptRecord>, RepositoryError>;
    /// 更新记录
    async fn update(&self, record: &CallAttemptRecord)
        -> Result<CallAttemptRecord, RepositoryError>;
    /// 更新记录状态（回执路径）
    async fn update_status(
        &self,
        id: Uuid,
        status: CallStatus,
        outcome: Option<String>,
    ) -> Result<(), RepositoryError>;
    /// 统计账户在途记录数（派生并发计数，不落盘）
    async fn count_in_flight(&self, account_id: Uuid) -> Result<u64, RepositoryError>;
    /// 统计提供商在途记录数
    async fn count_in_flight_by_provider(&self, provider: &str)
        -> Result<u64, RepositoryError>;
    /// 强制关闭超时未收到回执的在途记录
    async fn force_close_stale(
        &self,
        timeout: chrono::Duration,
        note: &str,
    ) -> Result<u64, RepositoryError>;
    /// 统计窗口内账户的结局分布
    async fn recent_outcome_rates(
        &self,
        account_id: Uuid,
        window: chrono::Duration,
    ) -> Result<OutcomeRates, RepositoryError>;
}
