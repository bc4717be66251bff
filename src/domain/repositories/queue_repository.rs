// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::queue_entry::QueueEntry;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 滞留条目清理结果
#[derive(Debug, Default, Clone, Copy)]
pub struct StuckSweepResult {
    /// 重置回pending的条目数
    pub reset: u64,
    /// 因达到最大尝试次数被降级为failed的条目数
    pub demoted: u64,
}

/// 拨号队列仓库特质
///
/// 定义队列条目数据访问接口。认领必须是以当前状态为条件的
/// 条件更新，并发认领者不会拿到同一条目
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// 创建新条目
    async fn create(&self, entry: &QueueEntry) -> Result<QueueEntry, RepositoryError>;
    /// 根据ID查找条目
    async fn find_by_id(&self, id: Uuid) -> Result<Option<QueueEntry>, RepositoryError>;
    /// 更新条目
    async fn update(&self, entry: &QueueEntry) -> Result<QueueEntry, RepositoryError>;
    /// 查找同一(campaign, lead)的非终态条目
    async fn find_non_terminal(
        &self,
        campaign_id: Uuid,
        lead_id: Uuid,
    ) -> Result<Option<QueueEntry>, RepositoryError>;
    /// 认领到期条目，按优先级降序、不早于时间升序，最多limit条
    async fn claim_due(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<QueueEntry>, RepositoryError>;
    /// 标记条目提交成功
    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记条目终态失败
    async fn mark_failed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 提交失败后退避重新排期（claimed回到pending）
    async fn release_to_pending(
        &self,
        id: Uuid,
        scheduled_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;
    /// 移除某线索priority低于阈值的pending/claimed条目
    async fn remove_for_lead(
        &self,
        lead_id: Uuid,
        below_priority: i32,
    ) -> Result<u64, RepositoryError>;
    /// 清理滞留在claimed超过超时窗口的条目
    async fn sweep_stuck(
        &self,
        timeout: chrono::Duration,
    ) -> Result<StuckSweepResult, RepositoryError>;
    /// 统计账户当前到期可认领的条目数
    async fn count_due(&self, account_id: Uuid) -> Result<u64, RepositoryError>;
    /// 查找存在到期条目的账户
    async fn accounts_with_due_entries(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, RepositoryError>;
}
