// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::queue_entry::{QueueEntry, QueueStatus, CALLBACK_PRIORITY_BAND};
use crate::domain::repositories::queue_repository::QueueRepository;
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::queue_repository::RepositoryError),

    /// 同一(campaign, lead)已存在非终态条目
    #[error("Duplicate non-terminal entry {existing}")]
    DuplicateEntry {
        /// 已存在的条目ID
        existing: Uuid,
    },

    /// 条目未找到
    #[error("Entry not found")]
    NotFound,
}

/// 提交结果
///
/// 派发器对已认领条目的落账输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionResult {
    /// 提供商已接受提交
    Accepted,
    /// 提交失败
    Failed,
    /// 提交被提供商限流
    RateLimited,
    /// 条目被策略移出（禁止联络等）
    Removed,
}

/// 拨号队列特质
#[async_trait]
pub trait DialingQueue: Send + Sync {
    /// 入队条目，存在非终态同键条目时返回DuplicateEntry
    async fn enqueue(&self, entry: QueueEntry) -> Result<QueueEntry, QueueError>;

    /// 认领到期条目
    async fn claim_due(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<QueueEntry>, QueueError>;

    /// 落账提交结果
    ///
    /// Accepted → completed；Failed/RateLimited在未达最大尝试次数时
    /// 按退避重新排期回pending，否则终态failed；Removed → removed
    async fn mark_result(
        &self,
        entry_id: Uuid,
        result: SubmissionResult,
    ) -> Result<(), QueueError>;

    /// 无消耗释放，条目回pending等待retry_at（瞬态原因，如暂无可用提供商）
    async fn release(&self, entry_id: Uuid, retry_at: DateTime<Utc>) -> Result<(), QueueError>;

    /// 回拨入队upsert
    ///
    /// 已有非终态条目时把它提升到回拨段并改排期，否则新建回拨段条目
    async fn requeue_callback(
        &self,
        account_id: Uuid,
        campaign_id: Uuid,
        lead_id: Uuid,
        phone_number: String,
        at: DateTime<Utc>,
    ) -> Result<QueueEntry, QueueError>;

    /// 账户到期条目数
    async fn due_count(&self, account_id: Uuid) -> Result<u64, QueueError>;
}

/// PostgreSQL拨号队列实现
pub struct PostgresDialingQueue<R: QueueRepository> {
    /// 队列条目仓库
    repository: Arc<R>,
    /// 提交失败退避策略
    retry: RetryPolicy,
    /// 限流退避策略
    rate_limited_retry: RetryPolicy,
}

impl<R: QueueRepository> PostgresDialingQueue<R> {
    /// 创建新的拨号队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 队列条目仓库
    ///
    /// # 返回值
    ///
    /// 返回新的拨号队列实例
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            retry: RetryPolicy::submission(),
            rate_limited_retry: RetryPolicy::rate_limited(),
        }
    }
}

#[async_trait]
impl<R: QueueRepository> DialingQueue for PostgresDialingQueue<R> {
    async fn enqueue(&self, entry: QueueEntry) -> Result<QueueEntry, QueueError> {
        if let Some(existing) = self
            .repository
            .find_non_terminal(entry.campaign_id, entry.lead_id)
            .await?
        {
            return Err(QueueError::DuplicateEntry {
                existing: existing.id,
            });
        }

        let created = self.repository.create(&entry).await?;
        debug!(entry_id = %created.id, lead_id = %created.lead_id, "Entry enqueued");
        Ok(created)
    }

    async fn claim_due(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<QueueEntry>, QueueError> {
        let claimed = self.repository.claim_due(account_id, limit).await?;
        Ok(claimed)
    }

    async fn mark_result(
        &self,
        entry_id: Uuid,
        result: SubmissionResult,
    ) -> Result<(), QueueError> {
        match result {
            SubmissionResult::Accepted => {
                self.repository.mark_completed(entry_id).await?;
            }
            SubmissionResult::Failed | SubmissionResult::RateLimited => {
                let entry = self
                    .repository
                    .find_by_id(entry_id)
                    .await?
                    .ok_or(QueueError::NotFound)?;

                if entry.can_retry() {
                    let policy = if result == SubmissionResult::RateLimited {
                        &self.rate_limited_retry
                    } else {
                        &self.retry
                    };
                    let retry_at =
                        policy.next_retry_time(entry.attempts as u32, Utc::now());
                    self.repository
                        .release_to_pending(entry_id, retry_at.into())
                        .await?;
                    debug!(
                        entry_id = %entry_id,
                        attempts = entry.attempts,
                        retry_at = %retry_at,
                        "Submission failed, rescheduled"
                    );
                } else {
                    self.repository.mark_failed(entry_id).await?;
                    info!(
                        entry_id = %entry_id,
                        attempts = entry.attempts,
                        "Submission failed terminally, max attempts reached"
                    );
                }
            }
            SubmissionResult::Removed => {
                let entry = self
                    .repository
                    .find_by_id(entry_id)
                    .await?
                    .ok_or(QueueError::NotFound)?;
                let mut updated = entry.clone();
                updated.status = QueueStatus::Removed;
                updated.claimed_at = None;
                self.repository.update(&updated).await?;
            }
        }
        Ok(())
    }

    async fn release(&self, entry_id: Uuid, retry_at: DateTime<Utc>) -> Result<(), QueueError> {
        self.repository
            .release_to_pending(entry_id, retry_at.into())
            .await?;
        Ok(())
    }

    async fn requeue_callback(
        &self,
        account_id: Uuid,
        campaign_id: Uuid,
        lead_id: Uuid,
        phone_number: String,
        at: DateTime<Utc>,
    ) -> Result<QueueEntry, QueueError> {
        if let Some(existing) = self
            .repository
            .find_non_terminal(campaign_id, lead_id)
            .await?
        {
            let mut updated = existing.clone();
            updated.priority = updated.priority.max(CALLBACK_PRIORITY_BAND);
            updated.scheduled_at = Some(at.into());
            let updated = self.repository.update(&updated).await?;
            debug!(entry_id = %updated.id, "Existing entry promoted to callback band");
            return Ok(updated);
        }

        let mut entry = QueueEntry::new(
            account_id,
            campaign_id,
            lead_id,
            phone_number,
            CALLBACK_PRIORITY_BAND,
            Some(at.into()),
        );
        entry.max_attempts = 3;

        let created = self.repository.create(&entry).await?;
        info!(entry_id = %created.id, lead_id = %lead_id, at = %at, "Callback enqueued");
        Ok(created)
    }

    async fn due_count(&self, account_id: Uuid) -> Result<u64, QueueError> {
        let count = self.repository.count_due(account_id).await?;
        Ok(count)
    }
}

#[async_trait]
impl<T: DialingQueue + ?Sized> DialingQueue for Arc<T> {
    async fn enqueue(&self, entry: QueueEntry) -> Result<QueueEntry, QueueError> {
        (**self).enqueue(entry).await
    }

    async fn claim_due(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<QueueEntry>, QueueError> {
        (**self).claim_due(account_id, limit).await
    }

    async fn mark_result(
        &self,
        entry_id: Uuid,
        result: SubmissionResult,
    ) -> Result<(), QueueError> {
        (**self).mark_result(entry_id, result).await
    }

    async fn release(&self, entry_id: Uuid, retry_at: DateTime<Utc>) -> Result<(), QueueError> {
        (**self).release(entry_id, retry_at).await
    }

    async fn requeue_callback(
        &self,
        account_id: Uuid,
        campaign_id: Uuid,
        lead_id: Uuid,
        phone_number: String,
        at: DateTime<Utc>,
    ) -> Result<QueueEntry, QueueError> {
        (**self)
            .requeue_callback(account_id, campaign_id, lead_id, phone_number, at)
            .await
    }

    async fn due_count(&self, account_id: Uuid) -> Result<u64, QueueError> {
        (**self).due_count(account_id).await
    }
}
