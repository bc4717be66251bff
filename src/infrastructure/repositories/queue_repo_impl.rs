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

use crate::domain::models::queue_entry::{QueueEntry, QueueStatus};
use crate::domain::repositories::queue_repository::{
    QueueRepository, RepositoryError, StuckSweepResult,
};
use crate::infrastructure::database::entities::queue_entry as queue_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 拨号队列仓库实现
///
/// 基于SeaORM实现的队列条目数据访问层。认领通过逐行条件更新
/// 完成（以status=pending为条件），不依赖数据库特定的行锁语义
#[derive(Clone)]
pub struct QueueRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl QueueRepositoryImpl {
    /// 创建新的队列仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的队列仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<queue_entity::Model> for QueueEntry {
    fn from(model: queue_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            campaign_id: model.campaign_id,
            lead_id: model.lead_id,
            phone_number: model.phone_number,
            status: model.status.parse().unwrap_or_default(),
            priority: model.priority,
            attempts: model.attempts,
            max_attempts: model.max_attempts,
            scheduled_at: model.scheduled_at,
            claimed_at: model.claimed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<QueueEntry> for queue_entity::ActiveModel {
    fn from(entry: QueueEntry) -> Self {
        Self {
            id: Set(entry.id),
            account_id: Set(entry.account_id),
            campaign_id: Set(entry.campaign_id),
            lead_id: Set(entry.lead_id),
            phone_number: Set(entry.phone_number.clone()),
            status: Set(entry.status.to_string()),
            priority: Set(entry.priority),
            attempts: Set(entry.attempts),
            max_attempts: Set(entry.max_attempts),
            scheduled_at: Set(entry.scheduled_at),
            claimed_at: Set(entry.claimed_at),
            created_at: Set(entry.created_at),
            updated_at: Set(entry.updated_at),
        }
    }
}

#[async_trait]
impl QueueRepository for QueueRepositoryImpl {
    async fn create(&self, entry: &QueueEntry) -> Result<QueueEntry, RepositoryError> {
        let model: queue_entity::ActiveModel = entry.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(entry.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QueueEntry>, RepositoryError> {
        let model = queue_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, entry: &QueueEntry) -> Result<QueueEntry, RepositoryError> {
        let mut model: queue_entity::ActiveModel = entry.clone().into();

        model.updated_at = Set(Utc::now().into());

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn find_non_terminal(
        &self,
        campaign_id: Uuid,
        lead_id: Uuid,
    ) -> Result<Option<QueueEntry>, RepositoryError> {
        let model = queue_entity::Entity::find()
            .filter(queue_entity::Column::CampaignId.eq(campaign_id))
            .filter(queue_entity::Column::LeadId.eq(lead_id))
            .filter(queue_entity::Column::Status.is_in(vec![
                QueueStatus::Pending.to_string(),
                QueueStatus::Claimed.to_string(),
            ]))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn claim_due(
        &self,
        account_id: Uuid,
        limit: u64,
    ) -> Result<Vec<QueueEntry>, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let candidates = queue_entity::Entity::find()
            .filter(queue_entity::Column::AccountId.eq(account_id))
            .filter(queue_entity::Column::Status.eq(QueueStatus::Pending.to_string()))
            .filter(
                Condition::any()
                    .add(queue_entity::Column::ScheduledAt.is_null())
                    .add(queue_entity::Column::ScheduledAt.lte(now)),
            )
            .order_by_desc(queue_entity::Column::Priority)
            .order_by_asc(queue_entity::Column::ScheduledAt)
            .order_by_asc(queue_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        let mut claimed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            // 以当前状态为条件的逐行更新，并发认领者最多一个成功
            let result = queue_entity::Entity::update_many()
                .col_expr(
                    queue_entity::Column::Status,
                    Expr::value(QueueStatus::Claimed.to_string()),
                )
                .col_expr(queue_entity::Column::ClaimedAt, Expr::value(Some(now)))
                .col_expr(queue_entity::Column::UpdatedAt, Expr::value(now))
                .col_expr(
                    queue_entity::Column::Attempts,
                    Expr::col(queue_entity::Column::Attempts).add(1),
                )
                .filter(queue_entity::Column::Id.eq(candidate.id))
                .filter(queue_entity::Column::Status.eq(QueueStatus::Pending.to_string()))
                .exec(self.db.as_ref())
                .await?;

            if result.rows_affected == 1 {
                let mut entry: QueueEntry = candidate.into();
                entry.status = QueueStatus::Claimed;
                entry.claimed_at = Some(now);
                entry.attempts += 1;
                entry.updated_at = now;
                claimed.push(entry);
            }
        }

        Ok(claimed)
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let entry = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = entry.clone();
        updated.status = QueueStatus::Completed;
        updated.claimed_at = None;
        self.update(&updated).await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let entry = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = entry.clone();
        updated.status = QueueStatus::Failed;
        updated.claimed_at = None;
        self.update(&updated).await?;
        Ok(())
    }

    async fn release_to_pending(
        &self,
        id: Uuid,
        scheduled_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        let entry = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = entry.clone();
        updated.status = QueueStatus::Pending;
        updated.claimed_at = None;
        updated.scheduled_at = Some(scheduled_at);
        self.update(&updated).await?;
        Ok(())
    }

    async fn remove_for_lead(
        &self,
        lead_id: Uuid,
        below_priority: i32,
    ) -> Result<u64, RepositoryError> {
        let result = queue_entity::Entity::update_many()
            .col_expr(
                queue_entity::Column::Status,
                Expr::value(QueueStatus::Removed.to_string()),
            )
            .col_expr(
                queue_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(queue_entity::Column::LeadId.eq(lead_id))
            .filter(queue_entity::Column::Priority.lt(below_priority))
            .filter(queue_entity::Column::Status.is_in(vec![
                QueueStatus::Pending.to_string(),
                QueueStatus::Claimed.to_string(),
            ]))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn sweep_stuck(
        &self,
        timeout: chrono::Duration,
    ) -> Result<StuckSweepResult, RepositoryError> {
        let threshold: DateTime<FixedOffset> = (Utc::now() - timeout).into();
        let now: DateTime<FixedOffset> = Utc::now().into();

        // 先降级：已达最大尝试次数的滞留条目直接终态失败
        let demoted = queue_entity::Entity::update_many()
            .col_expr(
                queue_entity::Column::Status,
                Expr::value(QueueStatus::Failed.to_string()),
            )
            .col_expr(
                queue_entity::Column::ClaimedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(queue_entity::Column::UpdatedAt, Expr::value(now))
            .filter(queue_entity::Column::Status.eq(QueueStatus::Claimed.to_string()))
            .filter(queue_entity::Column::ClaimedAt.lte(threshold))
            .filter(
                Expr::col(queue_entity::Column::Attempts)
                    .gte(Expr::col(queue_entity::Column::MaxAttempts)),
            )
            .exec(self.db.as_ref())
            .await?;

        // 其余滞留条目重置回pending，等待下一轮认领
        let reset = queue_entity::Entity::update_many()
            .col_expr(
                queue_entity::Column::Status,
                Expr::value(QueueStatus::Pending.to_string()),
            )
            .col_expr(
                queue_entity::Column::ClaimedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(queue_entity::Column::UpdatedAt, Expr::value(now))
            .filter(queue_entity::Column::Status.eq(QueueStatus::Claimed.to_string()))
            .filter(queue_entity::Column::ClaimedAt.lte(threshold))
            .exec(self.db.as_ref())
            .await?;

        Ok(StuckSweepResult {
            reset: reset.rows_affected,
            demoted: demoted.rows_affected,
        })
    }

    async fn count_due(&self, account_id: Uuid) -> Result<u64, RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();

        let count = queue_entity::Entity::find()
            .filter(queue_entity::Column::AccountId.eq(account_id))
            .filter(queue_entity::Column::Status.eq(QueueStatus::Pending.to_string()))
            .filter(
                Condition::any()
                    .add(queue_entity::Column::ScheduledAt.is_null())
                    .add(queue_entity::Column::ScheduledAt.lte(now)),
            )
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }

    async fn accounts_with_due_entries(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, RepositoryError> {
        let threshold: DateTime<FixedOffset> = now.into();

        let accounts: Vec<Uuid> = queue_entity::Entity::find()
            .select_only()
            .column(queue_entity::Column::AccountId)
            .filter(queue_entity::Column::Status.eq(QueueStatus::Pending.to_string()))
            .filter(
                Condition::any()
                    .add(queue_entity::Column::ScheduledAt.is_null())
                    .add(queue_entity::Column::ScheduledAt.lte(threshold)),
            )
            .distinct()
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(accounts)
    }
}
