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

use crate::domain::models::call_attempt::{CallAttemptRecord, CallStatus};
use crate::domain::repositories::call_attempt_repository::{CallAttemptRepository, OutcomeRates};
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::call_attempt as attempt_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 在途状态字符串集合，并发计数使用
fn in_flight_statuses() -> Vec<String> {
    vec![
        CallStatus::Initiated.to_string(),
        CallStatus::Ringing.to_string(),
        CallStatus::InProgress.to_string(),
    ]
}

/// 呼叫尝试记录仓库实现
///
/// 基于SeaORM实现的呼叫尝试数据访问层。在途并发数从记录状态
/// 派生统计，不维护独立计数器
#[derive(Clone)]
pub struct CallAttemptRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl CallAttemptRepositoryImpl {
    /// 创建新的呼叫尝试仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的呼叫尝试仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<attempt_entity::Model> for CallAttemptRecord {
    fn from(model: attempt_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            queue_entry_id: model.queue_entry_id,
            lead_id: model.lead_id,
            provider: model.provider,
            from_number: model.from_number,
            to_number: model.to_number,
            channel: model.channel.parse().unwrap_or_default(),
            status: model.status.parse().unwrap_or_default(),
            provider_call_id: model.provider_call_id,
            outcome: model.outcome,
            started_at: model.started_at,
            ended_at: model.ended_at,
            metadata: model.metadata,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CallAttemptRecord> for attempt_entity::ActiveModel {
    fn from(record: CallAttemptRecord) -> Self {
        Self {
            id: Set(record.id),
            account_id: Set(record.account_id),
            queue_entry_id: Set(record.queue_entry_id),
            lead_id: Set(record.lead_id),
            provider: Set(record.provider.clone()),
            from_number: Set(record.from_number.clone()),
            to_number: Set(record.to_number.clone()),
            channel: Set(record.channel.to_string()),
            status: Set(record.status.to_string()),
            provider_call_id: Set(record.provider_call_id.clone()),
            outcome: Set(record.outcome.clone()),
            started_at: Set(record.started_at),
            ended_at: Set(record.ended_at),
            metadata: Set(record.metadata.clone()),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }
}

#[async_trait]
impl CallAttemptRepository for CallAttemptRepositoryImpl {
    async fn create(
        &self,
        record: &CallAttemptRecord,
    ) -> Result<CallAttemptRecord, RepositoryError> {
        let model: attempt_entity::ActiveModel = record.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CallAttemptRecord>, RepositoryError> {
        let model = attempt_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_provider_call_id(
        &self,
        provider_call_id: &str,
    ) -> Result<Option<CallAttemptRecord>, RepositoryError> {
        let model = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::ProviderCallId.eq(provider_call_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(
        &self,
        record: &CallAttemptRecord,
    ) -> Result<CallAttemptRecord, RepositoryError> {
        let mut model: attempt_entity::ActiveModel = record.clone().into();

        model.updated_at = Set(Utc::now().into());

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: CallStatus,
        outcome: Option<String>,
    ) -> Result<(), RepositoryError> {
        let record = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = record.clone();
        updated.status = status;
        if outcome.is_some() {
            updated.outcome = outcome;
        }
        if !status.is_in_flight() && updated.ended_at.is_none() {
            updated.ended_at = Some(Utc::now().into());
        }
        self.update(&updated).await?;
        Ok(())
    }

    async fn count_in_flight(&self, account_id: Uuid) -> Result<u64, RepositoryError> {
        let count = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::AccountId.eq(account_id))
            .filter(attempt_entity::Column::Status.is_in(in_flight_statuses()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_in_flight_by_provider(&self, provider: &str) -> Result<u64, RepositoryError> {
        let count = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::Provider.eq(provider))
            .filter(attempt_entity::Column::Status.is_in(in_flight_statuses()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }

    async fn force_close_stale(
        &self,
        timeout: chrono::Duration,
        note: &str,
    ) -> Result<u64, RepositoryError> {
        let threshold: DateTime<FixedOffset> = (Utc::now() - timeout).into();
        let now: DateTime<FixedOffset> = Utc::now().into();

        let stale = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::Status.is_in(in_flight_statuses()))
            .filter(attempt_entity::Column::StartedAt.lte(threshold))
            .all(self.db.as_ref())
            .await?;

        let mut closed = 0;
        for row in stale {
            // 合并备注而非覆盖，routing_reason等既有元数据要留档
            let mut metadata = row.metadata.clone();
            match metadata.as_object_mut() {
                Some(map) => {
                    map.insert("force_closed".to_string(), serde_json::json!(note));
                }
                None => metadata = serde_json::json!({ "force_closed": note }),
            }

            let mut active: attempt_entity::ActiveModel = row.into();
            active.status = Set(CallStatus::NoAnswer.to_string());
            active.ended_at = Set(Some(now));
            active.updated_at = Set(now);
            active.metadata = Set(metadata);
            active.update(self.db.as_ref()).await?;
            closed += 1;
        }

        Ok(closed)
    }

    async fn recent_outcome_rates(
        &self,
        account_id: Uuid,
        window: chrono::Duration,
    ) -> Result<OutcomeRates, RepositoryError> {
        let threshold: DateTime<FixedOffset> = (Utc::now() - window).into();

        let total = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::AccountId.eq(account_id))
            .filter(attempt_entity::Column::Status.is_not_in(in_flight_statuses()))
            .filter(attempt_entity::Column::CreatedAt.gte(threshold))
            .count(self.db.as_ref())
            .await?;

        let failed = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::AccountId.eq(account_id))
            .filter(attempt_entity::Column::Status.eq(CallStatus::Failed.to_string()))
            .filter(attempt_entity::Column::CreatedAt.gte(threshold))
            .count(self.db.as_ref())
            .await?;

        let answered = attempt_entity::Entity::find()
            .filter(attempt_entity::Column::AccountId.eq(account_id))
            .filter(attempt_entity::Column::Status.eq(CallStatus::Completed.to_string()))
            .filter(attempt_entity::Column::CreatedAt.gte(threshold))
            .count(self.db.as_ref())
            .await?;

        Ok(OutcomeRates {
            total,
            failed,
            answered,
        })
    }
}
