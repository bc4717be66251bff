// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::workflow::{WorkflowProgress, WorkflowStatus};
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::domain::repositories::workflow_repository::WorkflowRepository;
use crate::infrastructure::database::entities::workflow_progress as progress_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 工作流进度仓库实现
#[derive(Clone)]
pub struct WorkflowRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl WorkflowRepositoryImpl {
    /// 创建新的工作流进度仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<progress_entity::Model> for WorkflowProgress {
    fn from(model: progress_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            workflow_id: model.workflow_id,
            lead_id: model.lead_id,
            campaign_id: model.campaign_id,
            status: model.status.parse().unwrap_or_default(),
            next_step_at: model.next_step_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<WorkflowProgress> for progress_entity::ActiveModel {
    fn from(progress: WorkflowProgress) -> Self {
        Self {
            id: Set(progress.id),
            account_id: Set(progress.account_id),
            workflow_id: Set(progress.workflow_id),
            lead_id: Set(progress.lead_id),
            campaign_id: Set(progress.campaign_id),
            status: Set(progress.status.to_string()),
            next_step_at: Set(progress.next_step_at),
            created_at: Set(progress.created_at),
            updated_at: Set(progress.updated_at),
        }
    }
}

#[async_trait]
impl WorkflowRepository for WorkflowRepositoryImpl {
    async fn create(
        &self,
        progress: &WorkflowProgress,
    ) -> Result<WorkflowProgress, RepositoryError> {
        let model: progress_entity::ActiveModel = progress.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(progress.clone())
    }

    async fn update(
        &self,
        progress: &WorkflowProgress,
    ) -> Result<WorkflowProgress, RepositoryError> {
        let mut model: progress_entity::ActiveModel = progress.clone().into();

        model.updated_at = Set(Utc::now().into());

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn find_active_by_lead(
        &self,
        lead_id: Uuid,
    ) -> Result<Vec<WorkflowProgress>, RepositoryError> {
        let models = progress_entity::Entity::find()
            .filter(progress_entity::Column::LeadId.eq(lead_id))
            .filter(progress_entity::Column::Status.eq(WorkflowStatus::Active.to_string()))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(WorkflowProgress::from).collect())
    }

    async fn transition_active_for_lead(
        &self,
        lead_id: Uuid,
        to: WorkflowStatus,
    ) -> Result<u64, RepositoryError> {
        let result = progress_entity::Entity::update_many()
            .col_expr(progress_entity::Column::Status, Expr::value(to.to_string()))
            .col_expr(
                progress_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(progress_entity::Column::LeadId.eq(lead_id))
            .filter(progress_entity::Column::Status.eq(WorkflowStatus::Active.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn find_due_steps(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkflowProgress>, RepositoryError> {
        let threshold: DateTime<FixedOffset> = now.into();

        let models = progress_entity::Entity::find()
            .filter(progress_entity::Column::Status.eq(WorkflowStatus::Active.to_string()))
            .filter(progress_entity::Column::NextStepAt.lte(threshold))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(WorkflowProgress::from).collect())
    }
}
