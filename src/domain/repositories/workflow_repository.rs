// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::workflow::{WorkflowProgress, WorkflowStatus};
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 工作流进度仓库特质
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// 创建进度
    async fn create(&self, progress: &WorkflowProgress)
        -> Result<WorkflowProgress, RepositoryError>;
    /// 更新进度
    async fn update(&self, progress: &WorkflowProgress)
        -> Result<WorkflowProgress, RepositoryError>;
    /// 查找线索的所有Active进度
    async fn find_active_by_lead(
        &self,
        lead_id: Uuid,
    ) -> Result<Vec<WorkflowProgress>, RepositoryError>;
    /// 把线索的全部Active进度改为目标状态，返回影响行数
    async fn transition_active_for_lead(
        &self,
        lead_id: Uuid,
        to: WorkflowStatus,
    ) -> Result<u64, RepositoryError>;
    /// 查找下一步到期的Active进度
    async fn find_due_steps(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkflowProgress>, RepositoryError>;
}
