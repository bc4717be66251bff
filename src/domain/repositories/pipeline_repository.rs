// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::pipeline::{PipelineBoard, PipelinePosition};
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 管线仓库特质
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// 按归一化名称查找看板（大小写不敏感匹配键）
    async fn find_board_by_normalized_name(
        &self,
        account_id: Uuid,
        normalized_name: &str,
    ) -> Result<Option<PipelineBoard>, RepositoryError>;
    /// 创建看板
    async fn create_board(&self, board: &PipelineBoard)
        -> Result<PipelineBoard, RepositoryError>;
    /// 查找线索当前位置
    async fn find_position(
        &self,
        account_id: Uuid,
        lead_id: Uuid,
    ) -> Result<Option<PipelinePosition>, RepositoryError>;
    /// 以(account, lead)为键覆盖写入位置
    async fn upsert_position(
        &self,
        position: &PipelinePosition,
    ) -> Result<PipelinePosition, RepositoryError>;
}
