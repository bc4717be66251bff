// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::pipeline::{PipelineBoard, PipelinePosition};
use crate::domain::repositories::pipeline_repository::PipelineRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::pipeline_board as board_entity;
use crate::infrastructure::database::entities::pipeline_position as position_entity;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 管线仓库实现
///
/// 位置以(account, lead)为键整行覆盖，移动即upsert
#[derive(Clone)]
pub struct PipelineRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl PipelineRepositoryImpl {
    /// 创建新的管线仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<board_entity::Model> for PipelineBoard {
    fn from(model: board_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            name: model.name,
            normalized_name: model.normalized_name,
            created_at: model.created_at,
        }
    }
}

impl From<position_entity::Model> for PipelinePosition {
    fn from(model: position_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            lead_id: model.lead_id,
            board_id: model.board_id,
            stage: model.stage,
            moved_by_user: model.moved_by_user,
            moved_at: model.moved_at,
        }
    }
}

#[async_trait]
impl PipelineRepository for PipelineRepositoryImpl {
    async fn find_board_by_normalized_name(
        &self,
        account_id: Uuid,
        normalized_name: &str,
    ) -> Result<Option<PipelineBoard>, RepositoryError> {
        let model = board_entity::Entity::find()
            .filter(board_entity::Column::AccountId.eq(account_id))
            .filter(board_entity::Column::NormalizedName.eq(normalized_name))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn create_board(&self, board: &PipelineBoard) -> Result<PipelineBoard, RepositoryError> {
        let model = board_entity::ActiveModel {
            id: Set(board.id),
            account_id: Set(board.account_id),
            name: Set(board.name.clone()),
            normalized_name: Set(board.normalized_name.clone()),
            created_at: Set(board.created_at),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(board.clone())
    }

    async fn find_position(
        &self,
        account_id: Uuid,
        lead_id: Uuid,
    ) -> Result<Option<PipelinePosition>, RepositoryError> {
        let model = position_entity::Entity::find()
            .filter(position_entity::Column::AccountId.eq(account_id))
            .filter(position_entity::Column::LeadId.eq(lead_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn upsert_position(
        &self,
        position: &PipelinePosition,
    ) -> Result<PipelinePosition, RepositoryError> {
        // 每(account, lead)一行，存在则整行覆盖
        let existing = position_entity::Entity::find()
            .filter(position_entity::Column::AccountId.eq(position.account_id))
            .filter(position_entity::Column::LeadId.eq(position.lead_id))
            .one(self.db.as_ref())
            .await?;

        match existing {
            Some(current) => {
                let mut model: position_entity::ActiveModel = current.into();
                model.board_id = Set(position.board_id);
                model.stage = Set(position.stage.clone());
                model.moved_by_user = Set(position.moved_by_user);
                model.moved_at = Set(position.moved_at);

                let updated = model.update(self.db.as_ref()).await?;
                Ok(updated.into())
            }
            None => {
                let model = position_entity::ActiveModel {
                    id: Set(position.id),
                    account_id: Set(position.account_id),
                    lead_id: Set(position.lead_id),
                    board_id: Set(position.board_id),
                    stage: Set(position.stage.clone()),
                    moved_by_user: Set(position.moved_by_user),
                    moved_at: Set(position.moved_at),
                };

                model.insert(self.db.as_ref()).await?;
                Ok(position.clone())
            }
        }
    }
}
