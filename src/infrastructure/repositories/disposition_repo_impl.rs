// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::disposition::Disposition;
use crate::domain::repositories::disposition_repository::DispositionRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::disposition as disposition_entity;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 处置条目仓库实现
#[derive(Clone)]
pub struct DispositionRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl DispositionRepositoryImpl {
    /// 创建新的处置仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<disposition_entity::Model> for Disposition {
    fn from(model: disposition_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            name: model.name,
            pipeline_stage: model.pipeline_stage,
            created_at: model.created_at,
        }
    }
}

impl From<Disposition> for disposition_entity::ActiveModel {
    fn from(disposition: Disposition) -> Self {
        Self {
            id: Set(disposition.id),
            account_id: Set(disposition.account_id),
            name: Set(disposition.name.clone()),
            pipeline_stage: Set(disposition.pipeline_stage.clone()),
            created_at: Set(disposition.created_at),
        }
    }
}

#[async_trait]
impl DispositionRepository for DispositionRepositoryImpl {
    async fn create(&self, disposition: &Disposition) -> Result<Disposition, RepositoryError> {
        let model: disposition_entity::ActiveModel = disposition.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(disposition.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Disposition>, RepositoryError> {
        let model = disposition_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_name(
        &self,
        account_id: Uuid,
        name: &str,
    ) -> Result<Option<Disposition>, RepositoryError> {
        let model = disposition_entity::Entity::find()
            .filter(disposition_entity::Column::AccountId.eq(account_id))
            .filter(disposition_entity::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }
}
