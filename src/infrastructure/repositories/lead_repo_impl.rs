// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lead::Lead;
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::lead as lead_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 线索仓库实现
#[derive(Clone)]
pub struct LeadRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl LeadRepositoryImpl {
    /// 创建新的线索仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<lead_entity::Model> for Lead {
    fn from(model: lead_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            phone: model.phone,
            status: model.status,
            do_not_contact: model.do_not_contact,
            next_callback_at: model.next_callback_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Lead> for lead_entity::ActiveModel {
    fn from(lead: Lead) -> Self {
        Self {
            id: Set(lead.id),
            account_id: Set(lead.account_id),
            phone: Set(lead.phone.clone()),
            status: Set(lead.status.clone()),
            do_not_contact: Set(lead.do_not_contact),
            next_callback_at: Set(lead.next_callback_at),
            created_at: Set(lead.created_at),
            updated_at: Set(lead.updated_at),
        }
    }
}

#[async_trait]
impl LeadRepository for LeadRepositoryImpl {
    async fn create(&self, lead: &Lead) -> Result<Lead, RepositoryError> {
        let model: lead_entity::ActiveModel = lead.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(lead.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, RepositoryError> {
        let model = lead_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, lead: &Lead) -> Result<Lead, RepositoryError> {
        let mut model: lead_entity::ActiveModel = lead.clone().into();

        model.updated_at = Set(Utc::now().into());

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn find_due_callbacks(&self, now: DateTime<Utc>) -> Result<Vec<Lead>, RepositoryError> {
        let threshold: DateTime<FixedOffset> = now.into();

        let models = lead_entity::Entity::find()
            .filter(lead_entity::Column::NextCallbackAt.lte(threshold))
            .filter(lead_entity::Column::DoNotContact.eq(false))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Lead::from).collect())
    }
}
