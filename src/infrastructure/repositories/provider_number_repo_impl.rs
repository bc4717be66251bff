// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider_number::{Capability, ProviderNumber};
use crate::domain::repositories::provider_number_repository::ProviderNumberRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::provider_number as number_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// 提供商号码仓库实现
///
/// 能力集在数据库中存为字符串数组JSON
#[derive(Clone)]
pub struct ProviderNumberRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ProviderNumberRepositoryImpl {
    /// 创建新的提供商号码仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn capabilities_from_json(value: &serde_json::Value) -> HashSet<Capability> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

fn capabilities_to_json(capabilities: &HashSet<Capability>) -> serde_json::Value {
    let mut names: Vec<String> = capabilities.iter().map(|c| c.to_string()).collect();
    names.sort();
    serde_json::json!(names)
}

impl From<number_entity::Model> for ProviderNumber {
    fn from(model: number_entity::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            provider: model.provider,
            number: model.number,
            capabilities: capabilities_from_json(&model.capabilities),
            verified: model.verified,
            provider_priority: model.provider_priority,
            last_used_at: model.last_used_at,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProviderNumber> for number_entity::ActiveModel {
    fn from(number: ProviderNumber) -> Self {
        Self {
            id: Set(number.id),
            account_id: Set(number.account_id),
            provider: Set(number.provider.clone()),
            number: Set(number.number.clone()),
            capabilities: Set(capabilities_to_json(&number.capabilities)),
            verified: Set(number.verified),
            provider_priority: Set(number.provider_priority),
            last_used_at: Set(number.last_used_at),
            active: Set(number.active),
            created_at: Set(number.created_at),
            updated_at: Set(number.updated_at),
        }
    }
}

#[async_trait]
impl ProviderNumberRepository for ProviderNumberRepositoryImpl {
    async fn create(&self, number: &ProviderNumber) -> Result<ProviderNumber, RepositoryError> {
        let model: number_entity::ActiveModel = number.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(number.clone())
    }

    async fn find_active(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<ProviderNumber>, RepositoryError> {
        let models = number_entity::Entity::find()
            .filter(number_entity::Column::AccountId.eq(account_id))
            .filter(number_entity::Column::Active.eq(true))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(ProviderNumber::from).collect())
    }

    async fn touch_last_used(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        number_entity::Entity::update_many()
            .col_expr(number_entity::Column::LastUsedAt, Expr::value(Some(at)))
            .col_expr(
                number_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(number_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }
}
