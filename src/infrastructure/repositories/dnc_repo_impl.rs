// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::dnc_repository::DncRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::dnc_entry as dnc_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 禁止联络登记仓库实现
///
/// (account_id, phone_number)上有唯一索引，幂等插入依赖
/// 先查后插加唯一约束兜底
#[derive(Clone)]
pub struct DncRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl DncRepositoryImpl {
    /// 创建新的禁止联络仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DncRepository for DncRepositoryImpl {
    async fn insert_if_absent(
        &self,
        account_id: Uuid,
        phone_number: &str,
        source: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        if self.contains(account_id, phone_number).await? {
            return Ok(false);
        }

        let model = dnc_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            phone_number: Set(phone_number.to_string()),
            source: Set(source.map(|s| s.to_string())),
            created_at: Set(Utc::now().into()),
        };

        // 并发登记同一号码时唯一索引会拒绝后写入者，同样视为已存在
        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(err) => {
                if self.contains(account_id, phone_number).await? {
                    Ok(false)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    async fn contains(
        &self,
        account_id: Uuid,
        phone_number: &str,
    ) -> Result<bool, RepositoryError> {
        let count = dnc_entity::Entity::find()
            .filter(dnc_entity::Column::AccountId.eq(account_id))
            .filter(dnc_entity::Column::PhoneNumber.eq(phone_number))
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }
}
