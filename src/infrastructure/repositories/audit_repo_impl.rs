// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::audit_repository::{
    AuditRepository, DispositionAuditRow, DispositionErrorRow,
};
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::infrastructure::database::entities::disposition_audit as audit_entity;
use crate::infrastructure::database::entities::disposition_error as error_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 审计仓库实现
///
/// 审计行只插入，不提供更新接口
#[derive(Clone)]
pub struct AuditRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl AuditRepositoryImpl {
    /// 创建新的审计仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn record(&self, row: &DispositionAuditRow) -> Result<(), RepositoryError> {
        let model = audit_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(row.account_id),
            lead_id: Set(row.lead_id),
            call_id: Set(row.call_id),
            disposition_name: Set(row.disposition_name.clone()),
            set_by: Set(row.set_by.to_string()),
            confidence: Set(row.confidence),
            lead_status_before: Set(row.lead_status_before.clone()),
            lead_status_after: Set(row.lead_status_after.clone()),
            stage_before: Set(row.stage_before.clone()),
            stage_after: Set(row.stage_after.clone()),
            time_to_disposition_ms: Set(row.time_to_disposition_ms),
            actions: Set(row.actions.clone()),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn record_error(&self, row: &DispositionErrorRow) -> Result<(), RepositoryError> {
        let model = error_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(row.account_id),
            lead_id: Set(row.lead_id),
            action: Set(row.action.clone()),
            message: Set(row.message.clone()),
            payload: Set(row.payload.clone()),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn count_errors(&self, account_id: Uuid) -> Result<u64, RepositoryError> {
        let count = error_entity::Entity::find()
            .filter(error_entity::Column::AccountId.eq(account_id))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }
}
