// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lead::Lead;
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 线索仓库特质
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// 创建线索
    async fn create(&self, lead: &Lead) -> Result<Lead, RepositoryError>;
    /// 根据ID查找线索
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, RepositoryError>;
    /// 更新线索
    async fn update(&self, lead: &Lead) -> Result<Lead, RepositoryError>;
    /// 查找回拨到期的线索
    async fn find_due_callbacks(&self, now: DateTime<Utc>) -> Result<Vec<Lead>, RepositoryError>;
}
