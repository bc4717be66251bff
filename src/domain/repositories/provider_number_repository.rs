// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider_number::ProviderNumber;
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 提供商号码仓库特质
#[async_trait]
pub trait ProviderNumberRepository: Send + Sync {
    /// 导入号码
    async fn create(&self, number: &ProviderNumber) -> Result<ProviderNumber, RepositoryError>;
    /// 查找账户全部可用号码
    async fn find_active(&self, account_id: Uuid)
        -> Result<Vec<ProviderNumber>, RepositoryError>;
    /// 更新号码最近使用时间（路由LRU平局打破）
    async fn touch_last_used(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;
}
