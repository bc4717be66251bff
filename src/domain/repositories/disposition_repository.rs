// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::disposition::Disposition;
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 处置条目仓库特质
///
/// 处置是静态参考数据，按账户配置，可覆盖内置策略表的看板解析
#[async_trait]
pub trait DispositionRepository: Send + Sync {
    /// 创建处置条目
    async fn create(&self, disposition: &Disposition) -> Result<Disposition, RepositoryError>;
    /// 根据ID查找处置条目
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Disposition>, RepositoryError>;
    /// 按账户与归一化名称查找处置条目
    async fn find_by_name(
        &self,
        account_id: Uuid,
        name: &str,
    ) -> Result<Option<Disposition>, RepositoryError>;
}
