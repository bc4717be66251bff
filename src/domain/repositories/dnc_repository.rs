// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 禁止联络登记仓库特质
///
/// 按账户维度登记号码，插入是幂等的：重复登记不产生重复行
#[async_trait]
pub trait DncRepository: Send + Sync {
    /// 登记号码，已存在时什么也不做，返回是否新插入
    async fn insert_if_absent(
        &self,
        account_id: Uuid,
        phone_number: &str,
        source: Option<&str>,
    ) -> Result<bool, RepositoryError>;
    /// 判断号码是否已登记
    async fn contains(&self, account_id: Uuid, phone_number: &str)
        -> Result<bool, RepositoryError>;
}
