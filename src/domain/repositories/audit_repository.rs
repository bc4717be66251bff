// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::disposition::SetBy;
use crate::domain::repositories::queue_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 处置审计行
///
/// 每个处置事件写一行，写入后不再更新
#[derive(Debug, Clone)]
pub struct DispositionAuditRow {
    pub account_id: Uuid,
    pub lead_id: Uuid,
    pub call_id: Option<Uuid>,
    pub disposition_name: String,
    pub set_by: SetBy,
    pub confidence: Option<f64>,
    pub lead_status_before: String,
    pub lead_status_after: String,
    pub stage_before: Option<String>,
    pub stage_after: Option<String>,
    /// 呼叫结束到处置落定的耗时
    pub time_to_disposition_ms: Option<i64>,
    /// 本次事件中各策略动作的执行结果
    pub actions: serde_json::Value,
}

/// 处置错误审计行
#[derive(Debug, Clone)]
pub struct DispositionErrorRow {
    pub account_id: Uuid,
    pub lead_id: Uuid,
    /// 失败的策略动作名
    pub action: String,
    pub message: String,
    pub payload: serde_json::Value,
}

/// 审计仓库特质
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// 写入处置审计行（不可变）
    async fn record(&self, row: &DispositionAuditRow) -> Result<(), RepositoryError>;
    /// 写入处置错误审计行
    async fn record_error(&self, row: &DispositionErrorRow) -> Result<(), RepositoryError>;
    /// 统计账户未处理的处置错误数（告警用）
    async fn count_errors(&self, account_id: Uuid) -> Result<u64, RepositoryError>;
}
