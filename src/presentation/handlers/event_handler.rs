// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::dispositions::processor::DispositionProcessor;
use crate::domain::models::call_attempt::CallStatus;
use crate::domain::models::disposition::{DispositionEvent, SetBy};
use crate::domain::repositories::call_attempt_repository::CallAttemptRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::presentation::errors::AppError;
use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// 归一化提供商事件
///
/// 各提供商的webhook在边缘被归一化为统一结构后送到这里
#[derive(Debug, Deserialize)]
pub struct ProviderEventDto {
    /// 提供商侧呼叫ID
    pub provider_call_id: String,
    /// 呼叫状态（initiated/ringing/in_progress/completed/failed/no_answer）
    pub status: String,
    /// 结局代码
    pub outcome: Option<String>,
    /// 事件携带的处置（呼叫结束分类完成时）
    pub disposition: Option<DispositionDto>,
}

/// 事件内嵌处置
#[derive(Debug, Deserialize)]
pub struct DispositionDto {
    /// 处置名称
    pub name: String,
    /// 来源（ai/manual/automation），缺省ai
    pub set_by: Option<String>,
    /// 分类器置信度
    pub confidence: Option<f64>,
}

/// 接收归一化提供商事件
///
/// 按provider_call_id关联呼叫记录并更新状态；
/// 事件携带处置时触发处置处理器
pub async fn ingest_event(
    Extension(attempts): Extension<Arc<dyn CallAttemptRepository>>,
    Extension(processor): Extension<Arc<DispositionProcessor>>,
    Json(event): Json<ProviderEventDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = attempts
        .find_by_provider_call_id(&event.provider_call_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let status: CallStatus = event
        .status
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid call status '{}'", event.status))?;

    attempts
        .update_status(record.id, status, event.outcome.clone())
        .await?;

    info!(
        attempt_id = %record.id,
        provider_call_id = %event.provider_call_id,
        status = %status,
        "Provider event applied"
    );

    let mut disposition_applied = false;
    if let Some(dto) = event.disposition {
        let set_by = dto
            .set_by
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(SetBy::Ai);
        let disposition_event = DispositionEvent {
            lead_id: record.lead_id,
            account_id: record.account_id,
            disposition_name: dto.name,
            disposition_id: None,
            call_id: Some(record.id),
            set_by,
            confidence: dto.confidence,
        };
        processor.process(&disposition_event).await?;
        disposition_applied = true;
    }

    Ok(Json(json!({
        "status": "ok",
        "attempt_id": record.id,
        "disposition_applied": disposition_applied,
    })))
}
