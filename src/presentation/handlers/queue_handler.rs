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

use crate::domain::models::queue_entry::QueueEntry;
use crate::presentation::errors::AppError;
use crate::queue::dialing_queue::DialingQueue;
use crate::utils::phone;
use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 入队请求
#[derive(Debug, Deserialize)]
pub struct EnqueueRequestDto {
    /// 所属账户ID
    pub account_id: Uuid,
    /// 所属活动ID
    pub campaign_id: Uuid,
    /// 目标线索ID
    pub lead_id: Uuid,
    /// 目标电话号码（入队前归一化为E.164）
    pub phone_number: String,
    /// 优先级，缺省0
    pub priority: Option<i32>,
    /// 不早于时间
    pub scheduled_at: Option<DateTime<Utc>>,
    /// 最大尝试次数
    pub max_attempts: Option<i32>,
}

/// 入队一次联络尝试
///
/// 同一(campaign_id, lead_id)已有非终态条目时返回409
pub async fn enqueue(
    Extension(queue): Extension<Arc<dyn DialingQueue>>,
    Json(request): Json<EnqueueRequestDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut entry = QueueEntry::new(
        request.account_id,
        request.campaign_id,
        request.lead_id,
        phone::normalize(&request.phone_number),
        request.priority.unwrap_or(0),
        request.scheduled_at.map(Into::into),
    );
    if let Some(max_attempts) = request.max_attempts {
        entry.max_attempts = max_attempts;
    }

    let entry = queue.enqueue(entry).await?;

    info!(
        entry_id = %entry.id,
        account_id = %entry.account_id,
        campaign_id = %entry.campaign_id,
        "Queue entry accepted"
    );

    Ok(Json(json!({
        "id": entry.id,
        "status": entry.status,
        "priority": entry.priority,
        "scheduled_at": entry.scheduled_at,
    })))
}
