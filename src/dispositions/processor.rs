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

use crate::dispositions::policy;
use crate::domain::models::disposition::DispositionEvent;
use crate::domain::models::pipeline::{PipelineBoard, PipelinePosition};
use crate::domain::models::queue_entry::CALLBACK_PRIORITY_BAND;
use crate::domain::models::workflow::WorkflowStatus;
use crate::domain::repositories::audit_repository::{
    AuditRepository, DispositionAuditRow, DispositionErrorRow,
};
use crate::domain::repositories::call_attempt_repository::CallAttemptRepository;
use crate::domain::repositories::disposition_repository::DispositionRepository;
use crate::domain::repositories::dnc_repository::DncRepository;
use crate::domain::repositories::lead_repository::LeadRepository;
use crate::domain::repositories::pipeline_repository::PipelineRepository;
use crate::domain::repositories::queue_repository::{QueueRepository, RepositoryError};
use crate::domain::repositories::workflow_repository::WorkflowRepository;
use chrono::Utc;
use metrics::counter;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// 处置错误类型
#[derive(Error, Debug)]
pub enum DispositionError {
    /// 线索未找到
    #[error("Lead {0} not found")]
    LeadNotFound(uuid::Uuid),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 处置处理报告
#[derive(Debug, Clone)]
pub struct DispositionReport {
    /// 命中的策略类
    pub classes: policy::PolicyClasses,
    /// 线索新状态
    pub lead_status: String,
    /// 移动到的看板标签（执行了管线移动时）
    pub stage: Option<String>,
    /// 有任何策略动作失败
    pub had_failures: bool,
}

/// 处置处理器
///
/// 把一个处置事件展开为尽力而为的saga：
/// 禁止联络、移出序列、暂停序列、管线移动、审计落账。
/// 后续步骤失败不回滚已完成步骤，失败单独记入错误审计表
pub struct DispositionProcessor {
    /// 线索仓库
    leads: Arc<dyn LeadRepository>,
    /// 队列条目仓库
    queue: Arc<dyn QueueRepository>,
    /// 禁止联络登记仓库
    dnc: Arc<dyn DncRepository>,
    /// 工作流进度仓库
    workflows: Arc<dyn WorkflowRepository>,
    /// 管线仓库
    pipeline: Arc<dyn PipelineRepository>,
    /// 处置条目仓库
    dispositions: Arc<dyn DispositionRepository>,
    /// 呼叫尝试记录仓库
    attempts: Arc<dyn CallAttemptRepository>,
    /// 审计仓库
    audit: Arc<dyn AuditRepository>,
}

impl DispositionProcessor {
    /// 创建新的处置处理器实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        queue: Arc<dyn QueueRepository>,
        dnc: Arc<dyn DncRepository>,
        workflows: Arc<dyn WorkflowRepository>,
        pipeline: Arc<dyn PipelineRepository>,
        dispositions: Arc<dyn DispositionRepository>,
        attempts: Arc<dyn CallAttemptRepository>,
        audit: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            leads,
            queue,
            dnc,
            workflows,
            pipeline,
            dispositions,
            attempts,
            audit,
        }
    }

    /// 处理一个处置事件
    ///
    /// # 参数
    ///
    /// * `event` - 处置事件
    ///
    /// # 返回值
    ///
    /// * `Ok(DispositionReport)` - 处理报告（含部分失败的情况）
    /// * `Err(DispositionError)` - 线索不存在或读线索失败
    pub async fn process(
        &self,
        event: &DispositionEvent,
    ) -> Result<DispositionReport, DispositionError> {
        let mut lead = self
            .leads
            .find_by_id(event.lead_id)
            .await?
            .ok_or(DispositionError::LeadNotFound(event.lead_id))?;

        let key = policy::normalize_key(&event.disposition_name);
        let classes = policy::classify(&key);

        // 账户配置的处置条目可提供看板覆盖
        let disposition = match event.disposition_id {
            Some(id) => self.dispositions.find_by_id(id).await?,
            None => {
                self.dispositions
                    .find_by_name(event.account_id, &key)
                    .await?
            }
        };

        let status_before = lead.status.clone();
        let stage_before = self
            .pipeline
            .find_position(event.account_id, event.lead_id)
            .await
            .ok()
            .flatten()
            .map(|p| p.stage);

        let mut actions: Vec<serde_json::Value> = Vec::new();
        let mut had_failures = false;

        // 1. 禁止联络
        if classes.dnc {
            lead.do_not_contact = true;
            lead.status = "dnc".to_string();
            match self
                .dnc
                .insert_if_absent(event.account_id, &lead.phone, Some("disposition"))
                .await
            {
                Ok(inserted) => {
                    actions.push(json!({ "action": "dnc", "ok": true, "inserted": inserted }));
                }
                Err(e) => {
                    had_failures = true;
                    self.note_failure(event, "dnc", &e.to_string(), &mut actions)
                        .await;
                }
            }
        }

        // 2. 移出序列：活动工作流与普通队列条目，回拨段条目保留
        if classes.remove_from_sequence {
            match self
                .workflows
                .transition_active_for_lead(event.lead_id, WorkflowStatus::Removed)
                .await
            {
                Ok(count) => {
                    actions.push(json!({ "action": "remove_workflows", "ok": true, "count": count }));
                }
                Err(e) => {
                    had_failures = true;
                    self.note_failure(event, "remove_workflows", &e.to_string(), &mut actions)
                        .await;
                }
            }

            match self
                .queue
                .remove_for_lead(event.lead_id, CALLBACK_PRIORITY_BAND)
                .await
            {
                Ok(count) => {
                    actions.push(json!({ "action": "remove_queue_entries", "ok": true, "count": count }));
                }
                Err(e) => {
                    had_failures = true;
                    self.note_failure(event, "remove_queue_entries", &e.to_string(), &mut actions)
                        .await;
                }
            }

            if !classes.dnc {
                lead.status = key.clone();
            }
        }

        // 3. 暂停序列
        if classes.pause {
            match self
                .workflows
                .transition_active_for_lead(event.lead_id, WorkflowStatus::Paused)
                .await
            {
                Ok(count) => {
                    actions.push(json!({ "action": "pause_workflows", "ok": true, "count": count }));
                }
                Err(e) => {
                    had_failures = true;
                    self.note_failure(event, "pause_workflows", &e.to_string(), &mut actions)
                        .await;
                }
            }
        }

        if classes.is_empty() {
            lead.status = key.clone();
        }

        if let Err(e) = self.leads.update(&lead).await {
            had_failures = true;
            self.note_failure(event, "update_lead", &e.to_string(), &mut actions)
                .await;
        }

        // 4. 管线移动：处置条目的看板覆盖 → 处置名 → 原始结局
        let stage_label = disposition
            .as_ref()
            .and_then(|d| d.pipeline_stage.clone())
            .unwrap_or_else(|| policy::canonical_stage_label(&key));
        let stage_after = match self
            .move_pipeline(event, &stage_label)
            .await
        {
            Ok(stage) => {
                actions.push(json!({ "action": "pipeline_move", "ok": true, "stage": stage }));
                Some(stage)
            }
            Err(e) => {
                had_failures = true;
                self.note_failure(event, "pipeline_move", &e.to_string(), &mut actions)
                    .await;
                None
            }
        };

        // 5. 审计行，不可变
        let time_to_disposition_ms = match event.call_id {
            Some(call_id) => self
                .attempts
                .find_by_id(call_id)
                .await
                .ok()
                .flatten()
                .and_then(|a| a.ended_at)
                .map(|ended| (Utc::now() - ended.to_utc()).num_milliseconds()),
            None => None,
        };

        let audit_row = DispositionAuditRow {
            account_id: event.account_id,
            lead_id: event.lead_id,
            call_id: event.call_id,
            disposition_name: key.clone(),
            set_by: event.set_by,
            confidence: event.confidence,
            lead_status_before: status_before,
            lead_status_after: lead.status.clone(),
            stage_before,
            stage_after: stage_after.clone(),
            time_to_disposition_ms,
            actions: json!(actions),
        };
        if let Err(e) = self.audit.record(&audit_row).await {
            error!(lead_id = %event.lead_id, error = %e, "Failed to write disposition audit row");
        }

        counter!("dispositions_processed_total").increment(1);
        info!(
            lead_id = %event.lead_id,
            disposition = %key,
            dnc = classes.dnc,
            removed = classes.remove_from_sequence,
            paused = classes.pause,
            had_failures,
            "Disposition processed"
        );

        Ok(DispositionReport {
            classes,
            lead_status: lead.status,
            stage: stage_after,
            had_failures,
        })
    }

    /// 幂等的看板确保与位置覆盖
    async fn move_pipeline(
        &self,
        event: &DispositionEvent,
        stage_label: &str,
    ) -> Result<String, RepositoryError> {
        let normalized = PipelineBoard::normalize(stage_label);

        let board = match self
            .pipeline
            .find_board_by_normalized_name(event.account_id, &normalized)
            .await?
        {
            Some(board) => board,
            None => {
                let board = PipelineBoard::new(event.account_id, stage_label.to_string());
                match self.pipeline.create_board(&board).await {
                    Ok(board) => board,
                    // 并发创建同名看板时重查一次
                    Err(_) => self
                        .pipeline
                        .find_board_by_normalized_name(event.account_id, &normalized)
                        .await?
                        .ok_or(RepositoryError::NotFound)?,
                }
            }
        };

        let position = PipelinePosition::new(
            event.account_id,
            event.lead_id,
            board.id,
            board.name.clone(),
        );
        self.pipeline.upsert_position(&position).await?;

        Ok(board.name)
    }

    async fn note_failure(
        &self,
        event: &DispositionEvent,
        action: &str,
        message: &str,
        actions: &mut Vec<serde_json::Value>,
    ) {
        warn!(
            lead_id = %event.lead_id,
            action = %action,
            error = %message,
            "Disposition policy action failed"
        );
        counter!("disposition_policy_failures_total").increment(1);
        actions.push(json!({ "action": action, "ok": false, "error": message }));

        let row = DispositionErrorRow {
            account_id: event.account_id,
            lead_id: event.lead_id,
            action: action.to_string(),
            message: message.to_string(),
            payload: json!({
                "disposition_name": event.disposition_name,
                "set_by": event.set_by.to_string(),
                "call_id": event.call_id,
            }),
        };
        if let Err(e) = self.audit.record_error(&row).await {
            error!(lead_id = %event.lead_id, error = %e, "Failed to write disposition error row");
        }
    }
}
