// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 工作流进度
///
/// 线索在多步序列中的位置。
/// 同一(lead, workflow)最多一条Active记录，由处理器层保证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowProgress {
    /// 进度唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 工作流ID
    pub workflow_id: Uuid,
    /// 线索ID
    pub lead_id: Uuid,
    /// 活动ID
    pub campaign_id: Uuid,
    /// 进度状态
    pub status: WorkflowStatus,
    /// 下一步到期时间
    pub next_step_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 工作流进度状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// 进行中
    #[default]
    Active,
    /// 已暂停，可被后续流程恢复
    Paused,
    /// 已移出（终态处置触发）
    Removed,
    /// 已走完全部步骤
    Completed,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WorkflowStatus::Active => write!(f, "active"),
            WorkflowStatus::Paused => write!(f, "paused"),
            WorkflowStatus::Removed => write!(f, "removed"),
            WorkflowStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for WorkflowStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(WorkflowStatus::Active),
            "paused" => Ok(WorkflowStatus::Paused),
            "removed" => Ok(WorkflowStatus::Removed),
            "completed" => Ok(WorkflowStatus::Completed),
            _ => Err(()),
        }
    }
}

impl WorkflowProgress {
    /// 创建一条新的Active进度
    pub fn new(account_id: Uuid, workflow_id: Uuid, lead_id: Uuid, campaign_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            workflow_id,
            lead_id,
            campaign_id,
            status: WorkflowStatus::Active,
            next_step_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }
}
