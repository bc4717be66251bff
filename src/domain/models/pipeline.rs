// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 管线看板
///
/// 处置驱动的管线移动目标。normalized_name是小写去空格的形式，
/// ensure-board按它做大小写不敏感匹配，避免命名差异产生重复看板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBoard {
    /// 看板唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 看板显示名称
    pub name: String,
    /// 归一化名称，匹配键
    pub normalized_name: String,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
}

impl PipelineBoard {
    /// 按显示名称创建看板，自动生成归一化名称
    pub fn new(account_id: Uuid, name: String) -> Self {
        let normalized_name = Self::normalize(&name);
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            normalized_name,
            created_at: Utc::now().into(),
        }
    }

    /// 归一化看板名称用于匹配
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// 管线位置
///
/// 线索当前所在看板，每(lead, account)一行，移动时整行覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePosition {
    /// 位置唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 线索ID
    pub lead_id: Uuid,
    /// 当前看板ID
    pub board_id: Uuid,
    /// 当前阶段显示标签
    pub stage: String,
    /// 是否人工移动
    pub moved_by_user: bool,
    /// 移动时间
    pub moved_at: DateTime<FixedOffset>,
}

impl PipelinePosition {
    /// 创建一条管线位置
    pub fn new(account_id: Uuid, lead_id: Uuid, board_id: Uuid, stage: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            lead_id,
            board_id,
            stage,
            moved_by_user: false,
            moved_at: Utc::now().into(),
        }
    }
}
