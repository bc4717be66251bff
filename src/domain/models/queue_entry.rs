// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 回拨优先级保留段下界
///
/// priority >= 2 的条目属于回拨段，批量"移出序列"操作只清除
/// priority < 2 的普通条目，已排期的回拨不会被顺带清除
pub const CALLBACK_PRIORITY_BAND: i32 = 2;

/// 拨号队列条目
///
/// 表示一次待执行的联络尝试。条目具有状态、优先级、
/// 重试计数和不早于时间等属性，由派发器认领执行。
/// 不变式：同一(campaign_id, lead_id)最多存在一个非终态条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    /// 条目唯一标识符
    pub id: Uuid,
    /// 所属账户ID，用于并发与节奏隔离
    pub account_id: Uuid,
    /// 所属外呼活动ID
    pub campaign_id: Uuid,
    /// 目标线索ID
    pub lead_id: Uuid,
    /// 目标电话号码
    pub phone_number: String,
    /// 条目状态，跟踪联络尝试的生命周期
    pub status: QueueStatus,
    /// 优先级，数值越大越先被认领；回拨使用保留高段
    pub priority: i32,
    /// 已尝试次数
    pub attempts: i32,
    /// 最大尝试次数，提交持续失败时的终止上限
    pub max_attempts: i32,
    /// 不早于时间，到点前不会被认领
    pub scheduled_at: Option<DateTime<FixedOffset>>,
    /// 认领时间，滞留检测的基准
    pub claimed_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 队列条目状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Claimed → Completed/Failed，Removed可由处置策略触发；
/// 提交失败且未达上限时由Claimed回到Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// 等待认领
    #[default]
    Pending,
    /// 已被派发器认领，提交进行中
    Claimed,
    /// 提交已被提供商接受
    Completed,
    /// 提交失败且已达最大尝试次数
    Failed,
    /// 被处置策略移出序列
    Removed,
}

impl QueueStatus {
    /// 判断状态是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueueStatus::Completed | QueueStatus::Failed | QueueStatus::Removed
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueueStatus::Pending => write!(f, "pending"),
            QueueStatus::Claimed => write!(f, "claimed"),
            QueueStatus::Completed => write!(f, "completed"),
            QueueStatus::Failed => write!(f, "failed"),
            QueueStatus::Removed => write!(f, "removed"),
        }
    }
}

impl FromStr for QueueStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QueueStatus::Pending),
            "claimed" => Ok(QueueStatus::Claimed),
            "completed" => Ok(QueueStatus::Completed),
            "failed" => Ok(QueueStatus::Failed),
            "removed" => Ok(QueueStatus::Removed),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当条目状态转换不符合生命周期规则时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl QueueEntry {
    /// 创建一个新的待认领条目
    ///
    /// # 参数
    ///
    /// * `account_id` - 所属账户ID
    /// * `campaign_id` - 所属活动ID
    /// * `lead_id` - 目标线索ID
    /// * `phone_number` - 目标电话号码
    /// * `priority` - 优先级
    /// * `scheduled_at` - 不早于时间
    ///
    /// # 返回值
    ///
    /// 返回新创建的队列条目
    pub fn new(
        account_id: Uuid,
        campaign_id: Uuid,
        lead_id: Uuid,
        phone_number: String,
        priority: i32,
        scheduled_at: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            campaign_id,
            lead_id,
            phone_number,
            status: QueueStatus::Pending,
            priority,
            attempts: 0,
            max_attempts: 3,
            scheduled_at,
            claimed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 判断条目是否属于回拨保留段
    pub fn is_callback(&self) -> bool {
        self.priority >= CALLBACK_PRIORITY_BAND
    }

    /// 判断条目是否到期可认领
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueStatus::Pending
            && self
                .scheduled_at
                .map(|t| t <= now)
                .unwrap_or(true)
    }

    /// 判断提交失败后是否还能重试
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> QueueEntry {
        QueueEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "+14155550134".to_string(),
            0,
            None,
        )
    }

    #[test]
    fn test_new_entry_is_pending() {
        let e = entry();
        assert_eq!(e.status, QueueStatus::Pending);
        assert_eq!(e.attempts, 0);
        assert!(!e.is_callback());
    }

    #[test]
    fn test_callback_band() {
        let mut e = entry();
        e.priority = CALLBACK_PRIORITY_BAND;
        assert!(e.is_callback());
        e.priority = 1;
        assert!(!e.is_callback());
    }

    #[test]
    fn test_is_due_respects_scheduled_at() {
        let mut e = entry();
        assert!(e.is_due(Utc::now()));

        e.scheduled_at = Some((Utc::now() + chrono::Duration::hours(1)).into());
        assert!(!e.is_due(Utc::now()));
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            QueueStatus::Pending,
            QueueStatus::Claimed,
            QueueStatus::Completed,
            QueueStatus::Failed,
            QueueStatus::Removed,
        ] {
            assert_eq!(s.to_string().parse::<QueueStatus>(), Ok(s));
        }
    }
}
