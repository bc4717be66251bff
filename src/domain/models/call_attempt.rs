// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 呼叫尝试记录
///
/// 一次派发的结果。由派发器独占创建，
/// 提供商回执更新状态，处置处理器与对账器只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAttemptRecord {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 关联的队列条目ID
    pub queue_entry_id: Option<Uuid>,
    /// 目标线索ID
    pub lead_id: Uuid,
    /// 使用的提供商名称
    pub provider: String,
    /// 外显号码
    pub from_number: String,
    /// 目标号码
    pub to_number: String,
    /// 联络通道
    pub channel: ContactChannel,
    /// 呼叫状态
    pub status: CallStatus,
    /// 提供商侧呼叫ID，用于回执关联
    pub provider_call_id: Option<String>,
    /// 结局代码，处置输入
    pub outcome: Option<String>,
    /// 开始时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 结束时间
    pub ended_at: Option<DateTime<FixedOffset>>,
    /// 附加元数据（转录引用、强制关闭说明等）
    pub metadata: serde_json::Value,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 联络通道枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    /// 语音呼叫
    #[default]
    Call,
    /// 短信
    Sms,
    /// 无振铃语音留言
    Rvm,
}

impl fmt::Display for ContactChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContactChannel::Call => write!(f, "call"),
            ContactChannel::Sms => write!(f, "sms"),
            ContactChannel::Rvm => write!(f, "rvm"),
        }
    }
}

impl FromStr for ContactChannel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(ContactChannel::Call),
            "sms" => Ok(ContactChannel::Sms),
            "rvm" => Ok(ContactChannel::Rvm),
            _ => Err(()),
        }
    }
}

/// 呼叫状态枚举
///
/// initiated/ringing/in_progress为在途状态，计入并发额度；
/// completed/failed/no_answer为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// 已发起，等待提供商接通
    #[default]
    Initiated,
    /// 振铃中
    Ringing,
    /// 通话进行中
    InProgress,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
    /// 无人接听（含对账器强制关闭）
    NoAnswer,
}

impl CallStatus {
    /// 判断状态是否在途（占用并发额度）
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CallStatus::Initiated | CallStatus::Ringing | CallStatus::InProgress
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CallStatus::Initiated => write!(f, "initiated"),
            CallStatus::Ringing => write!(f, "ringing"),
            CallStatus::InProgress => write!(f, "in_progress"),
            CallStatus::Completed => write!(f, "completed"),
            CallStatus::Failed => write!(f, "failed"),
            CallStatus::NoAnswer => write!(f, "no_answer"),
        }
    }
}

impl FromStr for CallStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(CallStatus::Initiated),
            "ringing" => Ok(CallStatus::Ringing),
            "in_progress" => Ok(CallStatus::InProgress),
            "completed" => Ok(CallStatus::Completed),
            "failed" => Ok(CallStatus::Failed),
            "no_answer" => Ok(CallStatus::NoAnswer),
            _ => Err(()),
        }
    }
}

impl CallAttemptRecord {
    /// 创建一条新的呼叫尝试记录
    ///
    /// # 参数
    ///
    /// * `account_id` - 所属账户ID
    /// * `queue_entry_id` - 关联的队列条目ID
    /// * `lead_id` - 目标线索ID
    /// * `provider` - 提供商名称
    /// * `from_number` - 外显号码
    /// * `to_number` - 目标号码
    /// * `channel` - 联络通道
    ///
    /// # 返回值
    ///
    /// 返回状态为Initiated的新记录
    pub fn new(
        account_id: Uuid,
        queue_entry_id: Option<Uuid>,
        lead_id: Uuid,
        provider: String,
        from_number: String,
        to_number: String,
        channel: ContactChannel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            queue_entry_id,
            lead_id,
            provider,
            from_number,
            to_number,
            channel,
            status: CallStatus::Initiated,
            provider_call_id: None,
            outcome: None,
            started_at: Some(Utc::now().into()),
            ended_at: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }
}
