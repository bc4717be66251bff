// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 处置条目
///
/// 结局分类表中的一项，静态参考数据。
/// name经归一化后参与策略分类，pipeline_stage可覆盖默认的看板解析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disposition {
    /// 处置唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 处置名称
    pub name: String,
    /// 目标管线看板名称（可选）
    pub pipeline_stage: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
}

/// 处置事件来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetBy {
    /// AI分类器（转录或通话结果）
    Ai,
    /// 坐席手工录入
    Manual,
    /// 自动化规则
    #[default]
    Automation,
}

impl fmt::Display for SetBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SetBy::Ai => write!(f, "ai"),
            SetBy::Manual => write!(f, "manual"),
            SetBy::Automation => write!(f, "automation"),
        }
    }
}

impl FromStr for SetBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(SetBy::Ai),
            "manual" => Ok(SetBy::Manual),
            "automation" => Ok(SetBy::Automation),
            _ => Err(()),
        }
    }
}

/// 处置事件
///
/// 处置处理器的输入，来自提供商回执、坐席录入或入站消息分类器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispositionEvent {
    /// 目标线索ID
    pub lead_id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 处置名称（原始结局代码）
    pub disposition_name: String,
    /// 处置条目ID（可选，命中账户配置时提供）
    pub disposition_id: Option<Uuid>,
    /// 关联的呼叫记录ID
    pub call_id: Option<Uuid>,
    /// 事件来源
    pub set_by: SetBy,
    /// 分类器置信度 (0.0-1.0)
    pub confidence: Option<f64>,
}
