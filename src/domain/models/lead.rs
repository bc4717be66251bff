// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 线索实体
///
/// 处置处理器与回拨排期会修改线索；
/// 自动化规则引擎（范围外）读取线索决定入队
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// 线索唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 电话号码
    pub phone: String,
    /// 线索状态（处置归一化名称）
    pub status: String,
    /// 禁止联络标志
    pub do_not_contact: bool,
    /// 下次回拨时间
    pub next_callback_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl Lead {
    /// 创建一个新线索
    pub fn new(account_id: Uuid, phone: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            phone,
            status: "new".to_string(),
            do_not_contact: false,
            next_callback_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }
}
