// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 提供商能力枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// 语音外呼
    Voice,
    /// 短信
    Sms,
    /// 无振铃语音留言
    Rvm,
    /// 签名呼叫（STIR/SHAKEN attestation）
    SignedCalling,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capability::Voice => write!(f, "voice"),
            Capability::Sms => write!(f, "sms"),
            Capability::Rvm => write!(f, "rvm"),
            Capability::SignedCalling => write!(f, "signed_calling"),
        }
    }
}

impl FromStr for Capability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(Capability::Voice),
            "sms" => Ok(Capability::Sms),
            "rvm" => Ok(Capability::Rvm),
            "signed_calling" => Ok(Capability::SignedCalling),
            _ => Err(()),
        }
    }
}

/// 提供商号码
///
/// 归属于某个提供商账户的电话号码，身份不可变；
/// 能力集与验证标志由周期同步刷新（范围外）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderNumber {
    /// 号码唯一标识符
    pub id: Uuid,
    /// 所属账户ID
    pub account_id: Uuid,
    /// 提供商名称
    pub provider: String,
    /// 电话号码（E.164）
    pub number: String,
    /// 能力集
    pub capabilities: HashSet<Capability>,
    /// 是否已验证
    pub verified: bool,
    /// 提供商路由优先级，数值越小越优先
    pub provider_priority: i32,
    /// 最近使用时间，路由负载均衡的平局打破依据
    pub last_used_at: Option<DateTime<FixedOffset>>,
    /// 是否启用
    pub active: bool,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl ProviderNumber {
    /// 创建一个新的提供商号码
    pub fn new(
        account_id: Uuid,
        provider: String,
        number: String,
        capabilities: HashSet<Capability>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            provider,
            number,
            capabilities,
            verified: false,
            provider_priority: 100,
            last_used_at: None,
            active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 判断号码能力集是否覆盖所需能力
    pub fn supports_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }
}
