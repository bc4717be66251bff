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

use crate::domain::models::provider_number::Capability;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// 提供商错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 被提供商限流
    #[error("Rate limited by provider, retry after {retry_after_seconds:?}s")]
    RateLimited {
        /// 提供商建议的重试等待秒数
        retry_after_seconds: Option<u64>,
    },
    /// 认证失败
    #[error("Authentication rejected by provider")]
    Unauthorized,
    /// 提供商API返回错误
    #[error("Provider API error {status}: {message}")]
    Api {
        /// HTTP状态码
        status: u16,
        /// 错误消息
        message: String,
    },
    /// 响应解析失败
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 判断错误是否为限流
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
            || matches!(self, ProviderError::RequestFailed(e) if e.status().is_some_and(|s| s.as_u16() == 429))
    }
}

/// 呼叫发起请求
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    /// 所属账户ID
    pub account_id: Uuid,
    /// 目标线索ID
    pub lead_id: Uuid,
    /// 外显号码（E.164）
    pub from_number: String,
    /// 目标号码（E.164）
    pub to_number: String,
    /// 随呼叫传递的元数据，回执时原样带回
    pub metadata: HashMap<String, String>,
}

/// 短信发送请求
#[derive(Debug, Clone, Serialize)]
pub struct SmsRequest {
    /// 外显号码
    pub from_number: String,
    /// 目标号码
    pub to_number: String,
    /// 短信内容
    pub body: String,
}

/// 无振铃语音留言请求
#[derive(Debug, Clone, Serialize)]
pub struct RvmRequest {
    /// 外显号码
    pub from_number: String,
    /// 目标号码
    pub to_number: String,
    /// 留言音频URL
    pub audio_url: String,
}

/// 派发响应
///
/// 不支持的通道返回success=false而不是错误，
/// 调用方据此把条目按提交失败处理
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchResponse {
    /// 提供商是否接受本次提交
    pub success: bool,
    /// 提供商侧呼叫/消息ID
    pub provider_call_id: Option<String>,
    /// 附加说明（失败原因、不支持的通道等）
    pub message: Option<String>,
}

impl DispatchResponse {
    /// 构造接受响应
    pub fn accepted(provider_call_id: String) -> Self {
        Self {
            success: true,
            provider_call_id: Some(provider_call_id),
            message: None,
        }
    }

    /// 构造不支持通道的拒绝响应
    pub fn unsupported(channel: &str, provider: &str) -> Self {
        Self {
            success: false,
            provider_call_id: None,
            message: Some(format!("{} does not support {}", provider, channel)),
        }
    }
}

/// 提供商侧号码信息
#[derive(Debug, Clone)]
pub struct NumberInfo {
    /// 号码（E.164）
    pub number: String,
    /// 能力集
    pub capabilities: Vec<Capability>,
    /// 是否已验证
    pub verified: bool,
}

/// 提供商适配器特质
///
/// 统一的提供商外部接口。实现必须把不支持的通道映射为
/// success=false的结构化响应而不是panic
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// 适配器名称（与ProviderNumber.provider一致）
    fn name(&self) -> &'static str;

    /// 适配器支持的能力集
    fn capabilities(&self) -> &'static [Capability];

    /// 检查凭证有效性
    async fn test_connection(&self) -> Result<bool, ProviderError>;

    /// 列出提供商账户下的号码
    async fn list_numbers(&self) -> Result<Vec<NumberInfo>, ProviderError>;

    /// 导入已有号码
    async fn import_number(&self, number: &str) -> Result<NumberInfo, ProviderError>;

    /// 发起语音呼叫
    async fn create_call(&self, request: &CallRequest) -> Result<DispatchResponse, ProviderError>;

    /// 发送短信
    async fn send_sms(&self, request: &SmsRequest) -> Result<DispatchResponse, ProviderError>;

    /// 投递无振铃语音留言
    async fn create_rvm(&self, request: &RvmRequest) -> Result<DispatchResponse, ProviderError>;

    /// 校验回执签名
    ///
    /// 未配置密钥的适配器返回false，调用方拒绝该回执
    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool;
}
