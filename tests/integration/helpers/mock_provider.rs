// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dialrs::domain::models::provider_number::Capability;
use dialrs::providers::traits::{
    CallRequest, DispatchResponse, NumberInfo, ProviderAdapter, ProviderError, RvmRequest,
    SmsRequest,
};
use std::sync::Mutex;
use uuid::Uuid;

const MOCK_CAPABILITIES: &[Capability] = &[
    Capability::Voice,
    Capability::Sms,
    Capability::Rvm,
    Capability::SignedCalling,
];

/// 模拟适配器的行为模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// 接受全部提交
    Accept,
    /// 结构化拒绝（success=false）
    Reject,
    /// 返回限流错误
    RateLimited,
}

/// 可编程的模拟提供商适配器，记录收到的呼叫请求
pub struct MockAdapter {
    behavior: MockBehavior,
    calls: Mutex<Vec<CallRequest>>,
}

impl MockAdapter {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<CallRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> &'static [Capability] {
        MOCK_CAPABILITIES
    }

    async fn test_connection(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    async fn list_numbers(&self) -> Result<Vec<NumberInfo>, ProviderError> {
        Ok(Vec::new())
    }

    async fn import_number(&self, number: &str) -> Result<NumberInfo, ProviderError> {
        Ok(NumberInfo {
            number: number.to_string(),
            capabilities: MOCK_CAPABILITIES.to_vec(),
            verified: true,
        })
    }

    async fn create_call(&self, request: &CallRequest) -> Result<DispatchResponse, ProviderError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.behavior {
            MockBehavior::Accept => Ok(DispatchResponse::accepted(format!(
                "mock_call_{}",
                Uuid::new_v4()
            ))),
            MockBehavior::Reject => Ok(DispatchResponse {
                success: false,
                provider_call_id: None,
                message: Some("rejected by mock".to_string()),
            }),
            MockBehavior::RateLimited => Err(ProviderError::RateLimited {
                retry_after_seconds: Some(30),
            }),
        }
    }

    async fn send_sms(&self, _request: &SmsRequest) -> Result<DispatchResponse, ProviderError> {
        Ok(DispatchResponse::unsupported("sms", "mock"))
    }

    async fn create_rvm(&self, _request: &RvmRequest) -> Result<DispatchResponse, ProviderError> {
        Ok(DispatchResponse::unsupported("rvm", "mock"))
    }

    fn verify_signature(&self, _payload: &[u8], _signature: &str) -> bool {
        true
    }
}
