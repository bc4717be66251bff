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

use crate::config::settings::ProviderAccountSettings;
use crate::domain::models::provider_number::Capability;
use crate::providers::traits::{
    CallRequest, DispatchResponse, NumberInfo, ProviderAdapter, ProviderError, RvmRequest,
    SmsRequest,
};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_BASE_URL: &str = "https://api.telnyx.com";

/// Telnyx适配器
///
/// 全通道提供商：语音、短信、无振铃语音留言
pub struct TelnyxAdapter {
    /// HTTP客户端
    client: Client,
    /// API基址
    base_url: String,
    /// 回执签名密钥
    webhook_secret: Option<String>,
}

#[derive(Deserialize)]
struct TelnyxData<T> {
    data: T,
}

#[derive(Deserialize)]
struct TelnyxCall {
    #[serde(alias = "call_control_id", alias = "id")]
    id: String,
}

#[derive(Deserialize)]
struct TelnyxNumber {
    phone_number: String,
    #[serde(default)]
    messaging_enabled: bool,
}

impl TelnyxAdapter {
    /// 从提供商配置创建适配器实例
    pub fn new(settings: &ProviderAccountSettings) -> Self {
        let mut headers = header::HeaderMap::new();
        if let Ok(mut value) =
            header::HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
        {
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        Self {
            client: Client::builder()
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            webhook_secret: settings.webhook_secret.clone(),
        }
    }

    fn number_capabilities(messaging_enabled: bool) -> Vec<Capability> {
        let mut caps = vec![Capability::Voice, Capability::Rvm];
        if messaging_enabled {
            caps.push(Capability::Sms);
        }
        caps
    }

    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_seconds = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                Err(ProviderError::RateLimited {
                    retry_after_seconds,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
            s => {
                let message = response.text().await.unwrap_or_default();
                Err(ProviderError::Api {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for TelnyxAdapter {
    fn name(&self) -> &'static str {
        "telnyx"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Voice, Capability::Sms, Capability::Rvm]
    }

    async fn test_connection(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v2/phone_numbers", self.base_url))
            .send()
            .await?;

        match Self::check_status(response).await {
            Ok(_) => Ok(true),
            Err(ProviderError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_numbers(&self) -> Result<Vec<NumberInfo>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v2/phone_numbers", self.base_url))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let numbers: TelnyxData<Vec<TelnyxNumber>> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(numbers
            .data
            .into_iter()
            .map(|n| NumberInfo {
                number: n.phone_number,
                capabilities: Self::number_capabilities(n.messaging_enabled),
                verified: true,
            })
            .collect())
    }

    async fn import_number(&self, number: &str) -> Result<NumberInfo, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v2/phone_numbers", self.base_url))
            .json(&serde_json::json!({ "phone_number": number }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let imported: TelnyxData<TelnyxNumber> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(NumberInfo {
            number: imported.data.phone_number,
            capabilities: Self::number_capabilities(imported.data.messaging_enabled),
            verified: true,
        })
    }

    async fn create_call(&self, request: &CallRequest) -> Result<DispatchResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v2/calls", self.base_url))
            .json(&serde_json::json!({
                "from": request.from_number,
                "to": request.to_number,
                "custom_headers": request.metadata,
            }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let call: TelnyxData<TelnyxCall> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(DispatchResponse::accepted(call.data.id))
    }

    async fn send_sms(&self, request: &SmsRequest) -> Result<DispatchResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v2/messages", self.base_url))
            .json(&serde_json::json!({
                "from": request.from_number,
                "to": request.to_number,
                "text": request.body,
            }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let message: TelnyxData<TelnyxCall> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(DispatchResponse::accepted(message.data.id))
    }

    async fn create_rvm(&self, request: &RvmRequest) -> Result<DispatchResponse, ProviderError> {
        // Telnyx投递RVM走呼叫API加AMD直投语音信箱
        let response = self
            .client
            .post(format!("{}/v2/calls", self.base_url))
            .json(&serde_json::json!({
                "from": request.from_number,
                "to": request.to_number,
                "answering_machine_detection": "detect_beep",
                "audio_url": request.audio_url,
            }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let call: TelnyxData<TelnyxCall> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(DispatchResponse::accepted(call.data.id))
    }

    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool {
        let Some(secret) = &self.webhook_secret else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());
        expected == signature.trim().to_lowercase()
    }
}
