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
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio适配器
///
/// 语音和短信，不支持无振铃语音留言。
/// api_key格式为"account_sid:auth_token"，走Basic认证
pub struct TwilioAdapter {
    /// HTTP客户端
    client: Client,
    /// API基址
    base_url: String,
    /// 账户SID
    account_sid: String,
    /// 认证令牌，同时用作回执签名密钥
    auth_token: String,
}

#[derive(Deserialize)]
struct TwilioResource {
    sid: String,
}

#[derive(Deserialize)]
struct TwilioNumberPage {
    incoming_phone_numbers: Vec<TwilioNumber>,
}

#[derive(Deserialize)]
struct TwilioNumber {
    phone_number: String,
    #[serde(default)]
    capabilities: TwilioCapabilities,
}

#[derive(Deserialize, Default)]
struct TwilioCapabilities {
    #[serde(default)]
    voice: bool,
    #[serde(default)]
    sms: bool,
}

impl TwilioAdapter {
    /// 从提供商配置创建适配器实例
    pub fn new(settings: &ProviderAccountSettings) -> Self {
        let (account_sid, auth_token) = settings
            .api_key
            .split_once(':')
            .map(|(sid, token)| (sid.to_string(), token.to_string()))
            .unwrap_or_else(|| (settings.api_key.clone(), String::new()));

        Self {
            client: Client::new(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            account_sid,
            auth_token,
        }
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{}",
            self.base_url, self.account_sid, resource
        )
    }

    fn number_capabilities(caps: &TwilioCapabilities) -> Vec<Capability> {
        let mut result = Vec::new();
        if caps.voice {
            result.push(Capability::Voice);
        }
        if caps.sms {
            result.push(Capability::Sms);
        }
        result
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
impl ProviderAdapter for TwilioAdapter {
    fn name(&self) -> &'static str {
        "twilio"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Voice, Capability::Sms]
    }

    async fn test_connection(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(self.account_url("IncomingPhoneNumbers.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
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
            .get(self.account_url("IncomingPhoneNumbers.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let page: TwilioNumberPage = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(page
            .incoming_phone_numbers
            .into_iter()
            .map(|n| NumberInfo {
                number: n.phone_number,
                capabilities: Self::number_capabilities(&n.capabilities),
                verified: true,
            })
            .collect())
    }

    async fn import_number(&self, number: &str) -> Result<NumberInfo, ProviderError> {
        let response = self
            .client
            .post(self.account_url("IncomingPhoneNumbers.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("PhoneNumber", number)])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let imported: TwilioNumber = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(NumberInfo {
            number: imported.phone_number,
            capabilities: Self::number_capabilities(&imported.capabilities),
            verified: true,
        })
    }

    async fn create_call(&self, request: &CallRequest) -> Result<DispatchResponse, ProviderError> {
        let response = self
            .client
            .post(self.account_url("Calls.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", request.from_number.as_str()),
                ("To", request.to_number.as_str()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let call: TwilioResource = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(DispatchResponse::accepted(call.sid))
    }

    async fn send_sms(&self, request: &SmsRequest) -> Result<DispatchResponse, ProviderError> {
        let response = self
            .client
            .post(self.account_url("Messages.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", request.from_number.as_str()),
                ("To", request.to_number.as_str()),
                ("Body", request.body.as_str()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let message: TwilioResource = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(DispatchResponse::accepted(message.sid))
    }

    async fn create_rvm(&self, _request: &RvmRequest) -> Result<DispatchResponse, ProviderError> {
        Ok(DispatchResponse::unsupported("rvm", self.name()))
    }

    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool {
        if self.auth_token.is_empty() {
            return false;
        }
        let Ok(mut mac) = HmacSha256::new_from_slice(self.auth_token.as_bytes()) else {
            return false;
        };
        mac.update(payload);
        let expected = BASE64.encode(mac.finalize().into_bytes());
        expected == signature.trim()
    }
}
