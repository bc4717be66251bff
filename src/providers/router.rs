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

use crate::domain::models::call_attempt::ContactChannel;
use crate::domain::models::provider_number::{Capability, ProviderNumber};
use crate::domain::repositories::provider_number_repository::ProviderNumberRepository;
use crate::domain::repositories::queue_repository::RepositoryError;
use crate::providers::traits::ProviderAdapter;
use crate::utils::phone;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// 路由错误类型
#[derive(Error, Debug)]
pub enum RouterError {
    /// 没有满足能力要求的提供商号码
    #[error("No eligible provider for required capabilities")]
    NoEligibleProvider,
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 路由要求
#[derive(Debug, Clone, Copy)]
pub struct RoutingRequirements {
    /// 联络通道
    pub channel: ContactChannel,
    /// 是否偏好签名呼叫（偏好而非硬性要求）
    pub prefer_signed: bool,
}

impl RoutingRequirements {
    /// 通道对应的硬性能力要求
    pub fn required_capabilities(&self) -> Vec<Capability> {
        match self.channel {
            ContactChannel::Call => vec![Capability::Voice],
            ContactChannel::Sms => vec![Capability::Sms],
            ContactChannel::Rvm => vec![Capability::Rvm],
        }
    }
}

/// 路由决策
pub struct RouteDecision {
    /// 选中的外显号码
    pub number: ProviderNumber,
    /// 对应的提供商适配器
    pub adapter: Arc<dyn ProviderAdapter>,
    /// 人类可读的路由理由，随呼叫记录留档
    pub reason: String,
}

// 适配器是trait对象，手写Debug只打印其名称
impl std::fmt::Debug for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDecision")
            .field("number", &self.number.number)
            .field("adapter", &self.adapter.name())
            .field("reason", &self.reason)
            .finish()
    }
}

/// 提供商路由器
///
/// 选号流程：能力超集过滤 → 本地区号偏好 → 签名呼叫偏好 →
/// provider_priority升序、最近最少使用优先。
/// 限流中的提供商在冷却窗口内被跳过，冷却表仅存内存
pub struct ProviderRouter {
    /// 注册的适配器，键为提供商名称
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    /// 号码仓库
    numbers: Arc<dyn ProviderNumberRepository>,
    /// 提供商限流冷却截止时间
    cooldowns: DashMap<String, DateTime<Utc>>,
    /// 冷却窗口
    cooldown: chrono::Duration,
}

impl ProviderRouter {
    /// 创建新的提供商路由器
    ///
    /// # 参数
    ///
    /// * `adapters` - 可用的适配器列表
    /// * `numbers` - 号码仓库
    /// * `cooldown` - 限流冷却窗口
    ///
    /// # 返回值
    ///
    /// 返回新的路由器实例
    pub fn new(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        numbers: Arc<dyn ProviderNumberRepository>,
        cooldown: chrono::Duration,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|a| (a.name().to_string(), a))
            .collect();

        Self {
            adapters,
            numbers,
            cooldowns: DashMap::new(),
            cooldown,
        }
    }

    /// 标记提供商被限流，冷却窗口内跳过其全部号码
    pub fn note_rate_limited(&self, provider: &str) {
        let until = Utc::now() + self.cooldown;
        warn!(provider = %provider, until = %until, "Provider rate limited, cooling down");
        self.cooldowns.insert(provider.to_string(), until);
    }

    /// 判断提供商是否处于冷却中
    pub fn is_cooling_down(&self, provider: &str) -> bool {
        // 先释放读守卫再清理过期项，避免同分片死锁
        let until = self.cooldowns.get(provider).map(|u| *u);
        match until {
            Some(until) if until > Utc::now() => true,
            Some(_) => {
                self.cooldowns.remove(provider);
                false
            }
            None => false,
        }
    }

    /// 为一次外呼选择号码与适配器
    ///
    /// # 参数
    ///
    /// * `account_id` - 账户ID
    /// * `requirements` - 路由要求
    /// * `target_number` - 目标号码（E.164），本地区号偏好的依据
    ///
    /// # 返回值
    ///
    /// * `Ok(RouteDecision)` - 路由决策
    /// * `Err(RouterError::NoEligibleProvider)` - 没有满足要求的号码
    pub async fn select(
        &self,
        account_id: Uuid,
        requirements: &RoutingRequirements,
        target_number: &str,
    ) -> Result<RouteDecision, RouterError> {
        let required = requirements.required_capabilities();

        let mut candidates: Vec<ProviderNumber> = self
            .numbers
            .find_active(account_id)
            .await?
            .into_iter()
            .filter(|n| n.supports_all(&required))
            .filter(|n| self.adapters.contains_key(&n.provider))
            .filter(|n| !self.is_cooling_down(&n.provider))
            .collect();

        if candidates.is_empty() {
            return Err(RouterError::NoEligibleProvider);
        }

        let mut reasons: Vec<String> = vec![format!("channel {}", requirements.channel)];

        // 本地区号偏好，没有匹配就保持全量候选
        if let Some(area) = phone::area_code(target_number) {
            let local: Vec<ProviderNumber> = candidates
                .iter()
                .filter(|n| phone::area_code(&n.number).as_deref() == Some(area.as_str()))
                .cloned()
                .collect();
            if !local.is_empty() {
                candidates = local;
                reasons.push(format!("local presence {}", area));
            }
        }

        // 签名呼叫偏好，同样可回退
        if requirements.prefer_signed {
            let signed: Vec<ProviderNumber> = candidates
                .iter()
                .filter(|n| n.capabilities.contains(&Capability::SignedCalling))
                .cloned()
                .collect();
            if !signed.is_empty() {
                candidates = signed;
                reasons.push("signed calling".to_string());
            }
        }

        candidates.sort_by(|a, b| {
            a.provider_priority
                .cmp(&b.provider_priority)
                .then(a.last_used_at.cmp(&b.last_used_at))
        });

        let number = candidates.remove(0);
        let adapter = self
            .adapters
            .get(&number.provider)
            .cloned()
            .ok_or(RouterError::NoEligibleProvider)?;

        reasons.push(format!(
            "provider {} priority {}",
            number.provider, number.provider_priority
        ));
        let reason = reasons.join(", ");

        debug!(
            account_id = %account_id,
            number = %number.number,
            reason = %reason,
            "Route selected"
        );

        self.numbers
            .touch_last_used(number.id, Utc::now().into())
            .await?;

        Ok(RouteDecision {
            number,
            adapter,
            reason,
        })
    }
}
