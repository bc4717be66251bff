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

use crate::config::settings::PacingSettings;
use crate::domain::repositories::call_attempt_repository::OutcomeRates;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use parking_lot::Mutex;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// 自适应调速的最小样本数
const MIN_ADAPT_SAMPLES: u64 = 10;

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// 账户并发额度用尽
    AccountConcurrency,
    /// 提供商并发额度用尽
    ProviderConcurrency,
}

/// 准入裁决
#[derive(Debug, Clone, Copy)]
pub enum Admission {
    /// 准入，最多允许派发allowed条
    Admit {
        /// 允许的条目数
        allowed: u64,
    },
    /// 拒绝
    Deny {
        /// 拒绝原因
        reason: DenialReason,
        /// 建议的重试等待
        retry_after: Duration,
    },
}

impl Admission {
    /// 准入的条目数，拒绝时为0
    pub fn allowed(&self) -> u64 {
        match self {
            Admission::Admit { allowed } => *allowed,
            Admission::Deny { .. } => 0,
        }
    }
}

/// 并发治理器
///
/// 纯准入判断：在途计数由调用方从呼叫记录即时派生传入，
/// 治理器自身不保存跨tick计数。自适应模式按近期失败率
/// 上下微调目标速率，夹在[min, max]区间内。
/// tick内的突发间隔由governor限速器平滑
pub struct ConcurrencyGovernor {
    /// 节奏配置
    settings: PacingSettings,
    /// 当前目标速率（每分钟尝试数），自适应调整
    current_rate: Mutex<u32>,
    /// 账户维度的突发平滑限速器，配额取速率上限
    pacer: DefaultKeyedRateLimiter<Uuid>,
}

impl ConcurrencyGovernor {
    /// 创建新的并发治理器
    ///
    /// # 参数
    ///
    /// * `settings` - 节奏配置
    ///
    /// # 返回值
    ///
    /// 返回新的治理器实例
    pub fn new(settings: PacingSettings) -> Self {
        let ceiling = NonZeroU32::new(settings.max_attempts_per_minute.max(1))
            .unwrap_or(NonZeroU32::MIN);

        Self {
            current_rate: Mutex::new(settings.target_attempts_per_minute),
            pacer: RateLimiter::keyed(Quota::per_minute(ceiling)),
            settings,
        }
    }

    /// 当前目标速率
    pub fn current_rate(&self) -> u32 {
        *self.current_rate.lock()
    }

    /// 账户维度准入判断
    ///
    /// # 参数
    ///
    /// * `account_in_flight` - 账户当前在途呼叫数
    /// * `requested` - 希望派发的条目数
    ///
    /// # 返回值
    ///
    /// 返回准入裁决。准入数同时受账户并发余量和当前速率约束
    pub fn admit(&self, account_in_flight: u64, requested: u64) -> Admission {
        if account_in_flight >= self.settings.max_concurrent_per_account {
            return Admission::Deny {
                reason: DenialReason::AccountConcurrency,
                retry_after: self.retry_after(),
            };
        }

        let headroom = self.settings.max_concurrent_per_account - account_in_flight;
        let rate_cap = self.current_rate() as u64;
        let allowed = requested.min(headroom).min(rate_cap.max(1));

        debug!(
            in_flight = account_in_flight,
            requested, allowed, "Governor admission"
        );
        Admission::Admit { allowed }
    }

    /// 提供商维度准入判断
    pub fn admit_provider(&self, provider_in_flight: u64) -> Admission {
        if provider_in_flight >= self.settings.max_concurrent_per_provider {
            return Admission::Deny {
                reason: DenialReason::ProviderConcurrency,
                retry_after: self.retry_after(),
            };
        }
        Admission::Admit {
            allowed: self.settings.max_concurrent_per_provider - provider_in_flight,
        }
    }

    /// 按近期结局分布调整目标速率
    ///
    /// 失败率超过阈值时下调10%，否则上调10%，夹在[min, max]内；
    /// 样本不足时不动
    pub fn adapt(&self, rates: &OutcomeRates) {
        if !self.settings.adaptive || rates.total < MIN_ADAPT_SAMPLES {
            return;
        }

        let mut rate = self.current_rate.lock();
        let before = *rate;
        let nudged = if rates.error_rate() > self.settings.error_rate_threshold {
            (before as f64 * 0.9) as u32
        } else {
            (before as f64 * 1.1).ceil() as u32
        };
        *rate = nudged.clamp(
            self.settings.min_attempts_per_minute,
            self.settings.max_attempts_per_minute,
        );

        if *rate != before {
            info!(
                before,
                after = *rate,
                error_rate = rates.error_rate(),
                "Adaptive pacing adjusted"
            );
        }
    }

    /// 限流回执后强制下调速率
    pub fn nudge_down(&self) {
        let mut rate = self.current_rate.lock();
        *rate = ((*rate as f64 * 0.9) as u32).max(self.settings.min_attempts_per_minute);
    }

    /// 在一个突发内平滑单次派发的间隔
    pub async fn pace(&self, account_id: Uuid) {
        self.pacer.until_key_ready(&account_id).await;
    }

    /// 按当前速率推荐的重试等待
    fn retry_after(&self) -> Duration {
        let rate = self.current_rate().max(1) as u64;
        Duration::from_secs((60 / rate).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PacingSettings {
        PacingSettings {
            max_concurrent_per_account: 5,
            max_concurrent_per_provider: 10,
            target_attempts_per_minute: 30,
            min_attempts_per_minute: 5,
            max_attempts_per_minute: 60,
            adaptive: true,
            error_rate_threshold: 0.3,
        }
    }

    #[test]
    fn test_admit_within_headroom() {
        let governor = ConcurrencyGovernor::new(settings());
        let admission = governor.admit(2, 10);
        assert_eq!(admission.allowed(), 3);
    }

    #[test]
    fn test_deny_at_concurrency_cap() {
        let governor = ConcurrencyGovernor::new(settings());
        let admission = governor.admit(5, 1);
        assert_eq!(admission.allowed(), 0);
        assert!(matches!(
            admission,
            Admission::Deny {
                reason: DenialReason::AccountConcurrency,
                ..
            }
        ));
    }

    #[test]
    fn test_provider_cap() {
        let governor = ConcurrencyGovernor::new(settings());
        assert!(matches!(
            governor.admit_provider(10),
            Admission::Deny {
                reason: DenialReason::ProviderConcurrency,
                ..
            }
        ));
        assert_eq!(governor.admit_provider(4).allowed(), 6);
    }

    #[test]
    fn test_adapt_nudges_down_on_errors() {
        let governor = ConcurrencyGovernor::new(settings());
        governor.adapt(&OutcomeRates {
            total: 20,
            failed: 10,
            answered: 10,
        });
        assert_eq!(governor.current_rate(), 27);
    }

    #[test]
    fn test_adapt_nudges_up_when_healthy() {
        let governor = ConcurrencyGovernor::new(settings());
        governor.adapt(&OutcomeRates {
            total: 20,
            failed: 1,
            answered: 19,
        });
        assert_eq!(governor.current_rate(), 33);
    }

    #[test]
    fn test_adapt_clamps_to_bounds() {
        let governor = ConcurrencyGovernor::new(settings());
        for _ in 0..30 {
            governor.adapt(&OutcomeRates {
                total: 20,
                failed: 20,
                answered: 0,
            });
        }
        assert_eq!(governor.current_rate(), 5);

        for _ in 0..60 {
            governor.adapt(&OutcomeRates {
                total: 20,
                failed: 0,
                answered: 20,
            });
        }
        assert_eq!(governor.current_rate(), 60);
    }

    #[test]
    fn test_adapt_skips_small_samples() {
        let governor = ConcurrencyGovernor::new(settings());
        governor.adapt(&OutcomeRates {
            total: 3,
            failed: 3,
            answered: 0,
        });
        assert_eq!(governor.current_rate(), 30);
    }
}
