// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// 提交失败重试策略配置
///
/// 队列条目提交失败后重新入队的退避计算，
/// 指数退避加抖动，避免同一批失败条目在同一秒再次被认领
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(60),
            max_backoff: Duration::from_secs(1800),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            enable_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// 创建标准提交退避策略（1分钟起步，上限30分钟）
    pub fn submission() -> Self {
        Self::default()
    }

    /// 创建速率受限退避策略，提供商返回限流响应时使用
    pub fn rate_limited() -> Self {
        Self {
            initial_backoff: Duration::from_secs(120),
            max_backoff: Duration::from_secs(3600),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
            enable_jitter: true,
        }
    }

    /// 计算第attempt次失败后的退避时间
    ///
    /// # 参数
    ///
    /// * `attempt` - 已经失败的次数（从1开始）
    ///
    /// # 返回值
    ///
    /// 返回下次重试前需要等待的时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_secs = self.initial_backoff.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let capped_backoff = backoff_secs.min(self.max_backoff.as_secs_f64());

        let final_backoff = if self.enable_jitter {
            let jitter_range = capped_backoff * self.jitter_factor;
            let jitter = rand::random_range(-jitter_range..jitter_range);
            (capped_backoff + jitter).max(0.0)
        } else {
            capped_backoff
        };

        Duration::from_secs_f64(final_backoff)
    }

    /// 计算下次重试时间
    ///
    /// # 参数
    ///
    /// * `attempt` - 已经失败的次数（从1开始）
    /// * `base_time` - 计算基准时间
    ///
    /// # 返回值
    ///
    /// 返回包含退避的下次可认领时间
    pub fn next_retry_time(&self, attempt: u32, base_time: DateTime<Utc>) -> DateTime<Utc> {
        let backoff = self.calculate_backoff(attempt);
        base_time + chrono::Duration::milliseconds(backoff.as_millis() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff_exponential() {
        let mut policy = RetryPolicy::submission();
        policy.enable_jitter = false; // 禁用抖动以获得精确值

        assert_eq!(policy.calculate_backoff(1), Duration::from_secs(60));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(120));
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(240));
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let mut policy = RetryPolicy::submission();
        policy.enable_jitter = false;

        // 大量失败后退避被钳制在上限
        assert_eq!(policy.calculate_backoff(20), Duration::from_secs(1800));
    }

    #[test]
    fn test_calculate_backoff_with_jitter() {
        let mut policy = RetryPolicy::submission();
        policy.enable_jitter = true;
        policy.jitter_factor = 0.1;

        let backoff = policy.calculate_backoff(1);
        let expected = Duration::from_secs(60);
        let jitter_range = Duration::from_secs(6);

        assert!(backoff >= expected - jitter_range);
        assert!(backoff <= expected + jitter_range);
    }

    #[test]
    fn test_next_retry_time() {
        use chrono::TimeZone;

        let mut policy = RetryPolicy::submission();
        policy.enable_jitter = false;

        let base_time = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let next_retry = policy.next_retry_time(1, base_time);

        assert_eq!(next_retry, base_time + chrono::Duration::seconds(60));
    }
}
