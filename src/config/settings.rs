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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、服务器、节奏控制、调度循环和提供商等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 外呼节奏与并发配置
    pub pacing: PacingSettings,
    /// 调度循环配置
    pub scheduler: SchedulerSettings,
    /// 提供商配置
    pub providers: ProviderSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 外呼节奏与并发配置
///
/// 按账户读取，每次准入判定都取当前值，不做进程级缓存，
/// 保证多实例水平扩展时行为一致
#[derive(Debug, Clone, Deserialize)]
pub struct PacingSettings {
    /// 单账户最大并发外呼数
    pub max_concurrent_per_account: u64,
    /// 单提供商最大并发外呼数
    pub max_concurrent_per_provider: u64,
    /// 目标每分钟发起次数
    pub target_attempts_per_minute: u32,
    /// 自适应模式下每分钟发起次数下限
    pub min_attempts_per_minute: u32,
    /// 自适应模式下每分钟发起次数上限
    pub max_attempts_per_minute: u32,
    /// 是否启用自适应节奏
    pub adaptive: bool,
    /// 自适应模式错误率阈值 (0.0-1.0)
    pub error_rate_threshold: f64,
}

/// 调度循环配置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 调度周期（秒）
    pub tick_seconds: u64,
    /// 每个周期内单账户最多派发突发次数
    pub bursts_per_tick: u32,
    /// 单次突发认领的队列条目数
    pub burst_size: u64,
    /// 派发工作池大小
    pub worker_pool_size: usize,
    /// 认领超时（秒），超时条目被视为滞留
    pub claim_timeout_seconds: i64,
    /// 呼叫记录超时（秒），超时未收到回执的记录被强制关闭
    pub attempt_timeout_seconds: i64,
    /// 提供商调用超时（秒）
    pub submission_timeout_seconds: u64,
}

/// 提供商配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Retell配置
    pub retell: Option<ProviderAccountSettings>,
    /// Telnyx配置
    pub telnyx: Option<ProviderAccountSettings>,
    /// Twilio配置
    pub twilio: Option<ProviderAccountSettings>,
    /// 提供商限流冷却时间（秒）
    pub rate_limit_cooldown_seconds: u64,
}

/// 单个提供商账户配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderAccountSettings {
    /// API密钥
    pub api_key: String,
    /// API基础URL（测试时指向mock服务器）
    pub base_url: Option<String>,
    /// Webhook签名密钥
    pub webhook_secret: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default pacing settings
            .set_default("pacing.max_concurrent_per_account", 5)?
            .set_default("pacing.max_concurrent_per_provider", 20)?
            .set_default("pacing.target_attempts_per_minute", 30)?
            .set_default("pacing.min_attempts_per_minute", 5)?
            .set_default("pacing.max_attempts_per_minute", 60)?
            .set_default("pacing.adaptive", false)?
            .set_default("pacing.error_rate_threshold", 0.3)?
            // Default scheduler settings
            .set_default("scheduler.tick_seconds", 60)?
            .set_default("scheduler.bursts_per_tick", 4)?
            .set_default("scheduler.burst_size", 10)?
            .set_default("scheduler.worker_pool_size", 8)?
            .set_default("scheduler.claim_timeout_seconds", 120)?
            .set_default("scheduler.attempt_timeout_seconds", 300)?
            .set_default("scheduler.submission_timeout_seconds", 15)?
            // Default provider settings
            .set_default("providers.rate_limit_cooldown_seconds", 60)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DIALRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
