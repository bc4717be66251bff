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

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

// 治理器的在途计数每次准入都查库，池缺省按派发突发定
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_MIN_CONNECTIONS: u32 = 2;
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// 创建数据库连接池
///
/// 未显式配置的池参数按派发工作负载取缺省值
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let timeout =
        Duration::from_secs(settings.connect_timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS));

    let mut opt = ConnectOptions::new(settings.url.to_owned());
    opt.max_connections(settings.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
        .min_connections(settings.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true);

    if let Some(idle) = settings.idle_timeout {
        opt.idle_timeout(Duration::from_secs(idle));
    }

    Database::connect(opt).await
}
