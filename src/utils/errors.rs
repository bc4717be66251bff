// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 调度循环错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("仓库错误: {0}")]
    RepositoryError(String),
}

/// 派发错误类型
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("仓库错误: {0}")]
    RepositoryError(String),

    #[error("队列错误: {0}")]
    QueueError(String),

    #[error("路由错误: {0}")]
    RoutingError(String),
}
