// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 表现层模块
///
/// 提供对外HTTP入口：提供商事件回执、外部入队和健康检查
pub mod errors;
pub mod handlers;
pub mod routes;
