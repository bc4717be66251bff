// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 派发模块
///
/// 实现并发治理、队列条目派发和滞留对账
pub mod dispatch;

/// 处置模块
///
/// 实现呼叫结局的分类策略与副作用处理
pub mod dispositions;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、可观测性等
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 提供商模块
///
/// 实现电话提供商适配器和出站路由
pub mod providers;

/// 队列模块
///
/// 实现拨号队列和调度循环
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
