// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括错误类型、重试策略、电话号码处理和遥测监控等功能
pub mod errors;
pub mod phone;
pub mod retry_policy;
pub mod telemetry;
