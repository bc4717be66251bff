// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
//
// See LICENSE file in the project root for full license information.

/// 提供商适配层模块
///
/// 每个电话提供商一个适配器，统一实现ProviderAdapter特质；
/// 路由器在适配器与号码库之上做能力过滤和号码选择
pub mod retell;
pub mod router;
pub mod telnyx;
pub mod traits;
pub mod twilio;
