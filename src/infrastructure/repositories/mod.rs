// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现
/// 包括各种实体仓库的数据库实现
pub mod audit_repo_impl;
pub mod call_attempt_repo_impl;
pub mod disposition_repo_impl;
pub mod dnc_repo_impl;
pub mod lead_repo_impl;
pub mod pipeline_repo_impl;
pub mod provider_number_repo_impl;
pub mod queue_repo_impl;
pub mod workflow_repo_impl;
