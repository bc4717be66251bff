// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 处置模块
///
/// 结局分类策略表与处置处理器
pub mod policy;
pub mod processor;
